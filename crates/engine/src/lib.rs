// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kwf-engine: the autopilot control loop itself — the mutex lock, the tick
//! decision engine, the stage state machine, the auto-reopen watcher, the
//! worker contract parser, the session dispatcher, and the periodic
//! progress poster. Everything here is pure logic over the `kwf-adapters`
//! port and `kwf-storage` persistence; no component talks to a platform or
//! the filesystem directly except through those two crates.

pub mod contract;
pub mod dispatcher;
pub mod error;
pub mod lock;
pub mod progress;
pub mod reopen;
pub mod stage_machine;
pub mod tick;

pub use contract::{extract_worker_terminal_command, validate_worker_response_contract, WorkerCommand, WorkerCommandKind};
pub use dispatcher::{apply_worker_command_to_session_map, build_dispatcher_plan, AutopilotOutput, DispatchAction, TicketContext};
pub use error::{ContractError, ContractViolation, LockError, TickError, WorkflowViolation};
pub use lock::{try_acquire_lock, LockGuard, DEFAULT_TTL_SECS};
pub use progress::{run_progress_auto_updates, ProgressPosterConfig};
pub use reopen::{run_auto_reopen_watcher, AutoReopenConfig};
pub use stage_machine::{apply as apply_transition, TransitionVerb};
pub use tick::{completion_is_proven, tick, Evidence, TickConfig, TickOutcome};
