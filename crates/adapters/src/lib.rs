// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kwf-adapters: platform backends implementing the Kanban autopilot's
//! adapter port, plus the shared plumbing (subprocess helper, tracing
//! wrapper, HTML stripping, priority mapping) they're built from.

pub mod error;
pub mod github;
pub mod html;
pub mod linear;
pub mod plane;
pub mod planka;
pub mod port;
pub mod priority;
pub mod stage_map;
pub mod subprocess;
pub mod traced;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use error::{AdapterCliError, AdapterError, AdapterProtocolError};
pub use github::{GithubAdapter, GithubConfig};
pub use linear::{LinearAdapter, LinearConfig};
pub use plane::{PlaneAdapter, PlaneConfig};
pub use planka::{relayed_author, PlankaAdapter, PlankaConfig};
pub use port::{
    AdapterPort, Attachment, CreateTicketRequest, CreatedWorkItem, LinkedWorkItem, ListCommentsOptions,
    WorkItemDetails,
};
pub use stage_map::StageMap;
pub use traced::TracedAdapter;

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeAdapter;
