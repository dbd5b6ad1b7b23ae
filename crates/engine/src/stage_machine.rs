// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The transition table the engine originates (§4.5). `setStage` calls
//! themselves are idempotent at the adapter layer; this module only
//! decides *which* transition a verb or tick outcome implies, and rejects
//! the two transitions the table forbids.

use kwf_core::Stage;

/// A verb a CLI command or the engine itself originates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionVerb {
    Start,
    Complete,
    Ask,
    Heal,
    HumanReply,
}

/// The stage a transition would land on, or `None` if the combination of
/// verb and current stage is not one of the table's rows.
///
/// `todo -> in-review` and `blocked -> in-review` are deliberately absent:
/// there is no direct path to `in-review` except via `complete` from
/// `in-progress`.
pub fn apply(from: Stage, verb: TransitionVerb) -> Option<Stage> {
    use Stage::*;
    use TransitionVerb::*;
    match (from, verb) {
        (Todo, Start) => Some(InProgress),
        (InProgress, Complete) => Some(InReview),
        (_, Ask) => Some(Blocked),
        (InProgress, Heal) => Some(Todo),
        (Blocked, HumanReply) => Some(Todo),
        (InReview, HumanReply) => Some(Todo),
        _ => None,
    }
}
