//! Coordinator event stream.
//!
//! Two event kinds with different delivery semantics:
//!
//! - [`GateEvent`] — offered to registered [`VoteGate`]s *before* the action
//!   commits; any gate may veto it.
//! - [`Notice`] — broadcast to [`VoteObserver`]s *after* the action took
//!   effect; observers cannot influence the outcome.

use crate::core::ids::{ParticipantId, WorldId};
use crate::vote::record::VoteRecord;
use crate::vote::skip::SkipKind;
use serde::Serialize;

/// A pending action offered to gates for review.
#[derive(Debug)]
pub enum GateEvent<'a> {
    /// A vote is about to be recorded.
    VoteCast {
        world: &'a WorldId,
        record: &'a VoteRecord,
    },
    /// A skip is about to execute with this vote set.
    SkipExecuting {
        world: &'a WorldId,
        votes: &'a [VoteRecord],
        kind: SkipKind,
    },
}

impl GateEvent<'_> {
    pub fn world(&self) -> &WorldId {
        match self {
            GateEvent::VoteCast { world, .. } => world,
            GateEvent::SkipExecuting { world, .. } => world,
        }
    }
}

/// A gate's decision about a pending action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVerdict {
    Allow,
    Deny,
}

impl GateVerdict {
    pub fn is_denied(&self) -> bool {
        matches!(self, GateVerdict::Deny)
    }
}

/// Reviews pending actions before they commit.
///
/// Gates run synchronously inside the coordinator's mutation, so they must
/// be fast and must not call back into the coordinator.
pub trait VoteGate: Send + Sync {
    fn review(&self, event: &GateEvent<'_>) -> GateVerdict;
}

/// A committed coordinator action, broadcast after the fact.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    VoteCast {
        world: WorldId,
        voter: ParticipantId,
        current: u32,
        required: u32,
    },
    VoteWithdrawn {
        world: WorldId,
        voter: ParticipantId,
        current: u32,
        required: u32,
    },
    SkipCompleted {
        world: WorldId,
        kind: SkipKind,
        voters: u32,
    },
    VoteTimeout {
        world: WorldId,
    },
    VotesCleared {
        world: WorldId,
    },
}

impl Notice {
    pub fn world(&self) -> &WorldId {
        match self {
            Notice::VoteCast { world, .. }
            | Notice::VoteWithdrawn { world, .. }
            | Notice::SkipCompleted { world, .. }
            | Notice::VoteTimeout { world }
            | Notice::VotesCleared { world } => world,
        }
    }
}

/// Receives committed-action notices.
///
/// Implementations must not block; heavy work belongs on the observer's own
/// executor.
pub trait VoteObserver: Send + Sync {
    fn notify(&self, notice: &Notice);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vote::record::Voter;

    struct DenySkips;

    impl VoteGate for DenySkips {
        fn review(&self, event: &GateEvent<'_>) -> GateVerdict {
            match event {
                GateEvent::SkipExecuting { .. } => GateVerdict::Deny,
                _ => GateVerdict::Allow,
            }
        }
    }

    #[test]
    fn test_gate_reviews_by_variant() {
        let gate = DenySkips;
        let world = WorldId::new("overworld");
        let record = VoteRecord::cast(&Voter::from("steve"));

        let vote = GateEvent::VoteCast {
            world: &world,
            record: &record,
        };
        assert_eq!(gate.review(&vote), GateVerdict::Allow);

        let votes = [record];
        let skip = GateEvent::SkipExecuting {
            world: &world,
            votes: &votes,
            kind: SkipKind::Night,
        };
        assert!(gate.review(&skip).is_denied());
        assert_eq!(skip.world(), &world);
    }

    #[test]
    fn test_notice_serializes_with_tag() {
        let notice = Notice::SkipCompleted {
            world: WorldId::new("overworld"),
            kind: SkipKind::Storm,
            voters: 3,
        };
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["type"], "skip_completed");
        assert_eq!(json["kind"], "storm");
        assert_eq!(notice.world().as_str(), "overworld");
    }
}
