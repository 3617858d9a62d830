//! Skip kinds and completed-skip events.

use crate::core::ids::WorldId;
use crate::core::time::{now_millis, EpochMillis};
use crate::vote::record::VoteRecord;
use serde::{Deserialize, Serialize};

/// Why a world is (or was) skippable.
///
/// The eligibility policy reports which condition window is open; the
/// executed skip uses it to decide whether to advance time, clear weather,
/// or both. `Forced` marks an admin skip that bypassed quorum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipKind {
    /// The world is in its night window.
    Night,
    /// A storm (rain/thunder) is active.
    Storm,
    /// An admin bypassed quorum.
    Forced,
}

impl SkipKind {
    pub fn is_night(&self) -> bool {
        matches!(self, SkipKind::Night)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SkipKind::Night => "night",
            SkipKind::Storm => "storm",
            SkipKind::Forced => "forced",
        }
    }
}

impl std::fmt::Display for SkipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A completed skip, as handed to the persistence port.
///
/// Fire-and-forget history record: which world skipped what, who voted,
/// and when it happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkipEvent {
    pub world: WorldId,
    pub kind: SkipKind,
    pub voters: Vec<VoteRecord>,
    pub executed_at: EpochMillis,
}

impl SkipEvent {
    pub fn new(world: WorldId, kind: SkipKind, voters: Vec<VoteRecord>) -> Self {
        Self {
            world,
            kind,
            voters,
            executed_at: now_millis(),
        }
    }

    pub fn voter_count(&self) -> usize {
        self.voters.len()
    }
}
