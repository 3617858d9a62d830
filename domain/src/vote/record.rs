//! Vote records and voter identity snapshots.

use crate::core::ids::{ParticipantId, Position};
use crate::core::time::{now_millis, EpochMillis};
use serde::{Deserialize, Serialize};

/// A participant's identity as seen by the host at the moment of an
/// operation: who they are, what to call them, and where they stand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voter {
    pub id: ParticipantId,
    pub display_name: String,
    pub position: Position,
}

impl Voter {
    pub fn new(id: impl Into<ParticipantId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            position: Position::default(),
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }
}

impl From<&str> for Voter {
    fn from(name: &str) -> Self {
        Voter::new(name, name)
    }
}

/// A single cast vote (immutable)
///
/// Created once when the vote is cast and never mutated afterwards; it is
/// dropped when the vote is withdrawn or the world's vote set is cleared.
/// The position snapshot is kept for effect placement at skip time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteRecord {
    participant: ParticipantId,
    display_name: String,
    cast_at: EpochMillis,
    position: Position,
}

impl VoteRecord {
    /// Snapshot the voter's identity and position at cast time.
    pub fn cast(voter: &Voter) -> Self {
        Self {
            participant: voter.id.clone(),
            display_name: voter.display_name.clone(),
            cast_at: now_millis(),
            position: voter.position,
        }
    }

    pub fn participant(&self) -> &ParticipantId {
        &self.participant
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn cast_at(&self) -> EpochMillis {
        self.cast_at
    }

    pub fn position(&self) -> Position {
        self.position
    }
}
