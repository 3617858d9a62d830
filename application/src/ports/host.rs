//! Host callbacks: eligibility policy and world mutation.
//!
//! The engine never hard-codes what "night" or "storm" means, who counts
//! as eligible, or how time advances. The host answers those questions.

use skipvote_domain::{ParticipantId, SkipKind, WorldId};
use thiserror::Error;

/// Errors surfaced by host mutation callbacks.
///
/// The coordinator logs these and moves on; they never unwind into the
/// vote state machine.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("world is not loaded")]
    WorldUnloaded,

    #[error("participant is offline")]
    ParticipantOffline,

    #[error("host operation failed: {0}")]
    Other(String),
}

/// Policy questions the coordinator delegates to the host.
pub trait EligibilityPolicy: Send + Sync {
    /// Whether this participant is excluded from voting (spectators,
    /// privileged roles, and the like).
    fn is_exempt(&self, world: &WorldId, participant: &ParticipantId) -> bool;

    /// The condition window currently open in this world, if any.
    ///
    /// `None` means voting is not possible right now (daytime, clear sky).
    fn skippable_condition(&self, world: &WorldId) -> Option<SkipKind>;

    /// How many participants currently count toward quorum in this world.
    fn eligible_count(&self, world: &WorldId) -> u32;
}

/// World mutations performed when a skip executes.
///
/// `set_world_to_day` and `clear_weather` mutate whole-world state and are
/// invoked only from Global-affinity scheduled actions.
pub trait WorldHost: Send + Sync {
    fn set_world_to_day(&self, world: &WorldId) -> Result<(), HostError>;

    fn clear_weather(&self, world: &WorldId) -> Result<(), HostError>;

    /// Post-skip follow-up for one voter (rest statistics, regeneration).
    /// Invoked from an Entity-affinity scheduled action.
    fn refresh_participant(&self, participant: &ParticipantId) -> Result<(), HostError>;
}
