//! Read-only status snapshot exposed to command layers.

use serde::Serialize;
use skipvote_domain::{EpochMillis, SkipKind, WorldId};

/// Point-in-time view of a world's vote state.
///
/// Produced by [`crate::coordinator::VoteCoordinator::status`]; safe to
/// hold after the underlying state moved on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteStatus {
    pub world: WorldId,
    /// Whether voting is enabled in this world at all.
    pub enabled: bool,
    /// The condition window currently open, if any.
    pub condition: Option<SkipKind>,
    pub current: u32,
    pub required: u32,
    /// Progress toward quorum in [0, 1].
    pub progress: f64,
    /// A skip countdown is armed.
    pub countdown_active: bool,
    /// Skip side effects are in flight.
    pub executing: bool,
    pub last_skip_at: Option<EpochMillis>,
}

impl VoteStatus {
    /// Progress as a whole percentage, for display.
    pub fn progress_percent(&self) -> u32 {
        (self.progress * 100.0).round() as u32
    }
}
