//! Skip-event persistence port
//!
//! Completed skips are offered to this port fire-and-forget: failures are
//! the implementation's problem to log, never the coordinator's.

use skipvote_domain::SkipEvent;

/// Receives completed skip events for optional storage.
pub trait PersistencePort: Send + Sync {
    fn record_skip_event(&self, event: &SkipEvent);
}

/// Discards all events.
pub struct NoPersistence;

impl PersistencePort for NoPersistence {
    fn record_skip_event(&self, _event: &SkipEvent) {}
}
