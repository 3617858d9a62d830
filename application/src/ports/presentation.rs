//! Presentation notification port
//!
//! Defines the interface the coordinator drives to keep players informed:
//! progress indication, per-voter feedback, skip and timeout messages.
//!
//! Implementations live in the presentation layer. None of these calls may
//! block the coordinator; implementations defer their own heavy work.

use skipvote_domain::{SkipKind, VoteRecord, WorldId};

/// Callback sink for coordinator state transitions.
pub trait PresentationPort: Send + Sync {
    /// The vote count or requirement changed; refresh progress indication.
    fn on_vote_count_changed(&self, world: &WorldId, current: u32, required: u32);

    /// A specific vote was recorded; give the voter (and the world) feedback.
    fn on_vote_cast(&self, _world: &WorldId, _record: &VoteRecord, _current: u32, _required: u32) {}

    /// Quorum was reached and the skip countdown started.
    fn on_skip_scheduled(&self, _world: &WorldId, _delay_secs: u64, _kind: SkipKind) {}

    /// The skip is executing now, with this final vote set.
    fn on_skip_executing(&self, world: &WorldId, votes: &[VoteRecord], kind: SkipKind);

    /// The skip finished; `kind` tells night from storm from forced.
    fn on_skip_completed(&self, world: &WorldId, votes: &[VoteRecord], kind: SkipKind);

    /// The vote window expired without reaching quorum.
    fn on_vote_timeout(&self, _world: &WorldId) {}

    /// All votes were cleared; hide any progress indication.
    fn on_cleared(&self, world: &WorldId);
}

/// No-op presentation for headless use and tests.
pub struct NoPresentation;

impl PresentationPort for NoPresentation {
    fn on_vote_count_changed(&self, _world: &WorldId, _current: u32, _required: u32) {}
    fn on_skip_executing(&self, _world: &WorldId, _votes: &[VoteRecord], _kind: SkipKind) {}
    fn on_skip_completed(&self, _world: &WorldId, _votes: &[VoteRecord], _kind: SkipKind) {}
    fn on_cleared(&self, _world: &WorldId) {}
}
