//! Domain error types

use thiserror::Error;

/// Reason codes returned by coordinator entry points.
///
/// These are result values, not panics: every rejected operation carries a
/// stable reason so the presentation layer can render an accurate message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoteError {
    #[error("voting is not enabled in this world")]
    WorldNotEnabled,

    #[error("the world is not in a skippable condition right now")]
    WorldNotEligible,

    #[error("participant is exempt from voting")]
    ParticipantExempt,

    #[error("participant has already voted")]
    AlreadyVoted,

    #[error("participant has no active vote")]
    NoActiveVote,

    #[error("a skip is already in progress")]
    SkipInProgress,

    #[error("the operation was vetoed by a registered gate")]
    Vetoed,
}

impl VoteError {
    /// Whether retrying the same operation later could succeed.
    ///
    /// `AlreadyVoted` and `NoActiveVote` are idempotency mismatches; the
    /// caller's intent is already satisfied and a retry is pointless.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, VoteError::AlreadyVoted | VoteError::NoActiveVote)
    }
}
