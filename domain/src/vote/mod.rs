//! Voting primitives: who voted, and what a completed skip looks like.

pub mod record;
pub mod skip;

pub use record::{VoteRecord, Voter};
pub use skip::{SkipEvent, SkipKind};
