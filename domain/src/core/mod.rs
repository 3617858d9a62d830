//! Core domain concepts shared across all subdomains.
//!
//! - [`ids`] — world and participant identifiers, positions
//! - [`error::VoteError`] — coordinator reason codes
//! - [`time`] — epoch-millisecond timestamps

pub mod error;
pub mod ids;
pub mod time;
