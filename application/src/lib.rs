//! Application layer for skipvote
//!
//! This crate defines the ports the engine consumes (scheduling,
//! presentation, persistence, host callbacks) and the use-case core: the
//! [`coordinator::VoteCoordinator`] state machine that decides *when* and
//! *whether* a skip occurs.
//!
//! The coordinator's public operations are synchronous and non-blocking;
//! all waiting is expressed as scheduled callbacks delivered back through
//! the scheduling port.

pub mod config;
pub mod coordinator;
pub mod ports;

// Re-export commonly used types
pub use config::{CoordinatorConfig, WorldOverride};
pub use coordinator::{CoordinatorBuilder, VoteCoordinator, VoteReceipt, VoteStatus};
pub use ports::{
    Affinity, EligibilityPolicy, HostError, NoPersistence, NoPresentation, OnceAction,
    PersistencePort, PresentationPort, RepeatAction, SchedulingPort, TaskHandle, WorldHost,
};
