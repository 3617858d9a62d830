//! Infrastructure layer for skipvote
//!
//! This crate contains the adapters behind the application-layer ports:
//! the three scheduling implementations and their startup negotiation,
//! configuration loading, the JSONL skip history, and a simulated host
//! for running the engine without a real game server.

pub mod config;
pub mod host;
pub mod persistence;
pub mod scheduler;

// Re-export commonly used types
pub use config::{ConfigLoader, ConfigValidationError, FileConfig};
pub use host::SimulatedHost;
pub use persistence::JsonlSkipLog;
pub use scheduler::{
    negotiate, CooperativeLegacyScheduler, HostModel, NegotiatedScheduler, RegionScheduler,
    SingleLoopScheduler,
};
