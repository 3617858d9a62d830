//! Persistence adapters for the skip-event history.

pub mod jsonl;

pub use jsonl::JsonlSkipLog;
