//! Ports: the interfaces the coordinator consumes.
//!
//! Implementations live in the infrastructure and presentation layers and
//! are injected at wiring time.

pub mod host;
pub mod persistence;
pub mod presentation;
pub mod scheduling;

pub use host::{EligibilityPolicy, HostError, WorldHost};
pub use persistence::{NoPersistence, PersistencePort};
pub use presentation::{NoPresentation, PresentationPort};
pub use scheduling::{Affinity, OnceAction, RepeatAction, SchedulingPort, TaskHandle};
