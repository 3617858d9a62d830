//! Scheduling port implementations for the three host threading models.
//!
//! Selection happens once, at startup, through [`negotiate`]: the host
//! model is a closed set and the rest of the system only ever sees the
//! [`SchedulingPort`] it was handed.

pub mod legacy;
pub mod parallel_region;
pub mod single_loop;

pub use legacy::CooperativeLegacyScheduler;
pub use parallel_region::RegionScheduler;
pub use single_loop::SingleLoopScheduler;

use serde::{Deserialize, Serialize};
use skipvote_application::SchedulingPort;
use std::sync::Arc;
use tracing::info;

/// The host threading models this engine knows how to run under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostModel {
    /// One global tick loop; every action runs on the same queue.
    #[default]
    SingleLoop,
    /// Same queue discipline, with defensive guards for hosts whose
    /// primitives misbehave.
    CooperativeLegacy,
    /// Per-region worker threads plus a host-wide coordinator worker.
    ParallelRegion,
}

impl HostModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostModel::SingleLoop => "single-loop",
            HostModel::CooperativeLegacy => "cooperative-legacy",
            HostModel::ParallelRegion => "parallel-region",
        }
    }
}

impl std::fmt::Display for HostModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for HostModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single-loop" | "single_loop" => Ok(HostModel::SingleLoop),
            "cooperative-legacy" | "legacy" => Ok(HostModel::CooperativeLegacy),
            "parallel-region" | "parallel" | "folia" => Ok(HostModel::ParallelRegion),
            other => Err(format!(
                "unknown host model '{other}' (expected single-loop, cooperative-legacy or parallel-region)"
            )),
        }
    }
}

/// The scheduler picked at startup.
///
/// Keeps the concrete type reachable (a parallel-region host needs to
/// register and retire regions) while everything downstream holds only
/// the port.
pub enum NegotiatedScheduler {
    SingleLoop(Arc<SingleLoopScheduler>),
    CooperativeLegacy(Arc<CooperativeLegacyScheduler>),
    ParallelRegion(Arc<RegionScheduler>),
}

impl NegotiatedScheduler {
    pub fn model(&self) -> HostModel {
        match self {
            NegotiatedScheduler::SingleLoop(_) => HostModel::SingleLoop,
            NegotiatedScheduler::CooperativeLegacy(_) => HostModel::CooperativeLegacy,
            NegotiatedScheduler::ParallelRegion(_) => HostModel::ParallelRegion,
        }
    }

    pub fn port(&self) -> Arc<dyn SchedulingPort> {
        match self {
            NegotiatedScheduler::SingleLoop(s) => s.clone(),
            NegotiatedScheduler::CooperativeLegacy(s) => s.clone(),
            NegotiatedScheduler::ParallelRegion(s) => s.clone(),
        }
    }

    /// The region registry, when the host model has one.
    pub fn regions(&self) -> Option<&Arc<RegionScheduler>> {
        match self {
            NegotiatedScheduler::ParallelRegion(s) => Some(s),
            _ => None,
        }
    }
}

/// One-step capability negotiation: build the scheduler for the detected
/// host model. Must run inside a tokio runtime.
pub fn negotiate(model: HostModel) -> NegotiatedScheduler {
    info!("scheduling model: {model}");
    match model {
        HostModel::SingleLoop => NegotiatedScheduler::SingleLoop(Arc::new(SingleLoopScheduler::new())),
        HostModel::CooperativeLegacy => {
            NegotiatedScheduler::CooperativeLegacy(Arc::new(CooperativeLegacyScheduler::new()))
        }
        HostModel::ParallelRegion => {
            NegotiatedScheduler::ParallelRegion(Arc::new(RegionScheduler::new()))
        }
    }
}
