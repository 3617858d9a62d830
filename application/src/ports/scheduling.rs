//! Scheduling port
//!
//! Uniform capability to defer or repeat an action under a declared
//! execution affinity, and to cancel it again. The host's threading model
//! decides which implementation backs this port; the coordinator never
//! cares which one it got.

use skipvote_domain::{ParticipantId, WorldId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Which execution context a scheduled action must run under.
///
/// Single-loop hosts collapse all affinities onto one queue. A
/// parallel-region host routes `Global` actions to its host-wide
/// coordinator worker (whole-world mutations such as time and weather are
/// not region-local) and `World`/`Entity` actions to whichever worker
/// currently owns that world or entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Affinity {
    /// Must run on the host-wide coordinator context.
    Global,
    /// Must run wherever this world is currently simulated.
    World(WorldId),
    /// Must run wherever this participant's entity currently lives.
    Entity(ParticipantId),
}

/// A deferred action, run at most once.
pub type OnceAction = Box<dyn FnOnce() + Send + 'static>;

/// A repeating action, run once per period until cancelled.
pub type RepeatAction = Box<dyn FnMut() + Send + 'static>;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to a scheduled action.
///
/// Cancellation is explicit and immediate: cancelling a handle whose
/// action is already in flight is a safe no-op, and cancelling twice is
/// harmless. Handles are owned by the state that scheduled them and must
/// be cancelled before that state is discarded.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: u64,
    token: CancellationToken,
}

impl TaskHandle {
    /// Mint a fresh handle. Called by scheduler implementations only.
    pub fn mint() -> Self {
        Self {
            id: NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed),
            token: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// The token a scheduler implementation awaits or polls.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Capability to defer, repeat and cancel actions under an affinity.
///
/// Implementations never fail out of `schedule_once`/`schedule_repeating`:
/// if the underlying host primitive is unavailable they fall back to a
/// degraded-but-working path and log a warning. Delivery is not guaranteed
/// under every implementation (a parallel-region host drops actions whose
/// world or entity is gone), so callers reconcile via idempotent checks
/// rather than assuming the action ran.
pub trait SchedulingPort: Send + Sync {
    /// Run `action` once after `delay`.
    fn schedule_once(&self, affinity: Affinity, delay: Duration, action: OnceAction) -> TaskHandle;

    /// Run `action` every `period` after an initial `delay`.
    fn schedule_repeating(
        &self,
        affinity: Affinity,
        delay: Duration,
        period: Duration,
        action: RepeatAction,
    ) -> TaskHandle;

    /// Cancel a previously scheduled action.
    ///
    /// Safe to call after the action fired or was already cancelled.
    fn cancel(&self, handle: &TaskHandle) {
        handle.cancel();
    }
}
