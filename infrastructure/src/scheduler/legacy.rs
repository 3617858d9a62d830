//! Cooperative-legacy scheduler.
//!
//! Same single-queue discipline as [`SingleLoopScheduler`], wrapped in the
//! defensive guards older host loops need: delays are clamped into sane
//! bounds, a cancelled action is re-checked at execution time, and a
//! panicking action is contained instead of taking the loop down with it.

use crate::scheduler::single_loop::SingleLoopScheduler;
use skipvote_application::{Affinity, OnceAction, RepeatAction, SchedulingPort, TaskHandle};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Shortest repeat period the legacy loop will accept; anything lower
/// would busy-spin a cooperative host.
const MIN_PERIOD: Duration = Duration::from_millis(50);

/// Longest deferral the legacy loop will accept.
const MAX_DELAY: Duration = Duration::from_secs(60 * 60);

/// Single-loop scheduling with legacy-host guards.
pub struct CooperativeLegacyScheduler {
    inner: SingleLoopScheduler,
}

impl CooperativeLegacyScheduler {
    /// Must be called inside a tokio runtime.
    pub fn new() -> Self {
        Self {
            inner: SingleLoopScheduler::new(),
        }
    }

    fn clamp_delay(delay: Duration) -> Duration {
        if delay > MAX_DELAY {
            warn!(
                "clamping scheduled delay of {}s to {}s",
                delay.as_secs(),
                MAX_DELAY.as_secs()
            );
            MAX_DELAY
        } else {
            delay
        }
    }

    fn contain(run: impl FnOnce()) {
        if catch_unwind(AssertUnwindSafe(run)).is_err() {
            warn!("scheduled action panicked; loop continues");
        }
    }
}

impl Default for CooperativeLegacyScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulingPort for CooperativeLegacyScheduler {
    fn schedule_once(&self, affinity: Affinity, delay: Duration, action: OnceAction) -> TaskHandle {
        let delay = Self::clamp_delay(delay);
        // The guard wants the handle's own token, which exists only once
        // the inner scheduler mints it; thread it through a slot.
        let token_slot: Arc<OnceLock<CancellationToken>> = Arc::new(OnceLock::new());
        let seen_by_action = Arc::clone(&token_slot);
        let guarded: OnceAction = Box::new(move || {
            if seen_by_action.get().is_some_and(CancellationToken::is_cancelled) {
                return;
            }
            Self::contain(action);
        });
        let handle = self.inner.schedule_once(affinity, delay, guarded);
        let _ = token_slot.set(handle.token().clone());
        handle
    }

    fn schedule_repeating(
        &self,
        affinity: Affinity,
        delay: Duration,
        period: Duration,
        mut action: RepeatAction,
    ) -> TaskHandle {
        let delay = Self::clamp_delay(delay);
        let period = period.max(MIN_PERIOD);

        let token_slot: Arc<OnceLock<CancellationToken>> = Arc::new(OnceLock::new());
        let seen_by_action = Arc::clone(&token_slot);
        let guarded: RepeatAction = Box::new(move || {
            if seen_by_action.get().is_some_and(CancellationToken::is_cancelled) {
                return;
            }
            Self::contain(&mut action);
        });
        let handle = self.inner.schedule_repeating(affinity, delay, period, guarded);
        let _ = token_slot.set(handle.token().clone());
        handle
    }
}
