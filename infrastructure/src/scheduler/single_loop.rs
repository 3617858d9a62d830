//! Single-loop scheduler: one FIFO queue, one worker.
//!
//! Every affinity maps onto the same delayed-task queue, which is what a
//! host with one global tick thread gives you anyway. Correctness is
//! trivial: actions run strictly in the order their timers expired.

use skipvote_application::{Affinity, OnceAction, RepeatAction, SchedulingPort, TaskHandle};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

type QueuedAction = Box<dyn FnOnce() + Send + 'static>;

/// All scheduling collapsed onto one FIFO worker task.
pub struct SingleLoopScheduler {
    queue: mpsc::UnboundedSender<QueuedAction>,
}

impl SingleLoopScheduler {
    /// Spawn the worker. Must be called inside a tokio runtime.
    pub fn new() -> Self {
        let (queue, mut rx) = mpsc::unbounded_channel::<QueuedAction>();
        tokio::spawn(async move {
            while let Some(action) = rx.recv().await {
                action();
            }
            debug!("single-loop worker stopped");
        });
        Self { queue }
    }
}

impl Default for SingleLoopScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulingPort for SingleLoopScheduler {
    fn schedule_once(
        &self,
        _affinity: Affinity,
        delay: Duration,
        action: OnceAction,
    ) -> TaskHandle {
        let handle = TaskHandle::mint();
        let token = handle.token().clone();
        let queue = self.queue.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    if let Err(returned) = queue.send(action) {
                        warn!("scheduling degraded: single-loop queue closed, running action inline");
                        (returned.0)();
                    }
                }
            }
        });
        handle
    }

    fn schedule_repeating(
        &self,
        _affinity: Affinity,
        delay: Duration,
        period: Duration,
        action: RepeatAction,
    ) -> TaskHandle {
        let handle = TaskHandle::mint();
        let token = handle.token().clone();
        let queue = self.queue.clone();
        // The action crosses into the worker once per tick and back, so it
        // lives behind a mutex the queue closure can reach.
        let shared = Arc::new(Mutex::new(action));
        tokio::spawn(async move {
            let mut wait = delay;
            loop {
                tokio::select! {
                    () = token.cancelled() => return,
                    () = tokio::time::sleep(wait) => {}
                }
                wait = period;

                let shared = Arc::clone(&shared);
                let tick: QueuedAction = Box::new(move || {
                    let mut action = shared.lock().unwrap_or_else(PoisonError::into_inner);
                    action();
                });
                if let Err(returned) = queue.send(tick) {
                    warn!("scheduling degraded: single-loop queue closed, running tick inline");
                    (returned.0)();
                }
            }
        });
        handle
    }
}
