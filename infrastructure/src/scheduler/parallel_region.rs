//! Parallel-region scheduler.
//!
//! Models a host that simulates regions on separate threads. `Global`
//! actions run on a single host-wide coordinator worker (whole-world
//! mutations such as time and weather are not region-local). `World` and
//! `Entity` actions are dispatched to the worker currently owning that
//! region — resolved at dispatch time, not at scheduling time — and are
//! dropped, not executed, when the target is no longer registered.
//! Callers treat that as a possible silent no-op and reconcile through
//! idempotent checks.

use skipvote_application::{Affinity, OnceAction, RepeatAction, SchedulingPort, TaskHandle};
use skipvote_domain::{ParticipantId, WorldId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

type QueuedAction = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum RegionKey {
    World(WorldId),
    Entity(ParticipantId),
}

impl std::fmt::Display for RegionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionKey::World(world) => write!(f, "world:{world}"),
            RegionKey::Entity(participant) => write!(f, "entity:{participant}"),
        }
    }
}

struct Inner {
    global: mpsc::UnboundedSender<QueuedAction>,
    regions: Mutex<HashMap<RegionKey, mpsc::UnboundedSender<QueuedAction>>>,
}

impl Inner {
    /// Route an expired action to its owner. Returns false when the
    /// target region is gone and the action was dropped.
    fn dispatch(&self, affinity: &Affinity, action: QueuedAction) -> bool {
        match affinity {
            Affinity::Global => {
                if let Err(returned) = self.global.send(action) {
                    warn!("scheduling degraded: global worker gone, running action inline");
                    (returned.0)();
                }
                true
            }
            Affinity::World(world) => self.dispatch_region(&RegionKey::World(world.clone()), action),
            Affinity::Entity(participant) => {
                self.dispatch_region(&RegionKey::Entity(participant.clone()), action)
            }
        }
    }

    fn dispatch_region(&self, key: &RegionKey, action: QueuedAction) -> bool {
        let sender = self
            .regions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned();
        match sender {
            Some(sender) => {
                if sender.send(action).is_err() {
                    debug!("region {key} retired mid-dispatch, dropping action");
                    return false;
                }
                true
            }
            None => {
                debug!("region {key} not registered, dropping action");
                false
            }
        }
    }
}

fn spawn_worker(label: String, mut rx: mpsc::UnboundedReceiver<QueuedAction>) {
    tokio::spawn(async move {
        while let Some(action) = rx.recv().await {
            action();
        }
        debug!("{label} worker stopped");
    });
}

/// Region-aware scheduler for parallel hosts.
///
/// Worlds and entities must be registered before world- or
/// entity-affinity actions can reach them; retiring a region makes
/// pending dispatches to it no-ops.
pub struct RegionScheduler {
    inner: Arc<Inner>,
}

impl RegionScheduler {
    /// Spawn the global coordinator worker. Must be called inside a
    /// tokio runtime.
    pub fn new() -> Self {
        let (global, rx) = mpsc::unbounded_channel();
        spawn_worker("global".to_string(), rx);
        Self {
            inner: Arc::new(Inner {
                global,
                regions: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn register_world(&self, world: &WorldId) {
        self.register(RegionKey::World(world.clone()));
    }

    pub fn retire_world(&self, world: &WorldId) {
        self.retire(&RegionKey::World(world.clone()));
    }

    pub fn register_participant(&self, participant: &ParticipantId) {
        self.register(RegionKey::Entity(participant.clone()));
    }

    pub fn retire_participant(&self, participant: &ParticipantId) {
        self.retire(&RegionKey::Entity(participant.clone()));
    }

    fn register(&self, key: RegionKey) {
        let mut regions = self
            .inner
            .regions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        regions.entry(key.clone()).or_insert_with(|| {
            let (tx, rx) = mpsc::unbounded_channel();
            spawn_worker(key.to_string(), rx);
            tx
        });
    }

    fn retire(&self, key: &RegionKey) {
        let removed = self
            .inner
            .regions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        if removed.is_some() {
            debug!("region {key} retired");
        }
    }
}

impl Default for RegionScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulingPort for RegionScheduler {
    fn schedule_once(&self, affinity: Affinity, delay: Duration, action: OnceAction) -> TaskHandle {
        let handle = TaskHandle::mint();
        let token = handle.token().clone();
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    inner.dispatch(&affinity, action);
                }
            }
        });
        handle
    }

    fn schedule_repeating(
        &self,
        affinity: Affinity,
        delay: Duration,
        period: Duration,
        action: RepeatAction,
    ) -> TaskHandle {
        let handle = TaskHandle::mint();
        let token = handle.token().clone();
        let inner = Arc::clone(&self.inner);
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
                if !inner.dispatch(&affinity, tick) {
                    // The region is gone; a repeating action has nothing
                    // left to tick against.
                    return;
                }
            }
        });
        handle
    }
}
