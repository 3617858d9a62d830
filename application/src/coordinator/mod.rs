//! The vote coordinator: per-world vote lifecycle state machine.
//!
//! Owns one [`WorldVoteState`] per world, issues timers through the
//! scheduling port, and emits lifecycle notifications. All entry points
//! are synchronous and non-blocking; waiting is always expressed as a
//! scheduled callback firing back in.
//!
//! Concurrency: a per-world mutex serializes every mutation of that
//! world's state, so timers and commands arriving from different
//! execution contexts cannot interleave mid-transition. Different worlds
//! proceed fully in parallel.

pub mod status;
mod world_state;


pub use status::VoteStatus;
pub use world_state::WorldVoteState;

use crate::config::CoordinatorConfig;
use crate::ports::{
    Affinity, EligibilityPolicy, NoPersistence, NoPresentation, PersistencePort,
    PresentationPort, SchedulingPort, WorldHost,
};
use skipvote_domain::{
    now_millis, GateEvent, Notice, ParticipantId, SkipEvent, SkipKind, VoteError, VoteGate,
    VoteObserver, VoteRecord, Voter, WorldId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use std::time::Duration;
use tracing::{debug, warn};

/// Entity-affinity follow-ups run slightly after the Global world
/// mutation so voters see the already-skipped world.
const PARTICIPANT_REFRESH_DELAY: Duration = Duration::from_millis(100);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What a successful cast/withdraw left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteReceipt {
    pub current: u32,
    pub required: u32,
    pub quorum_met: bool,
}

/// Builder for [`VoteCoordinator`]; presentation and persistence default
/// to no-ops.
pub struct CoordinatorBuilder {
    config: CoordinatorConfig,
    scheduler: Arc<dyn SchedulingPort>,
    policy: Arc<dyn EligibilityPolicy>,
    host: Arc<dyn WorldHost>,
    presentation: Arc<dyn PresentationPort>,
    persistence: Arc<dyn PersistencePort>,
}

impl CoordinatorBuilder {
    pub fn config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn presentation(mut self, presentation: Arc<dyn PresentationPort>) -> Self {
        self.presentation = presentation;
        self
    }

    pub fn persistence(mut self, persistence: Arc<dyn PersistencePort>) -> Self {
        self.persistence = persistence;
        self
    }

    pub fn build(self) -> Arc<VoteCoordinator> {
        Arc::new_cyclic(|me| VoteCoordinator {
            config: RwLock::new(self.config),
            scheduler: self.scheduler,
            policy: self.policy,
            host: self.host,
            presentation: self.presentation,
            persistence: self.persistence,
            gates: RwLock::new(Vec::new()),
            observers: RwLock::new(Vec::new()),
            worlds: Mutex::new(HashMap::new()),
            me: me.clone(),
        })
    }
}

/// Coordinates skip votes across worlds.
pub struct VoteCoordinator {
    config: RwLock<CoordinatorConfig>,
    scheduler: Arc<dyn SchedulingPort>,
    policy: Arc<dyn EligibilityPolicy>,
    host: Arc<dyn WorldHost>,
    presentation: Arc<dyn PresentationPort>,
    persistence: Arc<dyn PersistencePort>,
    gates: RwLock<Vec<Arc<dyn VoteGate>>>,
    observers: RwLock<Vec<Arc<dyn VoteObserver>>>,
    worlds: Mutex<HashMap<WorldId, Arc<Mutex<WorldVoteState>>>>,
    /// Handed to timer closures so a dropped coordinator turns stray
    /// callbacks into no-ops instead of keeping it alive.
    me: Weak<VoteCoordinator>,
}

impl VoteCoordinator {
    pub fn builder(
        scheduler: Arc<dyn SchedulingPort>,
        policy: Arc<dyn EligibilityPolicy>,
        host: Arc<dyn WorldHost>,
    ) -> CoordinatorBuilder {
        CoordinatorBuilder {
            config: CoordinatorConfig::default(),
            scheduler,
            policy,
            host,
            presentation: Arc::new(NoPresentation),
            persistence: Arc::new(NoPersistence),
        }
    }

    // ==================== Commands ====================

    /// Record a skip vote for `voter` in `world`.
    ///
    /// On quorum the skip countdown is armed (superseding any timeout);
    /// below quorum the timeout window restarts and the natural-end watch
    /// keeps an eye on the condition.
    pub fn cast_vote(&self, world: &WorldId, voter: &Voter) -> Result<VoteReceipt, VoteError> {
        let config = self.config_snapshot();
        if !config.is_world_enabled(world) {
            return Err(VoteError::WorldNotEnabled);
        }
        let Some(kind) = self.effective_condition(&config, world) else {
            return Err(VoteError::WorldNotEligible);
        };
        if self.policy.is_exempt(world, &voter.id) {
            return Err(VoteError::ParticipantExempt);
        }

        let state_arc = self.state_for(world);
        let mut state = lock(&state_arc);

        if state.is_executing() {
            return Err(VoteError::SkipInProgress);
        }
        if state.has_voted(&voter.id) {
            return Err(VoteError::AlreadyVoted);
        }

        let record = VoteRecord::cast(voter);
        if self.gates_deny(&GateEvent::VoteCast {
            world,
            record: &record,
        }) {
            return Err(VoteError::Vetoed);
        }
        state.add_vote(record.clone());

        let quorum = config.quorum_for(world);
        let eligible = self.policy.eligible_count(world);
        let current = state.vote_count();
        let required = quorum.required(eligible);
        let quorum_met = quorum.is_met(current, eligible);

        if quorum_met {
            self.arm_skip_countdown(world, &mut state, &config, kind);
        } else {
            self.arm_timeout(world, &mut state, &config);
            self.ensure_natural_end_watch(world, &mut state, &config);
        }

        self.presentation.on_vote_count_changed(world, current, required);
        self.presentation.on_vote_cast(world, &record, current, required);
        drop(state);

        self.broadcast(&Notice::VoteCast {
            world: world.clone(),
            voter: voter.id.clone(),
            current,
            required,
        });
        Ok(VoteReceipt {
            current,
            required,
            quorum_met,
        })
    }

    /// Withdraw `participant`'s vote in `world`.
    ///
    /// Dropping below quorum cancels an armed countdown and resumes the
    /// timeout window for the votes that remain; withdrawing the last
    /// vote clears the world's state entirely.
    pub fn withdraw_vote(
        &self,
        world: &WorldId,
        participant: &ParticipantId,
    ) -> Result<VoteReceipt, VoteError> {
        let Some(state_arc) = self.existing_state(world) else {
            return Err(VoteError::NoActiveVote);
        };
        let config = self.config_snapshot();

        let mut cleared = false;
        let (current, required, quorum_met) = {
            let mut state = lock(&state_arc);
            if state.is_executing() {
                return Err(VoteError::SkipInProgress);
            }
            if state.remove_vote(participant).is_none() {
                return Err(VoteError::NoActiveVote);
            }

            let quorum = config.quorum_for(world);
            let eligible = self.policy.eligible_count(world);
            let current = state.vote_count();
            let required = quorum.required(eligible);
            let quorum_met = quorum.is_met(current, eligible);

            if state.is_empty() {
                state.clear();
                cleared = true;
            } else if state.has_skip_timer() && !quorum_met {
                state.cancel_skip_timer();
                self.arm_timeout(world, &mut state, &config);
                self.ensure_natural_end_watch(world, &mut state, &config);
            }
            if !cleared {
                self.presentation.on_vote_count_changed(world, current, required);
            }
            (current, required, quorum_met)
        };

        if cleared {
            self.presentation.on_cleared(world);
            self.broadcast(&Notice::VotesCleared {
                world: world.clone(),
            });
        }
        self.broadcast(&Notice::VoteWithdrawn {
            world: world.clone(),
            voter: participant.clone(),
            current,
            required,
        });
        Ok(VoteReceipt {
            current,
            required,
            quorum_met,
        })
    }

    /// Execute a skip right now, bypassing quorum (and gates: this is an
    /// admin override). The skip is attributed to a synthetic single vote
    /// by `initiator`; pending votes are untouched until the post-skip
    /// clear sweeps them away.
    pub fn force_skip(&self, world: &WorldId, initiator: &Voter) -> Result<(), VoteError> {
        let config = self.config_snapshot();
        if !config.is_world_enabled(world) {
            return Err(VoteError::WorldNotEnabled);
        }

        let state_arc = self.state_for(world);
        let (votes, kind) = {
            let mut state = lock(&state_arc);
            if state.is_executing() {
                return Err(VoteError::SkipInProgress);
            }
            let kind = self
                .effective_condition(&config, world)
                .unwrap_or(SkipKind::Forced);
            state.set_executing(true);
            (vec![VoteRecord::cast(initiator)], kind)
        };

        self.presentation.on_skip_executing(world, &votes, kind);
        self.execute_skip(world, votes, kind, &config);
        Ok(())
    }

    /// Unconditional reset: votes emptied, all timers cancelled, progress
    /// indication hidden. Safe to call at any time, in any state, twice.
    pub fn clear_votes(&self, world: &WorldId) {
        let had_content = match self.existing_state(world) {
            Some(state_arc) => {
                let mut state = lock(&state_arc);
                let had_content = !state.is_empty()
                    || state.has_skip_timer()
                    || state.has_timeout_timer()
                    || state.has_natural_end_watch();
                state.clear();
                had_content
            }
            None => false,
        };

        self.presentation.on_cleared(world);
        if had_content {
            self.broadcast(&Notice::VotesCleared {
                world: world.clone(),
            });
        }
    }

    // ==================== Membership / host events ====================

    /// The participant disconnected or left the world; their vote (if
    /// any) goes with them.
    pub fn participant_left(&self, world: &WorldId, participant: &ParticipantId) {
        match self.withdraw_vote(world, participant) {
            Ok(_) | Err(VoteError::NoActiveVote) => {}
            Err(e) => debug!(world = %world, participant = %participant, "vote not withdrawn on leave: {e}"),
        }
    }

    /// The host reports the condition window closed on its own (weather
    /// cleared, dawn arrived). Pending votes are stale; clear them.
    pub fn condition_cleared(&self, world: &WorldId) {
        let config = self.config_snapshot();
        if self.effective_condition(&config, world).is_some() {
            return;
        }
        let Some(state_arc) = self.existing_state(world) else {
            return;
        };
        let pending = {
            let state = lock(&state_arc);
            !state.is_empty() && !state.is_executing()
        };
        if pending {
            self.clear_votes(world);
        }
    }

    /// The world was unloaded; discard its state entirely.
    pub fn world_unloaded(&self, world: &WorldId) {
        let removed = lock(&self.worlds).remove(world);
        if let Some(state_arc) = removed {
            lock(&state_arc).clear();
            self.presentation.on_cleared(world);
            self.broadcast(&Notice::VotesCleared {
                world: world.clone(),
            });
        }
    }

    pub fn enable_world(&self, world: &WorldId) {
        self.write_config(|config| config.enable_world(world));
    }

    /// Disabling a world clears whatever vote was in flight there.
    pub fn disable_world(&self, world: &WorldId) {
        self.write_config(|config| config.disable_world(world));
        self.clear_votes(world);
    }

    /// Cancel all timers and drop all per-world state.
    pub fn shutdown(&self) {
        let worlds: Vec<_> = lock(&self.worlds).drain().collect();
        for (world, state_arc) in worlds {
            lock(&state_arc).clear();
            debug!(world = %world, "vote state dropped on shutdown");
        }
    }

    // ==================== Subscriptions ====================

    pub fn register_gate(&self, gate: Arc<dyn VoteGate>) {
        self.gates
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(gate);
    }

    pub fn register_observer(&self, observer: Arc<dyn VoteObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    // ==================== Queries ====================

    pub fn has_voted(&self, world: &WorldId, participant: &ParticipantId) -> bool {
        self.existing_state(world)
            .is_some_and(|state| lock(&state).has_voted(participant))
    }

    pub fn current_votes(&self, world: &WorldId) -> u32 {
        self.existing_state(world)
            .map_or(0, |state| lock(&state).vote_count())
    }

    pub fn required_votes(&self, world: &WorldId) -> u32 {
        let config = self.config_snapshot();
        config
            .quorum_for(world)
            .required(self.policy.eligible_count(world))
    }

    pub fn status(&self, world: &WorldId) -> VoteStatus {
        let config = self.config_snapshot();
        let quorum = config.quorum_for(world);
        let eligible = self.policy.eligible_count(world);

        let (current, countdown_active, executing, last_skip_at) =
            match self.existing_state(world) {
                Some(state_arc) => {
                    let state = lock(&state_arc);
                    (
                        state.vote_count(),
                        state.has_skip_timer(),
                        state.is_executing(),
                        state.last_skip_at(),
                    )
                }
                None => (0, false, false, None),
            };

        VoteStatus {
            world: world.clone(),
            enabled: config.is_world_enabled(world),
            condition: self.effective_condition(&config, world),
            current,
            required: quorum.required(eligible),
            progress: quorum.progress(current, eligible),
            countdown_active,
            executing,
            last_skip_at,
        }
    }

    // ==================== Timer callbacks ====================

    /// The skip countdown elapsed. Revalidates everything (votes may have
    /// been withdrawn, the window may have closed) before executing;
    /// paired with the per-world lock this is what makes a skip fire at
    /// most once per quorum episode.
    fn skip_timer_fired(&self, world: &WorldId) {
        let Some(state_arc) = self.existing_state(world) else {
            return;
        };
        let config = self.config_snapshot();

        let (votes, kind) = {
            let mut state = lock(&state_arc);
            state.take_fired_skip_timer();

            if state.is_executing() || state.is_empty() {
                return;
            }

            let quorum = config.quorum_for(world);
            let eligible = self.policy.eligible_count(world);
            if !quorum.is_met(state.vote_count(), eligible) {
                debug!(world = %world, "skip timer fired below quorum, aborting");
                return;
            }

            let Some(kind) = self.effective_condition(&config, world) else {
                drop(state);
                debug!(world = %world, "condition closed before skip fired");
                self.clear_votes(world);
                return;
            };

            let votes = state.votes_snapshot();
            if self.gates_deny(&GateEvent::SkipExecuting {
                world,
                votes: &votes,
                kind,
            }) {
                debug!(world = %world, "skip vetoed by gate");
                return;
            }
            state.set_executing(true);
            (votes, kind)
        };

        self.presentation.on_skip_executing(world, &votes, kind);
        self.execute_skip(world, votes, kind, &config);
    }

    /// The stale-vote timeout elapsed. Only acts when votes are present
    /// and quorum still is not met; anything else means the episode was
    /// resolved by other means while this timer was in flight.
    fn timeout_fired(&self, world: &WorldId) {
        let Some(state_arc) = self.existing_state(world) else {
            return;
        };
        let config = self.config_snapshot();

        let timed_out = {
            let state = lock(&state_arc);
            if state.is_executing() || state.is_empty() {
                false
            } else {
                let quorum = config.quorum_for(world);
                let eligible = self.policy.eligible_count(world);
                !quorum.is_met(state.vote_count(), eligible)
            }
        };

        if timed_out {
            self.clear_votes(world);
            self.presentation.on_vote_timeout(world);
            self.broadcast(&Notice::VoteTimeout {
                world: world.clone(),
            });
        }
    }

    /// Periodic check for the condition ending on its own (dawn without a
    /// skip, storm blowing over). Exists so a vote set cannot outlive the
    /// thing it was voting about and leave progress indication stuck.
    fn natural_end_tick(&self, world: &WorldId) {
        let Some(state_arc) = self.existing_state(world) else {
            return;
        };
        let config = self.config_snapshot();
        {
            let mut state = lock(&state_arc);
            if !config.is_world_enabled(world) || state.is_empty() {
                state.cancel_natural_end_watch();
                return;
            }
            if state.is_executing() {
                return;
            }
            if self.effective_condition(&config, world).is_some() {
                return;
            }
        }
        debug!(world = %world, "condition ended naturally, clearing votes");
        self.clear_votes(world);
    }

    // ==================== Skip execution ====================

    /// The one skip execution path, shared by quorum countdowns and force
    /// skips. Whole-world mutations go through a Global-affinity action;
    /// per-voter follow-ups through Entity-affinity actions. Side-effect
    /// failures are logged and never unwind into the state machine.
    fn execute_skip(
        &self,
        world: &WorldId,
        votes: Vec<VoteRecord>,
        kind: SkipKind,
        config: &CoordinatorConfig,
    ) {
        let set_day = kind.is_night() && config.night_skip;
        let clear_weather = config.clear_weather;

        let host = Arc::clone(&self.host);
        let target = world.clone();
        let _ = self.scheduler.schedule_once(
            Affinity::Global,
            Duration::ZERO,
            Box::new(move || {
                if set_day && let Err(e) = host.set_world_to_day(&target) {
                    warn!(world = %target, "failed to advance world time: {e}");
                }
                if clear_weather && let Err(e) = host.clear_weather(&target) {
                    warn!(world = %target, "failed to clear weather: {e}");
                }
            }),
        );

        if config.refresh_participants {
            for record in &votes {
                let host = Arc::clone(&self.host);
                let participant = record.participant().clone();
                let _ = self.scheduler.schedule_once(
                    Affinity::Entity(participant.clone()),
                    PARTICIPANT_REFRESH_DELAY,
                    Box::new(move || {
                        if let Err(e) = host.refresh_participant(&participant) {
                            debug!(participant = %participant, "post-skip refresh skipped: {e}");
                        }
                    }),
                );
            }
        }

        self.presentation.on_skip_completed(world, &votes, kind);
        self.persistence
            .record_skip_event(&SkipEvent::new(world.clone(), kind, votes.clone()));
        self.broadcast(&Notice::SkipCompleted {
            world: world.clone(),
            kind,
            voters: votes.len() as u32,
        });

        if let Some(state_arc) = self.existing_state(world) {
            lock(&state_arc).mark_skipped(now_millis());
        }
        self.clear_votes(world);
    }

    // ==================== Timer arming ====================

    fn arm_skip_countdown(
        &self,
        world: &WorldId,
        state: &mut WorldVoteState,
        config: &CoordinatorConfig,
        kind: SkipKind,
    ) {
        state.cancel_natural_end_watch();

        let me = self.me.clone();
        let target = world.clone();
        let handle = self.scheduler.schedule_once(
            Affinity::Global,
            config.skip_delay,
            Box::new(move || {
                if let Some(coordinator) = me.upgrade() {
                    coordinator.skip_timer_fired(&target);
                }
            }),
        );
        state.arm_skip_timer(handle);
        self.presentation
            .on_skip_scheduled(world, config.skip_delay.as_secs(), kind);
    }

    fn arm_timeout(&self, world: &WorldId, state: &mut WorldVoteState, config: &CoordinatorConfig) {
        let me = self.me.clone();
        let target = world.clone();
        let handle = self.scheduler.schedule_once(
            Affinity::Global,
            config.vote_timeout,
            Box::new(move || {
                if let Some(coordinator) = me.upgrade() {
                    coordinator.timeout_fired(&target);
                }
            }),
        );
        state.arm_timeout_timer(handle);
    }

    fn ensure_natural_end_watch(
        &self,
        world: &WorldId,
        state: &mut WorldVoteState,
        config: &CoordinatorConfig,
    ) {
        if state.has_natural_end_watch() {
            return;
        }
        let me = self.me.clone();
        let target = world.clone();
        let handle = self.scheduler.schedule_repeating(
            Affinity::World(world.clone()),
            config.natural_end_interval,
            config.natural_end_interval,
            Box::new(move || {
                if let Some(coordinator) = me.upgrade() {
                    coordinator.natural_end_tick(&target);
                }
            }),
        );
        state.arm_natural_end_watch(handle);
    }

    // ==================== Internals ====================

    fn config_snapshot(&self) -> CoordinatorConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn write_config(&self, mutate: impl FnOnce(&mut CoordinatorConfig)) {
        mutate(&mut self.config.write().unwrap_or_else(PoisonError::into_inner));
    }

    /// The condition window currently open, filtered by what this
    /// configuration allows to be skipped.
    fn effective_condition(
        &self,
        config: &CoordinatorConfig,
        world: &WorldId,
    ) -> Option<SkipKind> {
        self.policy
            .skippable_condition(world)
            .filter(|kind| config.allows(*kind))
    }

    fn state_for(&self, world: &WorldId) -> Arc<Mutex<WorldVoteState>> {
        lock(&self.worlds)
            .entry(world.clone())
            .or_insert_with(|| Arc::new(Mutex::new(WorldVoteState::new())))
            .clone()
    }

    fn existing_state(&self, world: &WorldId) -> Option<Arc<Mutex<WorldVoteState>>> {
        lock(&self.worlds).get(world).cloned()
    }

    fn gates_deny(&self, event: &GateEvent<'_>) -> bool {
        let gates = self.gates.read().unwrap_or_else(PoisonError::into_inner);
        gates.iter().any(|gate| gate.review(event).is_denied())
    }

    fn broadcast(&self, notice: &Notice) {
        let observers = self.observers.read().unwrap_or_else(PoisonError::into_inner);
        for observer in observers.iter() {
            observer.notify(notice);
        }
    }
}
