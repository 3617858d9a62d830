//! Per-world vote state.
//!
//! One instance per world, created lazily on first vote, owned exclusively
//! by the coordinator. The three timer handles live here so a cleared
//! state cannot leave an orphaned timer behind in some side table.

use crate::ports::TaskHandle;
use skipvote_domain::{EpochMillis, ParticipantId, VoteRecord};
use std::collections::HashMap;

/// Mutable vote aggregate for one world.
///
/// Invariant: at most one of `skip_timer` / `timeout_timer` is armed at any
/// instant; arming either cancels the other. The natural-end watch may run
/// alongside the timeout.
#[derive(Default)]
pub struct WorldVoteState {
    votes: HashMap<ParticipantId, VoteRecord>,
    last_skip_at: Option<EpochMillis>,
    executing: bool,
    skip_timer: Option<TaskHandle>,
    timeout_timer: Option<TaskHandle>,
    natural_end_watch: Option<TaskHandle>,
}

impl WorldVoteState {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== votes ====================

    pub fn add_vote(&mut self, record: VoteRecord) {
        self.votes.insert(record.participant().clone(), record);
    }

    pub fn remove_vote(&mut self, participant: &ParticipantId) -> Option<VoteRecord> {
        self.votes.remove(participant)
    }

    pub fn has_voted(&self, participant: &ParticipantId) -> bool {
        self.votes.contains_key(participant)
    }

    pub fn vote_count(&self) -> u32 {
        self.votes.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    pub fn votes_snapshot(&self) -> Vec<VoteRecord> {
        self.votes.values().cloned().collect()
    }

    // ==================== lifecycle flags ====================

    pub fn is_executing(&self) -> bool {
        self.executing
    }

    pub fn set_executing(&mut self, executing: bool) {
        self.executing = executing;
    }

    pub fn last_skip_at(&self) -> Option<EpochMillis> {
        self.last_skip_at
    }

    pub fn mark_skipped(&mut self, at: EpochMillis) {
        self.last_skip_at = Some(at);
    }

    // ==================== timers ====================

    /// Arm the skip countdown, superseding any timeout atomically within
    /// the same mutation. This is the tie-break rule: a vote that
    /// completes quorum always wins over a timeout racing to fire.
    pub fn arm_skip_timer(&mut self, handle: TaskHandle) {
        self.cancel_timeout_timer();
        self.cancel_skip_timer();
        self.skip_timer = Some(handle);
    }

    /// Arm (or re-arm) the stale-vote timeout. Never coexists with a skip
    /// countdown.
    pub fn arm_timeout_timer(&mut self, handle: TaskHandle) {
        self.cancel_skip_timer();
        self.cancel_timeout_timer();
        self.timeout_timer = Some(handle);
    }

    pub fn arm_natural_end_watch(&mut self, handle: TaskHandle) {
        self.cancel_natural_end_watch();
        self.natural_end_watch = Some(handle);
    }

    pub fn has_skip_timer(&self) -> bool {
        self.skip_timer.is_some()
    }

    pub fn has_timeout_timer(&self) -> bool {
        self.timeout_timer.is_some()
    }

    pub fn has_natural_end_watch(&self) -> bool {
        self.natural_end_watch.is_some()
    }

    /// Drop the skip-timer handle without cancelling, used by the timer
    /// callback itself once it has fired.
    pub fn take_fired_skip_timer(&mut self) -> Option<TaskHandle> {
        self.skip_timer.take()
    }

    pub fn cancel_skip_timer(&mut self) {
        if let Some(handle) = self.skip_timer.take() {
            handle.cancel();
        }
    }

    pub fn cancel_timeout_timer(&mut self) {
        if let Some(handle) = self.timeout_timer.take() {
            handle.cancel();
        }
    }

    pub fn cancel_natural_end_watch(&mut self) {
        if let Some(handle) = self.natural_end_watch.take() {
            handle.cancel();
        }
    }

    pub fn cancel_all_timers(&mut self) {
        self.cancel_skip_timer();
        self.cancel_timeout_timer();
        self.cancel_natural_end_watch();
    }

    /// Reset to Idle: votes emptied, all timers cancelled. Keeps
    /// `last_skip_at` (informational).
    pub fn clear(&mut self) {
        self.votes.clear();
        self.executing = false;
        self.cancel_all_timers();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skipvote_domain::Voter;

    #[test]
    fn test_vote_bookkeeping() {
        let mut state = WorldVoteState::new();
        assert!(state.is_empty());

        state.add_vote(VoteRecord::cast(&Voter::from("steve")));
        state.add_vote(VoteRecord::cast(&Voter::from("alex")));
        assert_eq!(state.vote_count(), 2);
        assert!(state.has_voted(&"steve".into()));

        // Re-voting the same participant does not duplicate.
        state.add_vote(VoteRecord::cast(&Voter::from("steve")));
        assert_eq!(state.vote_count(), 2);

        assert!(state.remove_vote(&"steve".into()).is_some());
        assert!(state.remove_vote(&"steve".into()).is_none());
        assert_eq!(state.vote_count(), 1);
    }

    #[test]
    fn test_skip_and_timeout_are_mutually_exclusive() {
        let mut state = WorldVoteState::new();

        let timeout = TaskHandle::mint();
        state.arm_timeout_timer(timeout.clone());
        assert!(state.has_timeout_timer());

        // Arming the skip countdown supersedes the timeout.
        let skip = TaskHandle::mint();
        state.arm_skip_timer(skip.clone());
        assert!(state.has_skip_timer());
        assert!(!state.has_timeout_timer());
        assert!(timeout.is_cancelled());
        assert!(!skip.is_cancelled());

        // And the other way around.
        let timeout2 = TaskHandle::mint();
        state.arm_timeout_timer(timeout2);
        assert!(!state.has_skip_timer());
        assert!(skip.is_cancelled());
    }

    #[test]
    fn test_rearming_cancels_previous_handle() {
        let mut state = WorldVoteState::new();
        let first = TaskHandle::mint();
        state.arm_skip_timer(first.clone());
        let second = TaskHandle::mint();
        state.arm_skip_timer(second.clone());

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
    }

    #[test]
    fn test_clear_is_idempotent_and_cancels_everything() {
        let mut state = WorldVoteState::new();
        state.add_vote(VoteRecord::cast(&Voter::from("steve")));
        let skip = TaskHandle::mint();
        let watch = TaskHandle::mint();
        state.arm_skip_timer(skip.clone());
        state.arm_natural_end_watch(watch.clone());
        state.mark_skipped(42);

        state.clear();
        assert!(state.is_empty());
        assert!(!state.has_skip_timer());
        assert!(!state.has_natural_end_watch());
        assert!(skip.is_cancelled());
        assert!(watch.is_cancelled());
        // Informational timestamp survives the clear.
        assert_eq!(state.last_skip_at(), Some(42));

        // Second clear: same state, no panic.
        state.clear();
        assert!(state.is_empty());
    }
}
