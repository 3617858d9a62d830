//! Simulated game host.
//!
//! A tiny in-memory stand-in for a real game server: worlds with a tick
//! clock and weather flag, participants that join and leave. Backs the
//! CLI and exercises the engine end to end without a host runtime.
//!
//! The night window boundaries are this host's own policy; the engine
//! never sees tick values, only the [`EligibilityPolicy`] answers.

use skipvote_application::{EligibilityPolicy, HostError, WorldHost};
use skipvote_domain::{ParticipantId, SkipKind, WorldId};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Ticks in one full day cycle.
pub const TICKS_PER_DAY: u64 = 24_000;

/// First tick of the night window.
const NIGHT_START: u64 = 12_542;

/// Last tick of the night window.
const NIGHT_END: u64 = 23_459;

/// Where "morning" lands after a skip.
const MORNING: u64 = 1_000;

#[derive(Debug, Default)]
struct SimWorld {
    time: u64,
    storm: bool,
    participants: HashSet<ParticipantId>,
}

/// In-memory multi-world host simulation.
#[derive(Default)]
pub struct SimulatedHost {
    worlds: Mutex<HashMap<WorldId, SimWorld>>,
    exempt: Mutex<HashSet<ParticipantId>>,
}

impl SimulatedHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a tick value falls inside the night window.
    pub fn is_night_time(time: u64) -> bool {
        (NIGHT_START..=NIGHT_END).contains(&(time % TICKS_PER_DAY))
    }

    fn worlds(&self) -> MutexGuard<'_, HashMap<WorldId, SimWorld>> {
        self.worlds.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn exempt_set(&self) -> MutexGuard<'_, HashSet<ParticipantId>> {
        self.exempt.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_world(&self, world: &WorldId) {
        self.worlds().entry(world.clone()).or_default();
    }

    pub fn remove_world(&self, world: &WorldId) {
        self.worlds().remove(world);
    }

    /// Put a participant into a world, leaving any previous one.
    pub fn join(&self, world: &WorldId, participant: &ParticipantId) {
        let mut worlds = self.worlds();
        for sim in worlds.values_mut() {
            sim.participants.remove(participant);
        }
        worlds
            .entry(world.clone())
            .or_default()
            .participants
            .insert(participant.clone());
    }

    pub fn leave(&self, world: &WorldId, participant: &ParticipantId) {
        if let Some(sim) = self.worlds().get_mut(world) {
            sim.participants.remove(participant);
        }
    }

    pub fn set_exempt(&self, participant: &ParticipantId, exempt: bool) {
        if exempt {
            self.exempt_set().insert(participant.clone());
        } else {
            self.exempt_set().remove(participant);
        }
    }

    pub fn set_time(&self, world: &WorldId, time: u64) {
        if let Some(sim) = self.worlds().get_mut(world) {
            sim.time = time % TICKS_PER_DAY;
        }
    }

    pub fn set_storm(&self, world: &WorldId, storm: bool) {
        if let Some(sim) = self.worlds().get_mut(world) {
            sim.storm = storm;
        }
    }

    /// Advance the world clock.
    pub fn advance(&self, world: &WorldId, ticks: u64) {
        if let Some(sim) = self.worlds().get_mut(world) {
            sim.time = (sim.time + ticks) % TICKS_PER_DAY;
        }
    }

    pub fn time(&self, world: &WorldId) -> Option<u64> {
        self.worlds().get(world).map(|sim| sim.time)
    }

    pub fn is_storm(&self, world: &WorldId) -> Option<bool> {
        self.worlds().get(world).map(|sim| sim.storm)
    }

    pub fn participants(&self, world: &WorldId) -> Vec<ParticipantId> {
        self.worlds()
            .get(world)
            .map(|sim| sim.participants.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn world_of(&self, participant: &ParticipantId) -> Option<WorldId> {
        self.worlds()
            .iter()
            .find(|(_, sim)| sim.participants.contains(participant))
            .map(|(world, _)| world.clone())
    }
}

impl EligibilityPolicy for SimulatedHost {
    fn is_exempt(&self, _world: &WorldId, participant: &ParticipantId) -> bool {
        self.exempt_set().contains(participant)
    }

    fn skippable_condition(&self, world: &WorldId) -> Option<SkipKind> {
        let worlds = self.worlds();
        let sim = worlds.get(world)?;
        if Self::is_night_time(sim.time) {
            Some(SkipKind::Night)
        } else if sim.storm {
            Some(SkipKind::Storm)
        } else {
            None
        }
    }

    fn eligible_count(&self, world: &WorldId) -> u32 {
        let exempt = self.exempt_set();
        self.worlds()
            .get(world)
            .map(|sim| {
                sim.participants
                    .iter()
                    .filter(|p| !exempt.contains(*p))
                    .count() as u32
            })
            .unwrap_or(0)
    }
}

impl WorldHost for SimulatedHost {
    fn set_world_to_day(&self, world: &WorldId) -> Result<(), HostError> {
        let mut worlds = self.worlds();
        let sim = worlds.get_mut(world).ok_or(HostError::WorldUnloaded)?;
        sim.time = MORNING;
        debug!(world = %world, "world time set to morning");
        Ok(())
    }

    fn clear_weather(&self, world: &WorldId) -> Result<(), HostError> {
        let mut worlds = self.worlds();
        let sim = worlds.get_mut(world).ok_or(HostError::WorldUnloaded)?;
        sim.storm = false;
        debug!(world = %world, "weather cleared");
        Ok(())
    }

    fn refresh_participant(&self, participant: &ParticipantId) -> Result<(), HostError> {
        if self.world_of(participant).is_none() {
            return Err(HostError::ParticipantOffline);
        }
        debug!(participant = %participant, "participant refreshed after skip");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overworld() -> WorldId {
        WorldId::new("overworld")
    }

    #[test]
    fn test_night_window_boundaries() {
        assert!(!SimulatedHost::is_night_time(0));
        assert!(!SimulatedHost::is_night_time(NIGHT_START - 1));
        assert!(SimulatedHost::is_night_time(NIGHT_START));
        assert!(SimulatedHost::is_night_time(18_000));
        assert!(SimulatedHost::is_night_time(NIGHT_END));
        assert!(!SimulatedHost::is_night_time(NIGHT_END + 1));
    }

    #[test]
    fn test_condition_reporting() {
        let host = SimulatedHost::new();
        let world = overworld();
        host.add_world(&world);

        host.set_time(&world, 6_000);
        assert_eq!(host.skippable_condition(&world), None);

        host.set_time(&world, 14_000);
        assert_eq!(host.skippable_condition(&world), Some(SkipKind::Night));

        // Night takes precedence over storm.
        host.set_storm(&world, true);
        assert_eq!(host.skippable_condition(&world), Some(SkipKind::Night));

        host.set_time(&world, 6_000);
        assert_eq!(host.skippable_condition(&world), Some(SkipKind::Storm));

        assert_eq!(host.skippable_condition(&WorldId::new("void")), None);
    }

    #[test]
    fn test_eligible_count_excludes_exempt() {
        let host = SimulatedHost::new();
        let world = overworld();
        host.add_world(&world);
        host.join(&world, &"steve".into());
        host.join(&world, &"alex".into());
        host.join(&world, &"ghost".into());

        assert_eq!(host.eligible_count(&world), 3);

        host.set_exempt(&"ghost".into(), true);
        assert_eq!(host.eligible_count(&world), 2);

        host.set_exempt(&"ghost".into(), false);
        assert_eq!(host.eligible_count(&world), 3);
    }

    #[test]
    fn test_join_moves_between_worlds() {
        let host = SimulatedHost::new();
        let overworld = overworld();
        let nether = WorldId::new("nether");
        host.add_world(&overworld);
        host.add_world(&nether);

        host.join(&overworld, &"steve".into());
        host.join(&nether, &"steve".into());

        assert_eq!(host.eligible_count(&overworld), 0);
        assert_eq!(host.eligible_count(&nether), 1);
        assert_eq!(host.world_of(&"steve".into()), Some(nether));
    }

    #[test]
    fn test_skip_mutations() {
        let host = SimulatedHost::new();
        let world = overworld();
        host.add_world(&world);
        host.set_time(&world, 14_000);
        host.set_storm(&world, true);

        host.set_world_to_day(&world).unwrap();
        host.clear_weather(&world).unwrap();

        assert_eq!(host.time(&world), Some(MORNING));
        assert_eq!(host.is_storm(&world), Some(false));

        let void = WorldId::new("void");
        assert!(matches!(
            host.set_world_to_day(&void),
            Err(HostError::WorldUnloaded)
        ));
    }

    #[test]
    fn test_refresh_requires_online_participant() {
        let host = SimulatedHost::new();
        let world = overworld();
        host.add_world(&world);
        host.join(&world, &"steve".into());

        assert!(host.refresh_participant(&"steve".into()).is_ok());
        assert!(matches!(
            host.refresh_participant(&"herobrine".into()),
            Err(HostError::ParticipantOffline)
        ));
    }

    #[test]
    fn test_advance_wraps_the_day() {
        let host = SimulatedHost::new();
        let world = overworld();
        host.add_world(&world);
        host.set_time(&world, 23_000);
        host.advance(&world, 2_000);
        assert_eq!(host.time(&world), Some(1_000));
    }
}
