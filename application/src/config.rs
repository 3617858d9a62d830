//! Coordinator configuration.
//!
//! Infrastructure loads and validates the on-disk form; this is the
//! already-validated shape the coordinator consumes.

use skipvote_domain::{QuorumPolicy, SkipKind, WorldId};
use std::collections::HashMap;
use std::time::Duration;

/// Per-world settings overriding the global defaults.
///
/// A world must have an override with `enabled = true` before votes are
/// accepted in it; unknown worlds reject votes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldOverride {
    pub enabled: bool,
    /// Overrides the global quorum percentage for this world.
    pub percentage: Option<f64>,
}

/// Validated coordinator configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorConfig {
    /// Global quorum policy (percentage, floor, cap).
    pub quorum: QuorumPolicy,
    /// Countdown between quorum and skip execution.
    pub skip_delay: Duration,
    /// How long a below-quorum vote set survives before being cleared.
    pub vote_timeout: Duration,
    /// Poll interval of the natural-end watch.
    pub natural_end_interval: Duration,
    /// Whether night windows can be skipped.
    pub night_skip: bool,
    /// Whether storm windows can be skipped.
    pub storm_skip: bool,
    /// Whether an executed skip also clears the weather.
    pub clear_weather: bool,
    /// Whether voters get a post-skip refresh (rest stats etc).
    pub refresh_participants: bool,
    /// Per-world enablement and overrides, keyed by world id.
    pub worlds: HashMap<String, WorldOverride>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            quorum: QuorumPolicy::default(),
            skip_delay: Duration::from_secs(3),
            vote_timeout: Duration::from_secs(60),
            natural_end_interval: Duration::from_secs(1),
            night_skip: true,
            storm_skip: true,
            clear_weather: true,
            refresh_participants: true,
            worlds: HashMap::new(),
        }
    }
}

impl CoordinatorConfig {
    /// Whether this configuration allows skipping the given kind of
    /// condition window. Forced skips are always allowed.
    pub fn allows(&self, kind: SkipKind) -> bool {
        match kind {
            SkipKind::Night => self.night_skip,
            SkipKind::Storm => self.storm_skip,
            SkipKind::Forced => true,
        }
    }

    pub fn is_world_enabled(&self, world: &WorldId) -> bool {
        self.worlds
            .get(world.as_str())
            .is_some_and(|w| w.enabled)
    }

    /// The quorum policy effective in `world` (global policy with the
    /// world's percentage override applied, if any).
    pub fn quorum_for(&self, world: &WorldId) -> QuorumPolicy {
        let mut policy = self.quorum;
        if let Some(overridden) = self
            .worlds
            .get(world.as_str())
            .and_then(|w| w.percentage)
        {
            policy.percentage = overridden;
        }
        policy
    }

    pub fn enable_world(&mut self, world: &WorldId) {
        self.worlds
            .entry(world.as_str().to_string())
            .or_default()
            .enabled = true;
    }

    pub fn disable_world(&mut self, world: &WorldId) {
        if let Some(entry) = self.worlds.get_mut(world.as_str()) {
            entry.enabled = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worlds_default_to_disabled() {
        let config = CoordinatorConfig::default();
        assert!(!config.is_world_enabled(&WorldId::new("overworld")));
    }

    #[test]
    fn test_enable_disable_round_trip() {
        let mut config = CoordinatorConfig::default();
        let world = WorldId::new("overworld");

        config.enable_world(&world);
        assert!(config.is_world_enabled(&world));

        config.disable_world(&world);
        assert!(!config.is_world_enabled(&world));
    }

    #[test]
    fn test_disable_unknown_world_is_noop() {
        let mut config = CoordinatorConfig::default();
        config.disable_world(&WorldId::new("nowhere"));
        assert!(config.worlds.is_empty());
    }

    #[test]
    fn test_percentage_override_applies() {
        let mut config = CoordinatorConfig::default();
        let world = WorldId::new("overworld");
        config.enable_world(&world);
        config.worlds.get_mut("overworld").unwrap().percentage = Some(1.0);

        assert_eq!(config.quorum_for(&world).percentage, 1.0);
        // Other worlds keep the global policy.
        assert_eq!(
            config.quorum_for(&WorldId::new("nether")).percentage,
            config.quorum.percentage
        );
    }
}
