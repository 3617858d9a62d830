//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly, validated, and then converted into the
//! application-layer [`CoordinatorConfig`].

use crate::scheduler::HostModel;
use serde::{Deserialize, Serialize};
use skipvote_application::{CoordinatorConfig, WorldOverride};
use skipvote_domain::QuorumPolicy;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("vote.percentage must be within (0, 1], got {0}")]
    InvalidPercentage(f64),

    #[error("vote.timeout_seconds cannot be 0")]
    ZeroTimeout,

    #[error("skip.natural_end_check_seconds cannot be 0")]
    ZeroWatchInterval,

    #[error("worlds.{0}.percentage must be within (0, 1], got {1}")]
    InvalidWorldPercentage(String, f64),
}

/// Raw vote/quorum configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileVoteConfig {
    /// Fraction of eligible players that must vote, in (0, 1].
    pub percentage: f64,
    /// Absolute floor on the requirement.
    pub minimum: u32,
    /// Absolute cap on the requirement; 0 or negative means uncapped.
    pub maximum: i64,
    /// How long a below-quorum vote set survives, in seconds.
    pub timeout_seconds: u64,
}

impl Default for FileVoteConfig {
    fn default() -> Self {
        Self {
            percentage: 0.5,
            minimum: 1,
            maximum: -1,
            timeout_seconds: 60,
        }
    }
}

/// Raw skip-behavior configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSkipConfig {
    /// Countdown between quorum and execution, in seconds.
    pub delay_seconds: u64,
    /// Allow skipping night windows.
    pub night: bool,
    /// Allow skipping storm windows.
    pub storm: bool,
    /// Clear the weather as part of an executed skip.
    pub clear_weather: bool,
    /// Give voters a post-skip refresh.
    pub refresh_participants: bool,
    /// Natural-end watch interval, in seconds.
    pub natural_end_check_seconds: u64,
}

impl Default for FileSkipConfig {
    fn default() -> Self {
        Self {
            delay_seconds: 3,
            night: true,
            storm: true,
            clear_weather: true,
            refresh_participants: true,
            natural_end_check_seconds: 1,
        }
    }
}

/// Raw host configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileHostConfig {
    /// Threading model of the host runtime.
    pub model: HostModel,
}

/// Raw skip-history storage configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Append completed skips to a JSONL history file.
    pub history: bool,
    /// History file location; defaults next to the config dir.
    pub path: Option<String>,
}

/// Raw per-world overrides from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWorldConfig {
    pub enabled: bool,
    pub percentage: Option<f64>,
}

/// Raw top-level configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub vote: FileVoteConfig,
    pub skip: FileSkipConfig,
    pub host: FileHostConfig,
    pub storage: FileStorageConfig,
    /// Per-world settings, keyed by world id.
    pub worlds: HashMap<String, FileWorldConfig>,
}

fn valid_percentage(p: f64) -> bool {
    p.is_finite() && p > 0.0 && p <= 1.0
}

impl FileConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !valid_percentage(self.vote.percentage) {
            return Err(ConfigValidationError::InvalidPercentage(
                self.vote.percentage,
            ));
        }
        if self.vote.timeout_seconds == 0 {
            return Err(ConfigValidationError::ZeroTimeout);
        }
        if self.skip.natural_end_check_seconds == 0 {
            return Err(ConfigValidationError::ZeroWatchInterval);
        }
        for (name, world) in &self.worlds {
            if let Some(p) = world.percentage
                && !valid_percentage(p)
            {
                return Err(ConfigValidationError::InvalidWorldPercentage(
                    name.clone(),
                    p,
                ));
            }
        }
        Ok(())
    }

    /// Convert into the validated application-layer shape.
    pub fn to_coordinator_config(&self) -> CoordinatorConfig {
        let maximum = u32::try_from(self.vote.maximum).ok().filter(|m| *m > 0);
        CoordinatorConfig {
            quorum: QuorumPolicy::new(self.vote.percentage, self.vote.minimum, maximum),
            skip_delay: Duration::from_secs(self.skip.delay_seconds),
            vote_timeout: Duration::from_secs(self.vote.timeout_seconds),
            natural_end_interval: Duration::from_secs(self.skip.natural_end_check_seconds),
            night_skip: self.skip.night,
            storm_skip: self.skip.storm,
            clear_weather: self.skip.clear_weather,
            refresh_participants: self.skip.refresh_participants,
            worlds: self
                .worlds
                .iter()
                .map(|(name, world)| {
                    (
                        name.clone(),
                        WorldOverride {
                            enabled: world.enabled,
                            percentage: world.percentage,
                        },
                    )
                })
                .collect(),
        }
    }
}
