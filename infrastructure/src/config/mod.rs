//! Configuration loading: TOML files merged with environment overrides,
//! validated, then converted to the application-layer config.

pub mod file_config;
pub mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileHostConfig, FileSkipConfig, FileStorageConfig,
    FileVoteConfig, FileWorldConfig,
};
pub use loader::ConfigLoader;
