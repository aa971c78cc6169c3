//! EngraveKit Settings Crate
//!
//! Handles the defaults new point groups are created with, and their
//! persistence as JSON or TOML.

pub mod config;
pub mod error;

pub use config::{
    default_config_path, Config, DashDefaults, GeneratorDefaults, GrowthDefaults, TraceDefaults,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
