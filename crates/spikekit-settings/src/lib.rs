//! SpikeKit Settings Crate
//!
//! Handles application configuration: loading and saving config files and
//! turning them into session and logging settings.

pub mod config;
pub mod error;

pub use config::{Config, LogFormat, LoggingSettings, SessionSettings};
pub use error::{ConfigError, SettingsError, SettingsResult};
