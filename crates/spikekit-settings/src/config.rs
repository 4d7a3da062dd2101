//! Configuration file handling for SpikeKit
//!
//! Configuration is organized into sections:
//! - Session settings (handler naming, action registration policy)
//! - Logging settings (default level, output format)
//!
//! Files are JSON or TOML, chosen by extension.

use serde::{Deserialize, Serialize};
use spikekit_core::{SessionConfig, HANDLER_PREFIX};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, SettingsError, SettingsResult};

/// Directory name under the platform config directory
const APP_DIR: &str = "spikekit";
/// Default config file name
const CONFIG_FILE: &str = "config.toml";

/// Session settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Prefix a handler name must start with
    pub handler_prefix: String,
    /// Replace an action registered twice under the same name
    pub allow_action_override: bool,
    /// Log every handler invocation at trace level
    pub trace_emissions: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            handler_prefix: HANDLER_PREFIX.to_string(),
            allow_action_override: true,
            trace_emissions: false,
        }
    }
}

impl From<&SessionSettings> for SessionConfig {
    fn from(settings: &SessionSettings) -> Self {
        SessionConfig {
            handler_prefix: settings.handler_prefix.clone(),
            allow_action_override: settings.allow_action_override,
            trace_emissions: settings.trace_emissions,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable multi-line output
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default level when RUST_LOG is not set
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl LoggingSettings {
    /// Parsed default level
    pub fn level(&self) -> SettingsResult<tracing::Level> {
        self.level.parse::<tracing::Level>().map_err(|_| {
            ConfigError::InvalidSetting {
                key: "logging.level".to_string(),
                reason: format!("unknown level '{}'", self.level),
            }
            .into()
        })
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Session settings
    pub session: SessionSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location
    pub fn default_path() -> SettingsResult<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string())
        })?;
        Ok(dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let config: Self = match Format::of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load config from file, or defaults if the file does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| SettingsError::SaveError(format!("{}: {}", parent.display(), e)))?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let prefix = &self.session.handler_prefix;
        if prefix.is_empty() {
            return Err(invalid("session.handler_prefix", "must not be empty"));
        }
        if !prefix.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(invalid(
                "session.handler_prefix",
                "must only contain letters, digits and '_'",
            ));
        }

        self.logging.level()?;
        Ok(())
    }

    /// Session configuration derived from these settings
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::from(&self.session)
    }
}

fn invalid(key: &str, reason: &str) -> SettingsError {
    ConfigError::InvalidSetting {
        key: key.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

/// Supported file formats
enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into()),
        }
    }
}
