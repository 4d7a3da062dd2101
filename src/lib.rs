//! # SpikeKit
//!
//! Session plumbing for interactive spike-sorting views.
//!
//! ## Architecture
//!
//! SpikeKit is organized as a workspace with multiple crates:
//!
//! 1. **spikekit-core** - Session event dispatch, actions, argument binding, errors
//! 2. **spikekit-settings** - Config files for session and logging settings
//! 3. **spikekit** - Logging setup and the demo binary

pub use spikekit_core::{
    args, Action, ActionOptions, Args, Bound, Callback, Result, Session, SessionConfig,
    SessionError, Signature,
};
pub use spikekit_settings::{Config, LogFormat, LoggingSettings, SessionSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "SPIKEKIT_CONFIG";

/// Initialize logging from the logging settings
///
/// Sets up structured logging with:
/// - RUST_LOG environment variable support, on top of the configured level
/// - Pretty console output, or JSON lines
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(settings.level()?.into());

    match settings.format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(true)
                .with_level(true)
                .with_line_number(true)
                .pretty();
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(true)
                .with_level(true)
                .json();
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
    }

    Ok(())
}

/// Load the application config.
///
/// Uses the file named by `SPIKEKIT_CONFIG` if set, otherwise the platform
/// default location. A missing file yields the defaults.
pub fn load_config() -> anyhow::Result<Config> {
    let path = match std::env::var_os(CONFIG_ENV) {
        Some(path) => std::path::PathBuf::from(path),
        None => Config::default_path()?,
    };
    Ok(Config::load_or_default(&path)?)
}

/// Create a session configured from `config`
pub fn session_from_config(config: &Config) -> Session {
    Session::with_config(config.session_config())
}
