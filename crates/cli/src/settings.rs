//! Layered runtime settings
//!
//! Precedence, lowest to highest:
//! 1. Built-in defaults (poll 5s, stability 2s, skip duplicates)
//! 2. TOML settings file (explicit --config, or the platform config dir)
//! 3. INTAKE_* environment variables
//! 4. Command-line flags

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use watcher::{DuplicatePolicy, WatchConfig};

/// Runtime settings shared by the watch and drain subcommands
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Seconds between drop-directory scans
    pub poll_interval: f64,

    /// Seconds a folder must stay unchanged before upload
    pub stability_wait: f64,

    /// What the backend should do with already-known documents
    pub duplicate_handling: DuplicatePolicy,
}

/// Default settings file location: `<config dir>/intake/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("intake").join("config.toml"))
}

/// Load settings with layered precedence
///
/// An explicitly passed file must exist; the default location is optional.
pub fn load(config_file: Option<&Path>) -> Result<Settings> {
    load_layered(
        config_file,
        default_config_path(),
        Environment::with_prefix("INTAKE").try_parsing(true),
    )
}

/// The full layering, with every source injectable
fn load_layered(
    config_file: Option<&Path>,
    default_file: Option<PathBuf>,
    env: Environment,
) -> Result<Settings> {
    let mut builder = Config::builder()
        .set_default("poll_interval", 5.0)?
        .set_default("stability_wait", 2.0)?
        .set_default("duplicate_handling", "skip")?;

    match config_file {
        Some(path) => {
            builder = builder.add_source(File::from(path.to_path_buf()));
        }
        None => {
            if let Some(path) = default_file {
                builder = builder.add_source(File::from(path).required(false));
            }
        }
    }

    let settings: Settings = builder
        .add_source(env)
        .build()
        .context("Failed to load configuration")?
        .try_deserialize()
        .context("Invalid configuration")?;

    settings.validate()?;
    Ok(settings)
}

impl Settings {
    /// Apply command-line overrides, the highest-precedence layer
    pub fn with_overrides(
        mut self,
        poll_interval: Option<f64>,
        stability_wait: Option<f64>,
        duplicate_handling: Option<DuplicatePolicy>,
    ) -> Result<Self> {
        if let Some(poll) = poll_interval {
            self.poll_interval = poll;
        }
        if let Some(wait) = stability_wait {
            self.stability_wait = wait;
        }
        if let Some(policy) = duplicate_handling {
            self.duplicate_handling = policy;
        }
        self.validate()?;
        Ok(self)
    }

    /// Settings in the form the watch loop consumes
    pub fn watch_config(&self) -> WatchConfig {
        WatchConfig {
            poll_interval: Duration::from_secs_f64(self.poll_interval),
            stability_wait: Duration::from_secs_f64(self.stability_wait),
            policy: self.duplicate_handling,
        }
    }

    fn validate(&self) -> Result<()> {
        // try_from_secs_f64 rejects NaN, infinities and values a Duration
        // cannot hold, which keeps watch_config() panic-free
        if self.poll_interval <= 0.0 || Duration::try_from_secs_f64(self.poll_interval).is_err() {
            bail!(
                "poll_interval must be a positive number of seconds, got {}",
                self.poll_interval
            );
        }
        if self.stability_wait < 0.0 || Duration::try_from_secs_f64(self.stability_wait).is_err() {
            bail!(
                "stability_wait must be zero or more seconds, got {}",
                self.stability_wait
            );
        }
        Ok(())
    }
}
