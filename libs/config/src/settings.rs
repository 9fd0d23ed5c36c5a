//! Settings Module
//!
//! Layered loading of codec and logging settings:
//! built-in defaults, then an optional TOML file, then `PROMOWIRE_`
//! environment variables (`__` separates nested keys, e.g.
//! `PROMOWIRE_CODEC__MAX_DEPTH=32`).

use anyhow::{ensure, Context, Result};
use codec::CodecConfig;
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Environment prefix for every override
pub const ENV_PREFIX: &str = "PROMOWIRE";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub codec: CodecConfig,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive, e.g. `info` or `codec=debug,info`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Load settings from an optional file plus `PROMOWIRE_*` environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    pub(crate) fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading settings file: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder
            .build()
            .context("Failed to build settings")?
            .try_deserialize()
            .context("Failed to deserialize settings")?;

        settings.validate()?;
        debug!(?settings, "settings loaded");
        Ok(settings)
    }

    /// Parse settings from TOML text without consulting the environment
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(text).context("Failed to parse settings TOML")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.codec.max_depth > 0, "codec.max_depth must be at least 1");
        ensure!(
            self.codec.max_message_bytes > 0,
            "codec.max_message_bytes must be at least 1"
        );
        ensure!(!self.logging.level.trim().is_empty(), "logging.level must not be empty");
        Ok(())
    }
}
