//! # Promowire Configuration
//!
//! Layered settings for promowire tools: codec limits and logging.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use promowire_config::Settings;
//! use std::path::Path;
//!
//! let settings = Settings::load(Some(Path::new("promowire.toml")))?;
//! let decoder = codec::Decoder::new(settings.codec.clone());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod settings;

pub use settings::{LoggingSettings, Settings, ENV_PREFIX};
