//! Configuration management for ytte
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use ytte::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Server listening on: {}", config.server.bind_addr);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `YTTE__<section>__<key>`
//!
//! Examples:
//! - `YTTE__SERVER__BIND_ADDR=0.0.0.0:9000`
//! - `YTTE__EXTRACTOR__BINARY=/usr/local/bin/yt-dlp`
//! - `YTTE__EXTRACTOR__EXTRA_ARGS="--proxy socks5://127.0.0.1:1080"` (space separated)
//! - `YTTE__STAGING__DIR=/var/tmp/ytte`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/ytte.toml`.
//! This can be overridden using the `YTTE_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use models::{Config, ExtractorConfig, ServerConfig, StagingConfig, TelemetryConfig};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Failed to render configuration: {0}")]
    RenderError(#[from] toml::ser::Error),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or
    /// validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
