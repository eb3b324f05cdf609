//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `CREATIVE_UPLOADER_CONFIG`
//! environment variable. A missing file is fine: every field has a default.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `CREATIVE_UPLOADER_` override YAML values
//! 3. **`--bind` flag** - Overrides `bind` if given on the command line
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `CREATIVE_UPLOADER_ARCHIVE__MAX_ENTRIES=50` sets the `archive.max_entries` field.
//!
//! ## Example
//!
//! ```yaml
//! bind: 127.0.0.1:5241
//! max_upload_size: 16777216
//! request_timeout: 10s
//! archive:
//!   max_entries: 200
//!   max_uncompressed_size: 134217728
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ConfigError;

/// Simple CLI args - config file location plus the bind override
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "CREATIVE_UPLOADER_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Bind to this IP:port combination (overrides the config file)
    #[arg(long)]
    pub bind: Option<String>,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Address the HTTP server binds to, as `host:port`
    pub bind: String,
    /// Maximum accepted request body in bytes.
    ///
    /// ZIP parsing needs the whole body before it can read the central directory, so this is
    /// also the upper bound on how much an archive upload can hold in memory.
    pub max_upload_size: usize,
    /// Deadline for handling a single request, including reading the body
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Limits applied to ZIP uploads
    pub archive: ArchiveLimitsConfig,
}

/// Protection against archives that expand far beyond their upload size.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveLimitsConfig {
    /// Maximum number of entries in the central directory
    pub max_entries: usize,
    /// Maximum sum of decompressed entry sizes, in bytes
    pub max_uncompressed_size: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5241".to_string(),
            max_upload_size: 32 * 1024 * 1024, // 32 MB
            request_timeout: Duration::from_secs(10),
            archive: ArchiveLimitsConfig::default(),
        }
    }
}

impl Default for ArchiveLimitsConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            max_uncompressed_size: 256 * 1024 * 1024, // 256 MB
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Some((host, port)) = self.bind.rsplit_once(':') else {
            return Err(ConfigError::Invalid(format!("bind address '{}' must be host:port", self.bind)));
        };

        if host.is_empty() || port.parse::<u16>().is_err() {
            return Err(ConfigError::Invalid(format!("bind address '{}' must be host:port", self.bind)));
        }

        if self.max_upload_size == 0 {
            return Err(ConfigError::Invalid("max_upload_size must be greater than 0".to_string()));
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::Invalid("request_timeout must be greater than 0".to_string()));
        }

        if self.archive.max_entries == 0 {
            return Err(ConfigError::Invalid("archive.max_entries must be greater than 0".to_string()));
        }

        if self.archive.max_uncompressed_size == 0 {
            return Err(ConfigError::Invalid(
                "archive.max_uncompressed_size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        let figment = Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables override specific values; the config path itself is not a field
            .merge(Env::prefixed("CREATIVE_UPLOADER_").ignore(&["CONFIG"]).split("__"));

        match &args.bind {
            Some(bind) => figment.merge(Serialized::default("bind", bind)),
            None => figment,
        }
    }
}
