use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid remote base_url: {0}. Must start with http:// or https://")]
    InvalidRemoteUrl(String),

    #[error("Invalid request_timeout_secs: {0}. Must be at least 1")]
    InvalidRequestTimeout(u64),

    #[error("Invalid rate_limit_per_minute: {0}. Must be at least 1")]
    InvalidRateLimit(u32),

    #[error("Invalid pull_limit: {0}. Must be at least 1")]
    InvalidPullLimit(u32),

    #[error("Invalid probe_interval_secs: {0}. Must be at least 1")]
    InvalidProbeInterval(u64),

    #[error("Invalid probe_timeout_secs: {0}. Must be at least 1")]
    InvalidProbeTimeout(u64),

    #[error("Invalid poll_interval_secs: {0}. Must be at least 1")]
    InvalidPollInterval(u64),

    #[error("Invalid channel_capacity: {0}. Must be at least 1")]
    InvalidChannelCapacity(usize),

    #[error("Invalid min_odds_delta: {0}. Must be within [0, 1]")]
    InvalidOddsDelta(f64),

    #[error("Invalid out_penalty: {0}. Must be within [0, 1]")]
    InvalidOutPenalty(f64),

    #[error("Invalid scan_limit: {0}. Must be at least 1")]
    InvalidScanLimit(i64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .tipsheet/config.yaml (project config, created by init)
    /// 3. .tipsheet/local.yaml (project local overrides, optional)
    /// 4. Environment variables (TIPSHEET_* prefix, highest priority)
    ///
    /// Note: Configuration is always project-local (pwd/.tipsheet/)
    /// so one machine can track several prediction books.
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            // 1. Start with programmatic defaults
            .merge(Serialized::defaults(Config::default()))
            // 2. Merge project config (primary config, created by init)
            .merge(Yaml::file(".tipsheet/config.yaml"))
            // 3. Merge project local overrides (optional, for dev/test overrides)
            .merge(Yaml::file(".tipsheet/local.yaml"))
            // 4. Merge environment variables (highest priority)
            .merge(Env::prefixed("TIPSHEET_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("TIPSHEET_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        // Validate database config
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        // Validate remote config
        let url = &config.remote.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::InvalidRemoteUrl(url.clone()));
        }

        if config.remote.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidRequestTimeout(
                config.remote.request_timeout_secs,
            ));
        }

        if config.remote.rate_limit_per_minute == 0 {
            return Err(ConfigError::InvalidRateLimit(
                config.remote.rate_limit_per_minute,
            ));
        }

        // Validate sync config
        if config.sync.pull_limit == 0 {
            return Err(ConfigError::InvalidPullLimit(config.sync.pull_limit));
        }

        // Validate connectivity config
        if config.connectivity.probe_interval_secs == 0 {
            return Err(ConfigError::InvalidProbeInterval(
                config.connectivity.probe_interval_secs,
            ));
        }

        if config.connectivity.probe_timeout_secs == 0 {
            return Err(ConfigError::InvalidProbeTimeout(
                config.connectivity.probe_timeout_secs,
            ));
        }

        // Validate event transport config
        if config.events.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidPollInterval(
                config.events.poll_interval_secs,
            ));
        }

        if config.events.channel_capacity == 0 {
            return Err(ConfigError::InvalidChannelCapacity(
                config.events.channel_capacity,
            ));
        }

        // Validate reconciliation policy
        let delta = config.reconciliation.min_odds_delta;
        if !delta.is_finite() || !(0.0..=1.0).contains(&delta) {
            return Err(ConfigError::InvalidOddsDelta(delta));
        }

        let penalty = config.reconciliation.out_penalty;
        if !penalty.is_finite() || !(0.0..=1.0).contains(&penalty) {
            return Err(ConfigError::InvalidOutPenalty(penalty));
        }

        if config.reconciliation.scan_limit < 1 {
            return Err(ConfigError::InvalidScanLimit(config.reconciliation.scan_limit));
        }

        // Validate logging config
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}
