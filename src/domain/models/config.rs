use serde::{Deserialize, Serialize};

/// Main configuration structure for tipsheet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Local store configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Remote prediction service configuration
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Sync coordinator configuration
    #[serde(default)]
    pub sync: SyncConfig,

    /// Connectivity monitor configuration
    #[serde(default)]
    pub connectivity: ConnectivityConfig,

    /// Push-event transport configuration
    #[serde(default)]
    pub events: EventsConfig,

    /// Reconciliation policy knobs
    #[serde(default)]
    pub reconciliation: ReconciliationPolicy,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            remote: RemoteConfig::default(),
            sync: SyncConfig::default(),
            connectivity: ConnectivityConfig::default(),
            events: EventsConfig::default(),
            reconciliation: ReconciliationPolicy::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Local store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to the `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Connection URL for the configured path.
    pub fn database_url(&self) -> String {
        format!("sqlite://{}", self.path)
    }
}

fn default_database_path() -> String {
    ".tipsheet/tipsheet.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Remote prediction service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RemoteConfig {
    /// Base URL of the remote prediction API
    #[serde(default = "default_remote_base_url")]
    pub base_url: String,

    /// Optional bearer token for the remote API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Token-bucket capacity per minute
    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: u32,
}

fn default_remote_base_url() -> String {
    "http://localhost:8787".to_string()
}

const fn default_request_timeout_secs() -> u64 {
    10
}

const fn default_rate_limit_per_minute() -> u32 {
    60
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_remote_base_url(),
            api_key: None,
            request_timeout_secs: default_request_timeout_secs(),
            rate_limit_per_minute: default_rate_limit_per_minute(),
        }
    }
}

/// Sync coordinator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SyncConfig {
    /// How many records a history pull requests
    #[serde(default = "default_pull_limit")]
    pub pull_limit: u32,
}

const fn default_pull_limit() -> u32 {
    100
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            pull_limit: default_pull_limit(),
        }
    }
}

/// Connectivity monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ConnectivityConfig {
    /// Seconds between health probes
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,

    /// Per-probe timeout in seconds; a slow probe counts as Offline
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

const fn default_probe_interval_secs() -> u64 {
    15
}

const fn default_probe_timeout_secs() -> u64 {
    5
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            probe_interval_secs: default_probe_interval_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
        }
    }
}

/// Push-event transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EventsConfig {
    /// Seconds between event polls while online
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Broadcast channel capacity of the event bus
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

const fn default_poll_interval_secs() -> u64 {
    5
}

const fn default_channel_capacity() -> usize {
    1024
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Reconciliation policy knobs.
///
/// Tuning parameters, not business rules: the mutation semantics are
/// fixed, the thresholds are operator-adjustable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReconciliationPolicy {
    /// Minimum absolute implied-probability delta an odds move must
    /// carry before it adjusts a record
    #[serde(default = "default_min_odds_delta")]
    pub min_odds_delta: f64,

    /// Multiplier applied to matching probabilities when a player goes
    /// from active to out
    #[serde(default = "default_out_penalty")]
    pub out_penalty: f64,

    /// Maximum unresolved records scanned per event
    #[serde(default = "default_scan_limit")]
    pub scan_limit: i64,
}

const fn default_min_odds_delta() -> f64 {
    0.05
}

const fn default_out_penalty() -> f64 {
    0.7
}

const fn default_scan_limit() -> i64 {
    200
}

impl Default for ReconciliationPolicy {
    fn default() -> Self {
        Self {
            min_odds_delta: default_min_odds_delta(),
            out_penalty: default_out_penalty(),
            scan_limit: default_scan_limit(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: pretty or json
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr-only when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}
