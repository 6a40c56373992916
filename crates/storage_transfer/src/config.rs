//! Process-wide configuration, read once at startup and passed by reference
//! into every component. Business logic never reads the environment itself.

use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::time::Duration;

use crate::models::error::TransferError;

// Custom deserializer for Duration that accepts integer seconds
fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = u64::deserialize(deserializer)?;
    Ok(Duration::from_secs(secs))
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub source: SourceConfig,
    pub destination: DestinationConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Azure Blob Storage side: one account with live, scheduled and archive
/// containers.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub connection_string: String,
    pub live_container: String,
    pub scheduled_container: String,
    pub archive_container: String,
    /// Restricts sweeps to keys starting with this prefix.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Target file extension, without the leading dot.
    pub file_ext: String,
}

/// Amazon S3 side: a single bucket.
#[derive(Debug, Clone, Deserialize)]
pub struct DestinationConfig {
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint, for S3-compatible stores in development.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub path_style: bool,
    /// Bounded retry count for the destination upload. No retry by default;
    /// platform-level retry is the trigger infrastructure's job.
    #[serde(default)]
    pub upload_retries: u32,
}

fn default_region() -> String {
    "eu-central-1".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Interval between timer-driven sweeps of the scheduled container.
    #[serde(
        default = "default_sweep_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub interval_secs: Duration,
    /// Upper bound applied to each individual storage call.
    #[serde(
        default = "default_request_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub request_timeout_secs: Duration,
}

fn default_true() -> bool {
    true
}

fn default_sweep_interval() -> Duration {
    // Matches the original five-minute schedule.
    Duration::from_secs(300)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(120)
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_sweep_interval(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub api_keys: Vec<String>,
    #[serde(default)]
    pub api_key_file: Option<PathBuf>,
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,
}

fn default_rate_limit() -> u32 {
    60
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_keys: Vec::new(),
            api_key_file: None,
            rate_limit_per_minute: 60,
        }
    }
}

impl Config {
    /// Load configuration from an optional file plus `TRANSFER__`-prefixed
    /// environment variables (e.g. `TRANSFER__SOURCE__FILE_EXT=csv`).
    pub fn load(path: Option<&str>) -> Result<Self, TransferError> {
        let mut builder = config::Config::builder();
        if let Some(config_path) = path {
            builder = builder.add_source(config::File::with_name(config_path));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix("TRANSFER").separator("__"))
            .build()
            .map_err(|e| TransferError::ConfigError(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| TransferError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Absence of a required field is a configuration error, fatal at
    /// startup, never a per-item error.
    pub fn validate(&self) -> Result<(), TransferError> {
        let required = [
            ("source.connection_string", &self.source.connection_string),
            ("source.live_container", &self.source.live_container),
            ("source.scheduled_container", &self.source.scheduled_container),
            ("source.archive_container", &self.source.archive_container),
            ("destination.access_key", &self.destination.access_key),
            ("destination.secret_key", &self.destination.secret_key),
            ("destination.bucket", &self.destination.bucket),
            ("destination.region", &self.destination.region),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(TransferError::ConfigError(format!(
                    "missing required field: {}",
                    field
                )));
            }
        }
        Ok(())
    }
}
