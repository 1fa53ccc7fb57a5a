//! Configuration types for cloudscale

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Lower bound for the per-window concurrency limit
pub const MIN_CONCURRENCY: usize = 1;
/// Upper bound for the per-window concurrency limit
pub const MAX_CONCURRENCY: usize = 5;

/// Retry behavior for transform fetches
///
/// The delay before retry `n` (1-indexed) is `base_delay * n` — a
/// linear-multiplied backoff with no jitter. Every non-success response is
/// retried identically; there is no transient/permanent classification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay multiplied by the attempt number (default: 2 seconds)
    #[serde(default = "default_base_delay", with = "duration_millis_serde")]
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay: default_base_delay(),
        }
    }
}

/// Pacing between concurrency windows
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Pause between windows, a guard against remote rate limiting
    /// (default: 600 ms)
    #[serde(default = "default_cooldown", with = "duration_millis_serde")]
    pub cooldown: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            cooldown: default_cooldown(),
        }
    }
}

/// Archive output settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Deflate compression level, low/fast by default (default: 3)
    #[serde(default = "default_compression_level")]
    pub compression_level: i32,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            compression_level: default_compression_level(),
        }
    }
}

/// Remote endpoint bases
///
/// Defaults target the vendor hosts; tests and self-hosted proxies can
/// point both at a local server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base URL of the upload API (default: `https://api.cloudinary.com/v1_1`)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Base URL of the transform delivery host (default: `https://res.cloudinary.com`)
    #[serde(default = "default_delivery_base")]
    pub delivery_base: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            delivery_base: default_delivery_base(),
        }
    }
}

/// Main configuration for [`BatchUpscaler`](crate::BatchUpscaler)
///
/// Loaded once per run and immutable for the run's duration. The required
/// fields are `cloud_name` and `upload_preset`; everything else defaults
/// to the vendor endpoints and pacing constants.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Remote account identifier (required)
    #[serde(default)]
    pub cloud_name: String,

    /// Unsigned upload preset token (required)
    #[serde(default)]
    pub upload_preset: String,

    /// Items processed per window (default: 2, clamped to `[1, 5]` at run start)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Tag attached to every upload for later manual cleanup
    #[serde(default = "default_upload_tag")]
    pub upload_tag: String,

    /// Retry behavior for transform fetches
    #[serde(default)]
    pub retry: RetryConfig,

    /// Pacing between windows
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Archive output settings
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// Remote endpoint bases
    #[serde(default)]
    pub endpoints: EndpointConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            upload_preset: String::new(),
            concurrency: default_concurrency(),
            upload_tag: default_upload_tag(),
            retry: RetryConfig::default(),
            pacing: PacingConfig::default(),
            archive: ArchiveConfig::default(),
            endpoints: EndpointConfig::default(),
        }
    }
}

impl Config {
    /// Create a configuration from the two required credentials,
    /// defaulting everything else
    pub fn new(cloud_name: impl Into<String>, upload_preset: impl Into<String>) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            upload_preset: upload_preset.into(),
            ..Default::default()
        }
    }

    /// Validate the configuration, failing fast before any window starts
    ///
    /// Errors carry the offending key so embedders can point users at the
    /// exact setting to fix.
    pub fn validate(&self) -> Result<()> {
        if self.cloud_name.trim().is_empty() {
            return Err(Error::Config {
                message: "cloud_name must not be empty".to_string(),
                key: Some("cloud_name".to_string()),
            });
        }
        if self.upload_preset.trim().is_empty() {
            return Err(Error::Config {
                message: "upload_preset must not be empty".to_string(),
                key: Some("upload_preset".to_string()),
            });
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::Config {
                message: "retry.max_attempts must be at least 1".to_string(),
                key: Some("retry.max_attempts".to_string()),
            });
        }
        for (key, value) in [
            ("endpoints.api_base", &self.endpoints.api_base),
            ("endpoints.delivery_base", &self.endpoints.delivery_base),
        ] {
            Url::parse(value).map_err(|e| Error::Config {
                message: format!("{key} is not a valid URL: {e}"),
                key: Some(key.to_string()),
            })?;
        }
        Ok(())
    }

    /// Concurrency limit clamped to `[1, 5]`
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.clamp(MIN_CONCURRENCY, MAX_CONCURRENCY)
    }

    /// Load a configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Save the configuration to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}

fn default_concurrency() -> usize {
    2
}

fn default_upload_tag() -> String {
    "cloudscale_temp".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay() -> Duration {
    Duration::from_millis(2000)
}

fn default_cooldown() -> Duration {
    Duration::from_millis(600)
}

fn default_compression_level() -> i32 {
    3
}

fn default_api_base() -> String {
    "https://api.cloudinary.com/v1_1".to_string()
}

fn default_delivery_base() -> String {
    "https://res.cloudinary.com".to_string()
}

// Duration serialization helper (milliseconds)
mod duration_millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
