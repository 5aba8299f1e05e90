//! Client and reconciliation settings.
//!
//! Both structs deserialize with defaults for every field, and can be read
//! from `GYM_SYNC_*` environment variables.

use std::fmt;
use std::time::Duration;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_COLLECTION: &str = "business-units";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where the remote collection lives and how requests are sent.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub collection: String,
    /// Per-request timeout enforced by the transport.
    #[serde(deserialize_with = "positive")]
    pub timeout_secs: u64,
    pub bearer_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            bearer_token: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("collection", &self.collection)
            .field("timeout_secs", &self.timeout_secs)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Read `GYM_SYNC_BASE_URL`, `GYM_SYNC_COLLECTION`,
    /// `GYM_SYNC_TIMEOUT_SECS` and `GYM_SYNC_TOKEN`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(base_url) = lookup("GYM_SYNC_BASE_URL") {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err(ConfigError::Invalid {
                    key: "GYM_SYNC_BASE_URL",
                    value: base_url,
                    reason: "expected an http:// or https:// URL".to_string(),
                });
            }
            config.base_url = base_url;
        }
        if let Some(collection) = lookup("GYM_SYNC_COLLECTION") {
            config.collection = collection;
        }
        if let Some(raw) = lookup("GYM_SYNC_TIMEOUT_SECS") {
            config.timeout_secs = parse_positive("GYM_SYNC_TIMEOUT_SECS", &raw)?;
        }
        config.bearer_token = lookup("GYM_SYNC_TOKEN").filter(|t| !t.is_empty());
        Ok(config)
    }
}

/// Knobs for a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Maximum per-record requests in flight. `1` processes records strictly
    /// one after another.
    #[serde(deserialize_with = "positive")]
    pub concurrency: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

impl SyncConfig {
    /// Read `GYM_SYNC_CONCURRENCY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = lookup("GYM_SYNC_CONCURRENCY") {
            config.concurrency = parse_positive("GYM_SYNC_CONCURRENCY", &raw)? as usize;
        }
        Ok(config)
    }
}

/// Serde counterpart of `parse_positive`.
fn positive<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default + PartialEq,
{
    let value = T::deserialize(deserializer)?;
    if value == T::default() {
        return Err(D::Error::custom("must be greater than zero"));
    }
    Ok(value)
}

fn parse_positive(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
            reason: e.to_string(),
        }),
    }
}
