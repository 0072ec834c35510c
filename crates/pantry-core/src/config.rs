//! Runtime configuration with serde defaults and TOML file loading.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::defaults;
use crate::errors::{PantryError, PantryResult};

/// Top-level configuration for the sync engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PantryConfig {
    /// Backend base URL, without a trailing slash.
    pub base_url: String,
    pub monitor: MonitorConfig,
    /// Timeout for user-facing mutation calls.
    pub request_timeout_secs: u64,
}

/// Connectivity monitor tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between reachability probes while device connectivity holds.
    pub probe_interval_secs: u64,
    /// Per-probe timeout, independent of the user-facing request timeout.
    pub probe_timeout_secs: u64,
}

impl Default for PantryConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::BASE_URL.to_string(),
            monitor: MonitorConfig::default(),
            request_timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            probe_interval_secs: defaults::PROBE_INTERVAL_SECS,
            probe_timeout_secs: defaults::PROBE_TIMEOUT_SECS,
        }
    }
}

impl PantryConfig {
    /// Load from a TOML file. Missing fields fall back to defaults.
    pub fn from_file(path: &Path) -> PantryResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| PantryError::Config {
            reason: format!("read {}: {e}", path.display()),
        })?;
        toml::from_str(&raw).map_err(|e| PantryError::Config {
            reason: format!("parse {}: {e}", path.display()),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl MonitorConfig {
    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}
