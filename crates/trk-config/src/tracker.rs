//! Typed tracker configuration.
//!
//! Every field has a default so an empty config is valid for local
//! development against a backend on 127.0.0.1:5000.
//!
//! Environment overrides (applied after YAML layering):
//! - `TRK_API_BASE_URL` → `api.base_url`
//! - `TRK_PUSH_URL`     → `push.url`

use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::LoadedConfig;

pub const ENV_API_BASE_URL: &str = "TRK_API_BASE_URL";
pub const ENV_PUSH_URL: &str = "TRK_PUSH_URL";

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TRACKING_PATH: &str = "/api/orders/track";
pub const DEFAULT_PUSH_URL: &str = "ws://127.0.0.1:5000/ws";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub api: ApiConfig,
    pub push: PushConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub tracking_path: String,
    /// Per-request timeout for the order fetch. Unset means no timeout.
    pub fetch_timeout_secs: Option<u64>,
}

impl ApiConfig {
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            tracking_path: DEFAULT_TRACKING_PATH.to_string(),
            fetch_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    pub url: String,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_PUSH_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub ansi_colors: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { ansi_colors: true }
    }
}

impl TrackerConfig {
    pub fn from_json(config_json: &Value) -> Result<Self> {
        let cfg: TrackerConfig = serde_json::from_value(config_json.clone())
            .context("config does not match tracker schema")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_loaded(loaded: &LoadedConfig) -> Result<Self> {
        Self::from_json(&loaded.config_json)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    /// Blank values are ignored. Does not validate; later layers may still
    /// replace these values, so call [`Self::validate`] once they are all in.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_API_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.api.base_url = v.trim().to_string();
        }
        if let Some(v) = lookup(ENV_PUSH_URL).filter(|v| !v.trim().is_empty()) {
            self.push.url = v.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<()> {
        let base = self.api.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            bail!("CONFIG_INVALID api.base_url must be http(s): {base}");
        }
        if !self.api.tracking_path.starts_with('/') {
            bail!(
                "CONFIG_INVALID api.tracking_path must start with '/': {}",
                self.api.tracking_path
            );
        }
        let push = self.push.url.trim();
        if !(push.starts_with("ws://") || push.starts_with("wss://")) {
            bail!("CONFIG_INVALID push.url must be ws(s): {push}");
        }
        if self.api.fetch_timeout_secs == Some(0) {
            bail!("CONFIG_INVALID api.fetch_timeout_secs must be > 0 when set");
        }
        Ok(())
    }
}
