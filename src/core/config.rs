//! Client configuration for talking to the poster rendering service
//!
//! Defaults match a locally running service. A configuration can be loaded
//! from JSON, overridden from the environment, or assembled with the `with_*`
//! builder methods.

use crate::core::constants::SNAP_TOLERANCE;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding [`ClientConfig::base_url`].
pub const ENV_SERVICE_URL: &str = "MAPLABEL_SERVICE_URL";
/// Environment variable overriding [`ClientConfig::request_timeout_ms`].
pub const ENV_TIMEOUT_MS: &str = "MAPLABEL_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Scheme, host and port of the rendering service
    pub base_url: String,
    pub generate_path: String,
    pub apply_path: String,
    /// Poster rendering at print DPI is slow, so the default is generous
    pub request_timeout_ms: u64,
    pub user_agent: String,
    /// Snap-back tolerance in geographic units
    pub snap_tolerance: f64,
    /// Suggested file name for downloaded posters
    pub download_filename: String,
    /// Query parameter carrying the cache-busting timestamp
    pub cache_bust_param: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5001".to_string(),
            generate_path: "/api/generate".to_string(),
            apply_path: "/api/labels/apply".to_string(),
            request_timeout_ms: 120_000,
            user_agent: concat!("maplabel/", env!("CARGO_PKG_VERSION")).to_string(),
            snap_tolerance: SNAP_TOLERANCE,
            download_filename: "route-map.png".to_string(),
            cache_bust_param: "t".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_snap_tolerance(mut self, tolerance: f64) -> Self {
        self.snap_tolerance = tolerance;
        self
    }

    pub fn with_download_filename(mut self, filename: impl Into<String>) -> Self {
        self.download_filename = filename.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Absolute URL for a service path such as `/api/generate` or a `mapUrl`.
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    pub fn generate_url(&self) -> String {
        self.endpoint(&self.generate_path)
    }

    pub fn apply_url(&self) -> String {
        self.endpoint(&self.apply_path)
    }

    /// Parses a JSON configuration; missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?;
        log::info!("loaded client config from {}", path.display());
        Ok(config)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self> {
        Self::default().apply_env(|key| std::env::var(key).ok())
    }

    /// Applies overrides from a variable lookup; split out so tests need not touch the process environment.
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = lookup(ENV_SERVICE_URL) {
            self.base_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            self.request_timeout_ms = raw
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("{ENV_TIMEOUT_MS} must be an integer, got {raw:?}")))?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::Config("base_url must not be empty".to_string()));
        }
        if self.request_timeout_ms == 0 {
            return Err(Error::Config("request_timeout_ms must be positive".to_string()));
        }
        if !(self.snap_tolerance.is_finite() && self.snap_tolerance > 0.0) {
            return Err(Error::Config("snap_tolerance must be a positive number".to_string()));
        }
        Ok(())
    }
}
