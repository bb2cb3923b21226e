//! Runtime configuration.
//!
//! Defaults first, then an optional YAML file, then `ARTISHINE_*`
//! environment variables on top.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::core::DEFAULT_NEAR_THRESHOLD_KM;
use crate::error::{DiscoveryError, Result};

pub const ENV_API_URL: &str = "ARTISHINE_API_URL";
pub const ENV_LOCATION_URL: &str = "ARTISHINE_LOCATION_URL";
pub const ENV_NEAR_KM: &str = "ARTISHINE_NEAR_KM";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "ARTISHINE_HTTP_TIMEOUT_SECS";
pub const ENV_DB: &str = "ARTISHINE_DB";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Marketplace REST API base URL
    pub api_base_url: String,

    /// IP-geolocation service base URL
    pub location_base_url: String,

    /// Distances up to this many km are labelled near
    pub near_threshold_km: f64,

    /// Timeout applied to every outgoing HTTP request
    pub http_timeout_secs: u64,

    /// Session database path
    pub db_path: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.artishine.in".to_string(),
            location_base_url: "https://ipapi.co".to_string(),
            near_threshold_km: DEFAULT_NEAR_THRESHOLD_KM,
            http_timeout_secs: 10,
            db_path: "artishine.db".to_string(),
        }
    }
}

impl DiscoveryConfig {
    /// Read a YAML file; missing keys keep their defaults
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with the process environment
    pub fn from_env() -> Result<Self> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `ARTISHINE_*` overrides from `lookup`
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(url) = lookup(ENV_LOCATION_URL) {
            self.location_base_url = url;
        }
        if let Some(raw) = lookup(ENV_NEAR_KM) {
            self.near_threshold_km = raw
                .trim()
                .parse()
                .map_err(|_| DiscoveryError::Config(format!("{} is not a number: {}", ENV_NEAR_KM, raw)))?;
        }
        if let Some(raw) = lookup(ENV_HTTP_TIMEOUT_SECS) {
            self.http_timeout_secs = raw.trim().parse().map_err(|_| {
                DiscoveryError::Config(format!("{} is not a whole number: {}", ENV_HTTP_TIMEOUT_SECS, raw))
            })?;
        }
        if let Some(path) = lookup(ENV_DB) {
            self.db_path = path;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.near_threshold_km.is_finite() || self.near_threshold_km < 0.0 {
            return Err(DiscoveryError::Config(format!(
                "near_threshold_km must be >= 0, got {}",
                self.near_threshold_km
            )));
        }
        if self.http_timeout_secs == 0 {
            return Err(DiscoveryError::Config("http_timeout_secs must be > 0".to_string()));
        }
        for (name, url) in [
            ("api_base_url", &self.api_base_url),
            ("location_base_url", &self.location_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(DiscoveryError::Config(format!("{} must be an http(s) URL: {}", name, url)));
            }
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
