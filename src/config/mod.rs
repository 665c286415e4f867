//! Configuration management.
//!
//! Configuration is read from `~/.config/confluence/config.toml` at startup.
//! A missing file means defaults; missing fields fall back per-field.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::app::{ConfluenceError, Result};

const DEFAULT_API_BASE_URL: &str = "https://oauth.reddit.com/";

/// Main configuration struct.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the content source. Must end with a trailing slash.
    pub api_base_url: String,
    pub user_agent: String,
    /// Whole-request timeout on the shared HTTP client, in seconds.
    pub request_timeout_secs: u64,
    /// Bound on one feed's fetch inside an aggregate, in seconds. A feed
    /// exceeding it is dropped from that aggregate call.
    pub feed_timeout_secs: u64,
    /// Cap on concurrently in-flight feed fetches during fan-out.
    pub fetch_workers: usize,
    /// How many newest items the thumbnail resolver scans.
    pub thumbnail_scan_depth: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            user_agent: concat!("confluence/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 10,
            feed_timeout_secs: 10,
            fetch_workers: 10,
            thumbnail_scan_depth: 5,
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// A missing file yields defaults; an existing but invalid file is an
    /// error.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfluenceError::Config(format!("{}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| ConfluenceError::Config(format!("{}: {e}", path.display())))
    }

    /// `~/.config/confluence/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfluenceError::Config("no config directory".into()))?;
        Ok(config_dir.join("confluence").join("config.toml"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs)
    }
}
