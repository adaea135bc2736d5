//! Application configuration management.
//!
//! Configuration is stored at `~/.config/contestboard/config.json`. Every
//! field has a default, so a missing or partial file is fine.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::{DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::pipeline::{is_valid_page_size, PipelineOptions, DEFAULT_PAGE_SIZE, SEARCH_DEBOUNCE_MS};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "contestboard";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable that overrides `api_base_url`
pub const API_URL_ENV: &str = "CONTESTBOARD_API_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub cache_ttl_minutes: u32,
    pub page_size: usize,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            cache_ttl_minutes: 60,
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load from the user config directory, then apply environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_at(&Self::config_path()?)
    }

    /// Load `path`, apply environment overrides and replace out-of-range values.
    pub fn load_at(path: &Path) -> Result<Self> {
        let mut config = Self::load_from(path)?;
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api_base_url = url;
            }
        }
        Ok(config.validated())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Replace out-of-range values with their defaults.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if !is_valid_page_size(self.page_size) {
            warn!(page_size = self.page_size, "page_size must be 5-15, using default");
            self.page_size = defaults.page_size;
        }
        if self.cache_ttl_minutes == 0 {
            warn!("cache_ttl_minutes must be positive, using default");
            self.cache_ttl_minutes = defaults.cache_ttl_minutes;
        }
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = defaults.request_timeout_secs;
        }
        self
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            cache_ttl_ms: i64::from(self.cache_ttl_minutes) * 60 * 1000,
            page_size: self.page_size,
            search_debounce_ms: SEARCH_DEBOUNCE_MS,
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
