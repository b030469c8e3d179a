use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::compose::effects::Capability;
use crate::compose::preview::DEFAULT_PREVIEW_EDGE;

pub const APP_DIR: &str = "kekstagram";
pub const CONFIG_FILE: &str = "config.json";
pub const SERVER_URL_ENV: &str = "KEKSTAGRAM_SERVER_URL";
pub const DEFAULT_BASE_URL: &str = "https://29.javascript.htmlacademy.pro/kekstagram";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub composer: ComposerConfig,
    #[serde(default)]
    pub gallery: GalleryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComposerConfig {
    /// Delay between closing the composer and the success panel
    #[serde(default = "default_success_delay_ms")]
    pub success_delay_ms: u64,
    /// Debounce for re-rendering the filtered preview
    #[serde(default = "default_render_debounce_ms")]
    pub render_debounce_ms: u64,
    /// Set to false to run without the intensity slider
    #[serde(default = "default_intensity_slider")]
    pub intensity_slider: bool,
    #[serde(default = "default_preview_max_edge")]
    pub preview_max_edge: u32,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            success_delay_ms: default_success_delay_ms(),
            render_debounce_ms: default_render_debounce_ms(),
            intensity_slider: default_intensity_slider(),
            preview_max_edge: default_preview_max_edge(),
        }
    }
}

impl ComposerConfig {
    pub fn success_delay(&self) -> Duration {
        Duration::from_millis(self.success_delay_ms)
    }

    pub fn render_debounce(&self) -> Duration {
        Duration::from_millis(self.render_debounce_ms)
    }

    pub fn capability(&self) -> Capability {
        if self.intensity_slider {
            Capability::Full
        } else {
            Capability::Degraded
        }
    }
}

fn default_success_delay_ms() -> u64 {
    300
}

fn default_render_debounce_ms() -> u64 {
    40
}

fn default_intensity_slider() -> bool {
    true
}

fn default_preview_max_edge() -> u32 {
    DEFAULT_PREVIEW_EDGE
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GalleryConfig {
    #[serde(default = "default_filter_debounce_ms")]
    pub filter_debounce_ms: u64,
    #[serde(default = "default_random_count")]
    pub random_count: usize,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            filter_debounce_ms: default_filter_debounce_ms(),
            random_count: default_random_count(),
        }
    }
}

impl GalleryConfig {
    pub fn filter_debounce(&self) -> Duration {
        Duration::from_millis(self.filter_debounce_ms)
    }
}

fn default_filter_debounce_ms() -> u64 {
    500
}

fn default_random_count() -> usize {
    10
}

/// `<config_dir>/kekstagram/config.json`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Load the config from the default location, then apply env overrides
pub fn load() -> Result<Config, ConfigError> {
    let mut config = match default_path() {
        Some(path) => load_from(&path)?,
        None => Config::default(),
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Load from a file; a missing file yields defaults
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "config loaded");
    Ok(config)
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(url) = env::var(SERVER_URL_ENV) {
        if !url.trim().is_empty() {
            config.server.base_url = url.trim().to_string();
        }
    }
}
