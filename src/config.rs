use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::constants::{
    DEFAULT_INITIAL_BITRATE_ESTIMATE, DEFAULT_SEEK_BAR_MAX, DEFAULT_SHOW_TIMEOUT_MS,
    DEFAULT_USER_AGENT, IDLE_POLL_INTERVAL_MS,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub overlay: OverlayConfig,

    #[serde(default)]
    pub resume: ResumeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_true")]
    pub play_when_ready: bool,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Bits per second assumed before the first bandwidth sample arrives.
    #[serde(default = "default_bitrate_estimate")]
    pub initial_bitrate_estimate: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_video_bitrate: Option<u64>,

    #[serde(default = "default_true")]
    pub prefer_adaptive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// 0 disables auto-hide.
    #[serde(default = "default_show_timeout")]
    pub show_timeout_ms: u64,

    #[serde(default = "default_seek_bar_max")]
    pub seek_bar_max: u32,

    #[serde(default = "default_idle_poll")]
    pub idle_poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            info!("No config file found, using defaults");
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", path);
        let contents = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;
        info!("Config loaded successfully");
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents).context("Failed to write config file")?;

        debug!("Config saved to {:?}", path);
        Ok(())
    }

    /// Where resume offsets are persisted, falling back to the data directory.
    pub fn resume_store_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.resume.store_path {
            return Ok(path.clone());
        }
        let data_dir = dirs::data_dir().context("Failed to get data directory")?;
        Ok(data_dir.join("slotplay").join("resume.json"))
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to get config directory")?;
        Ok(config_dir.join("slotplay").join("config.toml"))
    }
}

impl OverlayConfig {
    pub fn show_timeout(&self) -> Duration {
        Duration::from_millis(self.show_timeout_ms)
    }

    pub fn idle_poll_interval(&self) -> Duration {
        Duration::from_millis(self.idle_poll_interval_ms)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            play_when_ready: default_true(),
            user_agent: default_user_agent(),
            initial_bitrate_estimate: default_bitrate_estimate(),
            max_video_bitrate: None,
            prefer_adaptive: default_true(),
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            show_timeout_ms: default_show_timeout(),
            seek_bar_max: default_seek_bar_max(),
            idle_poll_interval_ms: default_idle_poll(),
        }
    }
}

impl Default for ResumeConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            store_path: None,
        }
    }
}

// Default value functions
fn default_true() -> bool {
    true
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_bitrate_estimate() -> u64 {
    DEFAULT_INITIAL_BITRATE_ESTIMATE
}
fn default_show_timeout() -> u64 {
    DEFAULT_SHOW_TIMEOUT_MS
}
fn default_seek_bar_max() -> u32 {
    DEFAULT_SEEK_BAR_MAX
}
fn default_idle_poll() -> u64 {
    IDLE_POLL_INTERVAL_MS
}
