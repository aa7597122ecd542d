// User configuration loaded from ~/.config/rateplay/config.toml.
// Falls back to sensible defaults when the file is missing.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::rate::RateSettings;
use crate::theme::THEME_DARK;

/// Application configuration, deserialized from `~/.config/rateplay/config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    /// Rate selector options; see [`RateSettings`] for the fallbacks.
    #[serde(default)]
    pub playback_rate: RateSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Target TUI refresh rate in frames per second (default: 30).
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,
    /// Seconds without input before the control bar hides (0 = never).
    #[serde(default = "default_controls_timeout")]
    pub controls_timeout_secs: u64,
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_frame_rate() -> f64 {
    30.0
}

fn default_controls_timeout() -> u64 {
    5
}

fn default_theme() -> String {
    THEME_DARK.to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            controls_timeout_secs: default_controls_timeout(),
            theme: default_theme(),
        }
    }
}

impl GeneralConfig {
    /// `frame_rate`, or the default when it is zero, negative or not finite.
    /// Both the tick timer and the idle timeout run off this value.
    pub fn tick_rate(&self) -> f64 {
        if self.frame_rate.is_finite() && self.frame_rate > 0.0 {
            self.frame_rate
        } else {
            default_frame_rate()
        }
    }
}

impl Config {
    /// Read config from disk, or return defaults if the file doesn't exist.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rateplay")
            .join("config.toml")
    }
}
