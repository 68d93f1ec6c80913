//! Configuration file management for xyscope.
//!
//! This module handles loading the application configuration from a TOML file
//! in the user's config directory. Every key has a default, so a partial file
//! (or an empty one) is valid.

use crate::playback::Decay;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Canvas marker used to plot the trail.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// 2x4 dots per cell, highest resolution
    #[default]
    Braille,
    Dot,
    Block,
    HalfBlock,
}

impl std::fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Braille => write!(f, "braille"),
            Self::Dot => write!(f, "dot"),
            Self::Block => write!(f, "block"),
            Self::HalfBlock => write!(f, "half_block"),
        }
    }
}

/// Playback timing and trail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Length of the visible trail in milliseconds
    #[serde(default = "default_window_ms")]
    pub window_ms: u32,
    /// Trail fade curve: "linear", "quadratic" or "constant"
    #[serde(default)]
    pub decay: Decay,
    /// Target redraw rate; also the input poll interval
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Open the file paused at the first frame
    #[serde(default)]
    pub start_paused: bool,
    /// Start with the right channel on the X axis
    #[serde(default)]
    pub invert_axes: bool,
}

fn default_window_ms() -> u32 {
    50
}

fn default_fps() -> u32 {
    60
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            decay: Decay::default(),
            fps: default_fps(),
            start_paused: false,
            invert_axes: false,
        }
    }
}

/// Scope appearance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Amplitude multiplier applied before plotting
    #[serde(default = "default_gain")]
    pub gain: f32,
    /// Trail colour as [r, g, b] at full opacity
    #[serde(default = "default_color")]
    pub color: [u8; 3],
    #[serde(default)]
    pub marker: MarkerKind,
    /// Show the status line under the scope
    #[serde(default = "default_true")]
    pub show_footer: bool,
}

fn default_gain() -> f32 {
    2.0
}

fn default_color() -> [u8; 3] {
    [0, 255, 51]
}

fn default_true() -> bool {
    true
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            gain: default_gain(),
            color: default_color(),
            marker: MarkerKind::default(),
            show_footer: true,
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XyscopeConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl XyscopeConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the config file exists but cannot be read
    /// - If the TOML is malformed or a value is out of range
    pub fn load() -> anyhow::Result<Self> {
        let config_path = config_path()?;
        if !config_path.exists() {
            tracing::debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        let config_content = fs::read_to_string(&config_path)
            .map_err(|e| anyhow!("Failed to read {}: {e}", config_path.display()))?;
        Self::from_toml_str(&config_content)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    /// - If the TOML is malformed
    /// - If `window_ms`, `fps` or `gain` is not positive
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: XyscopeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.playback.window_ms == 0 {
            return Err(anyhow!("playback.window_ms must be greater than 0"));
        }
        if self.playback.fps == 0 {
            return Err(anyhow!("playback.fps must be greater than 0"));
        }
        if !(self.display.gain.is_finite() && self.display.gain > 0.0) {
            return Err(anyhow!("display.gain must be a positive number"));
        }
        Ok(())
    }
}

/// Retrieves the path to the config file, creating its directory if needed.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn config_path() -> anyhow::Result<PathBuf> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("xyscope");

    fs::create_dir_all(&config_dir)
        .map_err(|e| anyhow!("Failed to create config directory: {e}"))?;

    Ok(config_dir.join("xyscope.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = XyscopeConfig::from_toml_str("").unwrap();
        assert_eq!(config.playback.window_ms, 50);
        assert_eq!(config.playback.decay, Decay::Quadratic);
        assert_eq!(config.playback.fps, 60);
        assert_eq!(config.display.gain, 2.0);
        assert_eq!(config.display.color, [0, 255, 51]);
        assert_eq!(config.display.marker, MarkerKind::Braille);
        assert!(config.display.show_footer);
    }

    #[test]
    fn test_partial_config() {
        let config = XyscopeConfig::from_toml_str(
            r#"
config_version = "0.1.0"

[playback]
decay = "linear"
invert_axes = true

[display]
marker = "half_block"
"#,
        )
        .unwrap();
        assert_eq!(config.playback.decay, Decay::Linear);
        assert!(config.playback.invert_axes);
        assert_eq!(config.playback.window_ms, 50);
        assert_eq!(config.display.marker, MarkerKind::HalfBlock);
    }

    #[test]
    fn test_default_template_parses() {
        let config = XyscopeConfig::from_toml_str(crate::setup::DEFAULT_CONFIG).unwrap();
        assert_eq!(config.playback.window_ms, 50);
        assert_eq!(config.playback.decay, Decay::Quadratic);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(XyscopeConfig::from_toml_str("[playback]\nwindow_ms = 0").is_err());
        assert!(XyscopeConfig::from_toml_str("[playback]\nfps = 0").is_err());
        assert!(XyscopeConfig::from_toml_str("[display]\ngain = -1.0").is_err());
        assert!(XyscopeConfig::from_toml_str("[playback]\ndecay = \"cubic\"").is_err());
    }
}
