//! Configuration file management
//!
//! This module handles loading and saving the application configuration
//! file: the selected activation condition, hotkey combination, confinement
//! mode and mute flag. Validation happens here, at the configuration
//! boundary; a malformed condition never reaches the engine.

use crate::engine::condition::ActivationCondition;
use crate::engine::ConfineMode;
use crate::utils::keycode;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_mode() -> String {
    "none".to_string()
}

fn default_confine_mode() -> String {
    "clip".to_string()
}

/// Application configuration stored in config.toml
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Activation mode: "none", "hotkey", "process" or "window-title"
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Hotkey combination, e.g. "alt+F8" (required for mode = "hotkey")
    #[serde(default)]
    pub hotkey: Option<String>,
    /// Process image name, e.g. "Game.exe" (required for mode = "process")
    #[serde(default)]
    pub process_name: Option<String>,
    /// Exact foreground window title (required for mode = "window-title")
    #[serde(default)]
    pub window_title: Option<String>,
    /// Confinement mode: "clip" (rectangle) or "recenter" (point)
    #[serde(default = "default_confine_mode")]
    pub confine_mode: String,
    /// Suppress notification tones
    #[serde(default)]
    pub muted: bool,
    /// Use the polled hotkey fallback instead of OS registration
    #[serde(default)]
    pub poll_hotkey: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            hotkey: None,
            process_name: None,
            window_title: None,
            confine_mode: default_confine_mode(),
            muted: false,
            poll_hotkey: false,
        }
    }
}

impl Config {
    /// Get the standard config file path
    ///
    /// - Windows: `%APPDATA%\cursorlock\config.toml`
    /// - Linux: `~/.config/cursorlock/config.toml`
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .expect("Failed to determine config directory")
            .join("cursorlock")
            .join("config.toml")
    }

    /// Load config from the standard location
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_path())
    }

    /// Load config from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file doesn't exist, can't be read, fails to
    /// parse, or contains an invalid condition selection.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Configuration file not found at: {}\n\nRun 'cursorlock --setup' to create it.",
                path.display()
            );
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        // Reject invalid selections at load time rather than at engine start
        config
            .activation_condition()
            .context("Invalid condition selection in config file")?;
        config
            .parsed_confine_mode()
            .context("Invalid confine_mode in config file")?;

        Ok(config)
    }

    /// Save config to the standard location, creating the directory if
    /// needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        log::info!("Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Build the validated activation condition this config selects.
    pub fn activation_condition(&self) -> Result<ActivationCondition> {
        match self.mode.as_str() {
            "none" => Ok(ActivationCondition::None),
            "hotkey" => {
                let spec = self
                    .hotkey
                    .as_deref()
                    .ok_or_else(|| anyhow!("mode = \"hotkey\" requires a 'hotkey' value"))?;
                Ok(ActivationCondition::Hotkey(keycode::parse_hotkey(spec)?))
            }
            "process" => {
                let name = self
                    .process_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| {
                        anyhow!("mode = \"process\" requires a non-empty 'process_name'")
                    })?;
                Ok(ActivationCondition::ProcessPresence {
                    image_name: name.to_string(),
                })
            }
            "window-title" => {
                let title = self
                    .window_title
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| {
                        anyhow!("mode = \"window-title\" requires a non-empty 'window_title'")
                    })?;
                Ok(ActivationCondition::WindowTitle {
                    title: title.to_string(),
                })
            }
            other => Err(anyhow!(
                "Unknown mode: '{}' (expected none, hotkey, process or window-title)",
                other
            )),
        }
    }

    /// Parse the configured confinement mode.
    pub fn parsed_confine_mode(&self) -> Result<ConfineMode> {
        match self.confine_mode.as_str() {
            "clip" => Ok(ConfineMode::Clip),
            "recenter" => Ok(ConfineMode::Recenter),
            other => Err(anyhow!(
                "Unknown confine_mode: '{}' (expected clip or recenter)",
                other
            )),
        }
    }
}
