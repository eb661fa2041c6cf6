//! # Configuration Persistence
//!
//! User configuration stored in `<config_dir>/shellpane/config.json`.
//!
//! Every field is optional in the file; missing fields take the values of
//! [`PaneConfig::default`]. Unknown fields are rejected so that typos do not
//! silently fall back to defaults.
//!
//! ```json
//! {
//!   "theme": "Nord",
//!   "max_output_lines": 5000,
//!   "prompt_patterns": [
//!     { "name": "fish", "pattern": "^(\\S+@\\S+ \\S+>)\\s*$" }
//!   ]
//! }
//! ```
//!
//! The `directories` crate resolves the platform-appropriate config
//! directory.

use crate::shell::{PaneConfig, PromptPattern};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Persisted user configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// Built-in theme name.
    pub theme: String,
    pub max_output_lines: usize,
    pub max_history: usize,
    pub double_click_ms: u64,
    pub wheel_delta: usize,
    pub default_prompt: String,
    /// Tried in order; the first match wins.
    pub prompt_patterns: Vec<PromptPattern>,
    pub initial_input_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        let pane = PaneConfig::default();
        Self {
            theme: "Catppuccin Mocha".to_string(),
            max_output_lines: pane.max_output_lines,
            max_history: pane.max_history,
            double_click_ms: pane.double_click.as_millis() as u64,
            wheel_delta: pane.wheel_delta,
            default_prompt: pane.default_prompt,
            prompt_patterns: pane.prompt_patterns,
            initial_input_width: pane.initial_input_width,
        }
    }
}

impl Config {
    /// Load configuration from disk. Returns `Config::default()` if the file
    /// does not exist or cannot be parsed.
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(error = %err, "using default configuration");
                Self::default()
            }
        }
    }

    fn try_load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path. Returns `Config::default()` if
    /// the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Construction settings for a pane.
    pub fn pane_config(&self) -> PaneConfig {
        PaneConfig {
            max_output_lines: self.max_output_lines,
            max_history: self.max_history,
            double_click: Duration::from_millis(self.double_click_ms),
            wheel_delta: self.wheel_delta,
            default_prompt: self.default_prompt.clone(),
            prompt_patterns: self.prompt_patterns.clone(),
            initial_input_width: self.initial_input_width,
            ..PaneConfig::default()
        }
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "shellpane")
            .context("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.json"))
    }
}
