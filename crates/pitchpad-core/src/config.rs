//! Editor configuration.
//!
//! ## Learning: Serde for Serialization
//!
//! Serde is Rust's standard for serialization/deserialization.
//! The `#[derive(Serialize, Deserialize)]` macro generates
//! code to convert structs to/from JSON, TOML, etc.
//!
//! `#[serde(default)]` uses Default::default() for missing fields,
//! making configs backward-compatible.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main editor configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Editing behavior settings
    pub editor: EditorConfig,

    /// Token substitution settings
    pub substitutions: SubstitutionConfig,

    /// Overlay rendering metrics
    pub render: RenderConfig,

    /// Keyboard settings
    pub keyboard: KeyboardConfig,
}

impl Config {
    /// Loads config from the default location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from_default_path().unwrap_or_default()
    }

    /// Loads config from a file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads from the default config path.
    fn load_from_default_path() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default config file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("pitchpad").join("config.toml"))
    }

    /// Saves the config to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::default_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}

/// Editing behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum history snapshots to retain
    pub history_limit: usize,

    /// Quiet period within which rapid edits collapse into one history
    /// entry, in milliseconds
    pub history_quiet_ms: u64,

    /// Auto-select a placeholder token when the caret lands inside it
    pub select_placeholder_on_click: bool,
}

impl EditorConfig {
    /// The quiet period as a `Duration`.
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.history_quiet_ms)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: 50,
            history_quiet_ms: 300,
            select_placeholder_on_click: true,
        }
    }
}

/// Token substitution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubstitutionConfig {
    /// Token replaced with the formatted hourly rate
    pub rate_token: String,

    /// Token replaced with the fee earner's role
    pub role_token: String,

    /// Currency symbol prefixed to formatted amounts
    pub currency_symbol: String,
}

impl Default for SubstitutionConfig {
    fn default() -> Self {
        Self {
            rate_token: "[RATE]".to_string(),
            role_token: "[ROLE]".to_string(),
            currency_symbol: "£".to_string(),
        }
    }
}

/// Overlay rendering metrics.
///
/// The overlay must reproduce the live input's font metrics exactly to
/// sit pixel-for-pixel beneath it; these values travel to the renderer as
/// an explicit value object instead of being measured off an element.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Font family
    pub font_family: String,

    /// Font size in pixels
    pub font_size: f32,

    /// Line height multiplier
    pub line_height: f32,

    /// Horizontal padding in pixels
    pub padding_x: f32,

    /// Vertical padding in pixels
    pub padding_y: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_family: "Segoe UI".to_string(),
            font_size: 14.0,
            line_height: 1.6,
            padding_x: 16.0,
            padding_y: 16.0,
        }
    }
}

/// Keyboard configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KeyboardConfig {
    /// Custom key bindings, e.g. `"ctrl+k" = "editor.clearAll"`
    pub bindings: HashMap<String, String>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.editor.history_limit, 50);
        assert_eq!(config.editor.history_quiet_ms, 300);
        assert_eq!(config.substitutions.rate_token, "[RATE]");
        assert_eq!(config.substitutions.currency_symbol, "£");
        assert_eq!(config.render.font_family, "Segoe UI");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.editor.history_limit, config.editor.history_limit);
        assert_eq!(
            parsed.substitutions.role_token,
            config.substitutions.role_token
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [editor]
            history_limit = 10
            "#,
        )
        .unwrap();
        assert_eq!(parsed.editor.history_limit, 10);
        assert_eq!(parsed.editor.history_quiet_ms, 300);
        assert_eq!(parsed.substitutions.rate_token, "[RATE]");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            [substitutions]
            currency_symbol = "$"
            "#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.substitutions.currency_symbol, "$");

        let missing = Config::load_from(dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
