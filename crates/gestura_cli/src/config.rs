//! Gestura configuration file handling

use anyhow::{Context, Result};
use gestura_recognizers::{
    DragConfirmConfig, HoverIntentConfig, LongPressConfig, LongPressRevealConfig, SwipeConfig,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const CONFIG_FILE: &str = "gestura.toml";

/// Top-level Gestura configuration (gestura.toml)
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct GesturaConfig {
    #[serde(default)]
    pub long_press: LongPressConfig,
    #[serde(default)]
    pub swipe: SwipeConfig,
    #[serde(default)]
    pub hover_intent: HoverIntentConfig,
    #[serde(default)]
    pub drag_confirm: DragConfirmConfig,
    #[serde(default)]
    pub reveal: LongPressRevealConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
}

/// Replay settings
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ReplayConfig {
    /// How far past the last step to keep advancing when a script has no
    /// `until`
    #[serde(default = "default_tail")]
    pub tail_ms: u64,
    /// Attach a recording haptic actuator
    #[serde(default = "default_true")]
    pub haptics: bool,
    /// Include per-frame progress callbacks in the timeline
    #[serde(default)]
    pub record_progress: bool,
}

fn default_tail() -> u64 {
    5_000
}

fn default_true() -> bool {
    true
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            tail_ms: default_tail(),
            haptics: true,
            record_progress: false,
        }
    }
}

impl GesturaConfig {
    /// Load configuration from a file, or from gestura.toml in a directory
    pub fn load(path: &Path) -> Result<Self> {
        let config_path = if path.is_dir() {
            path.join(CONFIG_FILE)
        } else {
            path.to_path_buf()
        };

        if !config_path.exists() {
            anyhow::bail!(
                "No {} found at {}. Run `gestura init` to create one.",
                CONFIG_FILE,
                config_path.display()
            );
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        Self::from_toml(&content).with_context(|| format!("Invalid {}", config_path.display()))
    }

    /// Load an explicit path, else ./gestura.toml if present, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let local = PathBuf::from(CONFIG_FILE);
                if local.exists() {
                    Self::load(&local)
                } else {
                    tracing::debug!("no {} found, using defaults", CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: GesturaConfig = toml::from_str(content).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Check every recognizer section
    pub fn validate(&self) -> Result<()> {
        self.long_press.validate().context("[long_press]")?;
        self.swipe.validate().context("[swipe]")?;
        self.hover_intent.validate().context("[hover_intent]")?;
        self.drag_confirm.validate().context("[drag_confirm]")?;
        self.reveal.validate().context("[reveal]")?;
        Ok(())
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gestura_recognizers::SwipeAxis;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = GesturaConfig::from_toml("").unwrap();
        assert_eq!(config, GesturaConfig::default());
        assert_eq!(config.long_press.threshold_ms, 500);
        assert_eq!(config.reveal.auto_dismiss_ms, Some(3000));
    }

    #[test]
    fn test_partial_sections() {
        let config = GesturaConfig::from_toml(
            r#"
            [long_press]
            threshold_ms = 800
            ready_delay_ms = 600

            [swipe]
            axis = "x"

            [drag_confirm.geometry]
            track_width = 320.0
            "#,
        )
        .unwrap();

        assert_eq!(config.long_press.threshold_ms, 800);
        assert_eq!(config.long_press.preview_delay_ms, 200);
        assert_eq!(config.swipe.axis, SwipeAxis::X);
        assert_eq!(config.drag_confirm.geometry.track_width, 320.0);
        assert_eq!(config.drag_confirm.geometry.thumb_size, 48.0);
    }

    #[test]
    fn test_invalid_section_is_reported() {
        let err = GesturaConfig::from_toml("[drag_confirm]\nthreshold = 2.0\n").unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("[drag_confirm]"), "{message}");
        assert!(message.contains("threshold"), "{message}");
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = GesturaConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(GesturaConfig::from_toml(&text).unwrap(), config);
    }
}
