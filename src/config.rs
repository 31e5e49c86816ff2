//! Application configuration.
//!
//! The configuration is loaded from a JSON file, by default
//! `$XDG_CONFIG_HOME/hyprslots/config.json`.  Every key is optional and
//! unknown keys are ignored.
//!
//! # Example
//!
//! ```json
//! {
//!   "show-all-outputs": false,
//!   "show-empty-workspaces": true,
//!   "monitor-name-override": "DP-1",
//!   "satellite-prefix": "special",
//!   "bar": {
//!     "namespace": "hyprslots",
//!     "position": "bottom",
//!     "indicator": "•"
//!   }
//! }
//! ```
//!
//! The short key names `all-outputs`, `show-empty`, and `output` are
//! accepted as aliases.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration.  Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Show workspaces owned by other monitors too.
    #[serde(alias = "all-outputs")]
    pub show_all_outputs: bool,
    /// Show workspaces without windows.
    #[serde(alias = "show-empty")]
    pub show_empty_workspaces: bool,
    /// Monitor this instance belongs to, skipping auto-detection.
    #[serde(alias = "output")]
    pub monitor_name_override: Option<String>,
    /// Satellite workspaces are named `<prefix>:N`.
    pub satellite_prefix: String,
    /// Presentation settings of the GTK bar.
    pub bar: BarConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            show_all_outputs: false,
            show_empty_workspaces: false,
            monitor_name_override: None,
            satellite_prefix: "special".into(),
            bar: BarConfig::default(),
        }
    }
}

/// Screen edge the bar is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarPosition {
    #[default]
    Top,
    Bottom,
}

/// Presentation settings of the GTK bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BarConfig {
    /// Layer-shell namespace; also used to find our surface in the
    /// compositor's layer list.
    pub namespace: String,
    pub position: BarPosition,
    /// Glyph marking a slot whose satellite workspace holds windows.
    pub indicator: String,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            namespace: "hyprslots".into(),
            position: BarPosition::Top,
            indicator: "●".into(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full_config() {
        let json = r#"{
            "show-all-outputs": true,
            "show-empty-workspaces": true,
            "monitor-name-override": "DP-2",
            "satellite-prefix": "satellite",
            "bar": {
                "namespace": "bar-left",
                "position": "bottom",
                "indicator": "•"
            }
        }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert!(cfg.show_all_outputs);
        assert!(cfg.show_empty_workspaces);
        assert_eq!(cfg.monitor_name_override.as_deref(), Some("DP-2"));
        assert_eq!(cfg.satellite_prefix, "satellite");
        assert_eq!(cfg.bar.namespace, "bar-left");
        assert_eq!(cfg.bar.position, BarPosition::Bottom);
        assert_eq!(cfg.bar.indicator, "•");
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        assert!(!cfg.show_all_outputs);
        assert!(!cfg.show_empty_workspaces);
        assert_eq!(cfg.monitor_name_override, None);
        assert_eq!(cfg.satellite_prefix, "special");
        let bd = BarConfig::default();
        assert_eq!(cfg.bar.namespace, bd.namespace);
        assert_eq!(cfg.bar.position, BarPosition::Top);
        assert_eq!(cfg.bar.indicator, bd.indicator);
    }

    #[test]
    fn short_aliases_accepted() {
        let json = r#"{ "all-outputs": true, "show-empty": true, "output": "HDMI-A-1" }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert!(cfg.show_all_outputs);
        assert!(cfg.show_empty_workspaces);
        assert_eq!(cfg.monitor_name_override.as_deref(), Some("HDMI-A-1"));
    }

    #[test]
    fn deserialize_partial_bar() {
        let cfg: Config = serde_json::from_str(r#"{ "bar": { "position": "bottom" } }"#).unwrap();
        assert_eq!(cfg.bar.position, BarPosition::Bottom);
        assert_eq!(cfg.bar.namespace, "hyprslots");
    }

    #[test]
    fn unknown_top_level_keys_ignored() {
        let json = r#"{ "show-empty": false, "future_section": { "key": 42 } }"#;
        let _cfg: Config = serde_json::from_str(json).unwrap();
    }

    #[test]
    fn load_reports_missing_file() {
        let path = std::env::temp_dir().join("hyprslots-no-such-config.json");
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
