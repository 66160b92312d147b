use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub focus: FocusRules,
    pub colors: ColorRules,
    /// Projects file used when none is given on the command line.
    pub settings_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            focus: FocusRules::default(),
            colors: ColorRules::default(),
            settings_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusRules {
    /// Uri prefix reserved for focus documents
    pub scheme: String,
    pub marker_text: String,
    pub marker_color: String,
}

impl Default for FocusRules {
    fn default() -> Self {
        Self {
            scheme: "focus:".to_string(),
            marker_text: ">>>>>>>focus mode<<<<<<<".to_string(),
            marker_color: "#888888".to_string(),
        }
    }
}

/// Fixed HSL components for new filter colors. Only the hue is random.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorRules {
    pub saturation: u8,
    pub lightness: u8,
}

impl Default for ColorRules {
    fn default() -> Self {
        Self {
            saturation: 40,
            lightness: 40,
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    if let Some(path) = path {
        load_config_from_path(path)
    } else {
        Ok(default_config().clone())
    }
}

pub fn load_config_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    toml::from_str::<AppConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path_display,
        source,
    })
}

pub fn default_config() -> &'static AppConfig {
    static DEFAULT_CONFIG: LazyLock<AppConfig> = LazyLock::new(AppConfig::default);
    &DEFAULT_CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_values() {
        let config = default_config();
        assert_eq!(config.focus.scheme, "focus:");
        assert_eq!(config.focus.marker_text, ">>>>>>>focus mode<<<<<<<");
        assert_eq!(config.focus.marker_color, "#888888");
        assert_eq!(config.colors.saturation, 40);
        assert_eq!(config.colors.lightness, 40);
        assert!(config.settings_path.is_none());
    }

    #[test]
    fn test_load_config_without_path_is_default() {
        assert_eq!(load_config(None).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            "settings_path = \"projects.json\"\n\n[focus]\nscheme = \"lens:\"\n",
        )
        .unwrap();

        let config = load_config_from_path(file.path()).unwrap();
        assert_eq!(config.focus.scheme, "lens:");
        assert_eq!(config.focus.marker_color, "#888888");
        assert_eq!(config.colors, ColorRules::default());
        assert_eq!(config.settings_path, Some(PathBuf::from("projects.json")));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[colors]\nsaturation = \"high\"\n").unwrap();
        let err = load_config_from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = load_config_from_path(Path::new("/nonexistent/log-focus.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
