//! Configuration file handling for ~/.facilitymap/config.ini.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use super::keys::{path_to_display, ConfigKey};
use super::settings::ConfigFile;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load configuration from the default path (~/.facilitymap/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        parse_ini(&ini)
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        std::fs::write(path, to_config_string(self))
            .map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Create the default config file if it doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn ensure_exists() -> Result<PathBuf, ConfigFileError> {
        let path = config_file_path();
        if !path.exists() {
            Self::default().save_to(&path)?;
        }
        Ok(path)
    }
}

/// Starts from the defaults and overlays every key present in the INI.
fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    for key in ConfigKey::all() {
        let Some(value) = ini.get_from(Some(key.section()), key.key_name()) else {
            continue;
        };

        key.apply(&mut config, value)
            .map_err(|reason| ConfigFileError::InvalidValue {
                section: key.section().to_string(),
                key: key.key_name().to_string(),
                value: value.to_string(),
                reason,
            })?;
    }

    Ok(config)
}

fn to_config_string(config: &ConfigFile) -> String {
    let location_endpoint = config.location.endpoint.as_deref().unwrap_or("");

    format!(
        r#"[map]
; View shown when the user's location cannot be detected
fallback_lat = {}
fallback_lon = {}
; Span of the fallback view in degrees
fallback_span_deg = {}

[sync]
; Refetch once the map center moves this fraction of the viewport diagonal
movement_threshold = {}
; Wait this long after the last pan or zoom before evaluating it (milliseconds)
debounce_ms = {}

[location]
; Give up on location detection after this long (milliseconds)
timeout_ms = {}
high_accuracy = {}
; IP geolocation service used by the CLI (empty = built-in default)
endpoint = {}

[overpass]
; Overpass API interpreter
endpoint = {}
timeout_secs = {}

[layers]
; Layers shown at startup
water = {}
toilets = {}

[logging]
file = {}
"#,
        config.map.fallback_lat,
        config.map.fallback_lon,
        config.map.fallback_span_deg,
        config.sync.movement_threshold,
        config.sync.debounce_ms,
        config.location.timeout_ms,
        config.location.high_accuracy,
        location_endpoint,
        config.overpass.endpoint,
        config.overpass.timeout_secs,
        config.layers.water,
        config.layers.toilets,
        path_to_display(&config.logging.file),
    )
}

/// Get the path to the config directory (~/.facilitymap).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".facilitymap")
}

/// Get the path to the config file (~/.facilitymap/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = ConfigFile::load_from(&config_path).unwrap();

        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.map.fallback_lat = 52.52;
        config.map.fallback_lon = 13.405;
        config.sync.debounce_ms = 500;
        config.location.endpoint = Some("https://geo.example/json".to_string());
        config.layers.toilets = true;
        config.logging.file = temp_dir.path().join("facilitymap.log");

        config.save_to(&config_path).unwrap();
        let loaded = ConfigFile::load_from(&config_path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, "[layers]\ntoilets = yes\n").unwrap();

        let config = ConfigFile::load_from(&config_path).unwrap();

        assert!(config.layers.toilets);
        assert!(config.layers.water);
        assert_eq!(config.sync, ConfigFile::default().sync);
    }

    #[test]
    fn test_invalid_value_names_section_and_key() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, "[sync]\ndebounce_ms = soon\n").unwrap();

        match ConfigFile::load_from(&config_path) {
            Err(ConfigFileError::InvalidValue {
                section,
                key,
                value,
                ..
            }) => {
                assert_eq!(section, "sync");
                assert_eq!(key, "debounce_ms");
                assert_eq!(value, "soon");
            }
            other => panic!("Expected invalid value error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_location_endpoint_is_unset() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, "[location]\nendpoint =\n").unwrap();

        let config = ConfigFile::load_from(&config_path).unwrap();

        assert!(config.location.endpoint.is_none());
    }
}
