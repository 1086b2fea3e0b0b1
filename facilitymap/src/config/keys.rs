//! Configuration key access and validation.
//!
//! Every INI key is a [`ConfigKey`]. The file parser and the `config set`
//! command both go through [`ConfigKey::apply`], so a value accepted by one is
//! accepted by the other.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use super::settings::ConfigFile;

/// Errors that can occur when getting or setting configuration values.
#[derive(Debug, Error)]
pub enum ConfigKeyError {
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("Invalid value for {key}: {reason}")]
    ValidationFailed { key: String, reason: String },
}

/// Supported configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    MapFallbackLat,
    MapFallbackLon,
    MapFallbackSpanDeg,

    SyncMovementThreshold,
    SyncDebounceMs,

    LocationTimeoutMs,
    LocationHighAccuracy,
    LocationEndpoint,

    OverpassEndpoint,
    OverpassTimeoutSecs,

    LayersWater,
    LayersToilets,

    LoggingFile,
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|key| key.name() == lower)
            .ok_or_else(|| ConfigKeyError::UnknownKey(s.to_string()))
    }
}

impl ConfigKey {
    /// Canonical key name (e.g. "sync.debounce_ms").
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::MapFallbackLat => "map.fallback_lat",
            ConfigKey::MapFallbackLon => "map.fallback_lon",
            ConfigKey::MapFallbackSpanDeg => "map.fallback_span_deg",
            ConfigKey::SyncMovementThreshold => "sync.movement_threshold",
            ConfigKey::SyncDebounceMs => "sync.debounce_ms",
            ConfigKey::LocationTimeoutMs => "location.timeout_ms",
            ConfigKey::LocationHighAccuracy => "location.high_accuracy",
            ConfigKey::LocationEndpoint => "location.endpoint",
            ConfigKey::OverpassEndpoint => "overpass.endpoint",
            ConfigKey::OverpassTimeoutSecs => "overpass.timeout_secs",
            ConfigKey::LayersWater => "layers.water",
            ConfigKey::LayersToilets => "layers.toilets",
            ConfigKey::LoggingFile => "logging.file",
        }
    }

    /// Section name (e.g. "sync").
    pub fn section(&self) -> &'static str {
        self.name().split('.').next().unwrap_or("")
    }

    /// Key name within the section (e.g. "debounce_ms").
    pub fn key_name(&self) -> &'static str {
        self.name().split('.').nth(1).unwrap_or(self.name())
    }

    /// Current value as a string.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::MapFallbackLat => config.map.fallback_lat.to_string(),
            ConfigKey::MapFallbackLon => config.map.fallback_lon.to_string(),
            ConfigKey::MapFallbackSpanDeg => config.map.fallback_span_deg.to_string(),
            ConfigKey::SyncMovementThreshold => config.sync.movement_threshold.to_string(),
            ConfigKey::SyncDebounceMs => config.sync.debounce_ms.to_string(),
            ConfigKey::LocationTimeoutMs => config.location.timeout_ms.to_string(),
            ConfigKey::LocationHighAccuracy => config.location.high_accuracy.to_string(),
            ConfigKey::LocationEndpoint => config.location.endpoint.clone().unwrap_or_default(),
            ConfigKey::OverpassEndpoint => config.overpass.endpoint.clone(),
            ConfigKey::OverpassTimeoutSecs => config.overpass.timeout_secs.to_string(),
            ConfigKey::LayersWater => config.layers.water.to_string(),
            ConfigKey::LayersToilets => config.layers.toilets.to_string(),
            ConfigKey::LoggingFile => path_to_display(&config.logging.file),
        }
    }

    /// Validate `value` and store it.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        self.apply(config, value)
            .map_err(|reason| ConfigKeyError::ValidationFailed {
                key: self.name().to_string(),
                reason,
            })
    }

    /// Parse `value` into the field this key names. Errors carry the reason.
    pub(super) fn apply(&self, config: &mut ConfigFile, value: &str) -> Result<(), String> {
        let value = value.trim();
        match self {
            ConfigKey::MapFallbackLat => {
                config.map.fallback_lat = parse_number_in(value, -90.0, 90.0)?;
            }
            ConfigKey::MapFallbackLon => {
                config.map.fallback_lon = parse_number_in(value, -180.0, 180.0)?;
            }
            ConfigKey::MapFallbackSpanDeg => {
                config.map.fallback_span_deg = parse_number_in(value, 0.0001, 10.0)?;
            }
            ConfigKey::SyncMovementThreshold => {
                config.sync.movement_threshold = parse_number_in(value, 0.0, 10.0)?;
            }
            ConfigKey::SyncDebounceMs => {
                config.sync.debounce_ms = parse_integer(value)?;
            }
            ConfigKey::LocationTimeoutMs => {
                config.location.timeout_ms = parse_positive_integer(value)?;
            }
            ConfigKey::LocationHighAccuracy => {
                config.location.high_accuracy = parse_bool(value)?;
            }
            ConfigKey::LocationEndpoint => {
                config.location.endpoint = if value.is_empty() {
                    None
                } else {
                    Some(parse_url(value)?)
                };
            }
            ConfigKey::OverpassEndpoint => {
                config.overpass.endpoint = parse_url(value)?;
            }
            ConfigKey::OverpassTimeoutSecs => {
                config.overpass.timeout_secs = parse_positive_integer(value)?;
            }
            ConfigKey::LayersWater => {
                config.layers.water = parse_bool(value)?;
            }
            ConfigKey::LayersToilets => {
                config.layers.toilets = parse_bool(value)?;
            }
            ConfigKey::LoggingFile => {
                if value.is_empty() {
                    return Err("must be a valid path".to_string());
                }
                config.logging.file = expand_tilde(value);
            }
        }
        Ok(())
    }

    /// All supported keys, in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::MapFallbackLat,
            ConfigKey::MapFallbackLon,
            ConfigKey::MapFallbackSpanDeg,
            ConfigKey::SyncMovementThreshold,
            ConfigKey::SyncDebounceMs,
            ConfigKey::LocationTimeoutMs,
            ConfigKey::LocationHighAccuracy,
            ConfigKey::LocationEndpoint,
            ConfigKey::OverpassEndpoint,
            ConfigKey::OverpassTimeoutSecs,
            ConfigKey::LayersWater,
            ConfigKey::LayersToilets,
            ConfigKey::LoggingFile,
        ]
    }
}

// ============================================================================
// Value parsing
// ============================================================================

fn parse_number_in(value: &str, min: f64, max: f64) -> Result<f64, String> {
    let reason = || format!("must be a number between {} and {}", min, max);
    let n: f64 = value.parse().map_err(|_| reason())?;
    if n.is_finite() && (min..=max).contains(&n) {
        Ok(n)
    } else {
        Err(reason())
    }
}

fn parse_integer(value: &str) -> Result<u64, String> {
    value
        .parse()
        .map_err(|_| "must be a non-negative integer".to_string())
}

fn parse_positive_integer(value: &str) -> Result<u64, String> {
    match value.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err("must be a positive integer".to_string()),
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err("must be true/false, yes/no, 1/0, or on/off".to_string()),
    }
}

fn parse_url(value: &str) -> Result<String, String> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(value.to_string())
    } else {
        Err("must be a URL starting with 'http://' or 'https://'".to_string())
    }
}

/// Expand ~ to home directory in paths.
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Convert path to display string, collapsing home dir to ~.
pub(super) fn path_to_display(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_key_parsing() {
        assert_eq!(
            "sync.debounce_ms".parse::<ConfigKey>().unwrap(),
            ConfigKey::SyncDebounceMs
        );
        // Case insensitive
        assert_eq!(
            "LAYERS.TOILETS".parse::<ConfigKey>().unwrap(),
            ConfigKey::LayersToilets
        );
        assert!(matches!(
            "invalid.key".parse::<ConfigKey>(),
            Err(ConfigKeyError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_key_name_parts() {
        let key = ConfigKey::OverpassTimeoutSecs;
        assert_eq!(key.section(), "overpass");
        assert_eq!(key.key_name(), "timeout_secs");
    }

    #[test]
    fn test_every_key_round_trips_its_default() {
        let defaults = ConfigFile::default();
        for key in ConfigKey::all() {
            let mut config = ConfigFile::default();
            let value = key.get(&defaults);
            key.set(&mut config, &value)
                .unwrap_or_else(|e| panic!("{} rejected its default '{}': {}", key.name(), value, e));
            assert_eq!(key.get(&config), value, "{}", key.name());
        }
    }

    #[test]
    fn test_set_value() {
        let mut config = ConfigFile::default();

        ConfigKey::SyncMovementThreshold.set(&mut config, "0.5").unwrap();
        ConfigKey::LayersToilets.set(&mut config, "yes").unwrap();
        ConfigKey::LocationEndpoint.set(&mut config, "https://geo.example/json").unwrap();

        assert_eq!(config.sync.movement_threshold, 0.5);
        assert!(config.layers.toilets);
        assert_eq!(
            config.location.endpoint.as_deref(),
            Some("https://geo.example/json")
        );

        ConfigKey::LocationEndpoint.set(&mut config, "").unwrap();
        assert!(config.location.endpoint.is_none());
    }

    #[test]
    fn test_set_invalid_value_fails() {
        let mut config = ConfigFile::default();

        for (key, value) in [
            (ConfigKey::MapFallbackLat, "91"),
            (ConfigKey::MapFallbackLon, "east"),
            (ConfigKey::SyncMovementThreshold, "-0.1"),
            (ConfigKey::LocationTimeoutMs, "0"),
            (ConfigKey::LayersWater, "maybe"),
            (ConfigKey::OverpassEndpoint, "overpass-api.de"),
        ] {
            let result = key.set(&mut config, value);
            assert!(
                matches!(result, Err(ConfigKeyError::ValidationFailed { .. })),
                "{} accepted '{}'",
                key.name(),
                value
            );
        }

        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_logging_file_expands_tilde() {
        let mut config = ConfigFile::default();
        ConfigKey::LoggingFile.set(&mut config, "~/logs/map.log").unwrap();

        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.logging.file, home.join("logs/map.log"));
        }
    }
}
