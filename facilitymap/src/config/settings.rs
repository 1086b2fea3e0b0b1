//! Settings structs, one per `[section]` of the INI file.

use std::path::PathBuf;
use std::time::Duration;

use super::file::ConfigFileError;
use crate::facility::Layer;
use crate::geo::{BoundingBox, GeoPoint};
use crate::location::LocationOptions;
use crate::sync::SyncConfig;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub map: MapSettings,
    pub sync: SyncSettings,
    pub location: LocationSettings,
    pub overpass: OverpassSettings,
    pub layers: LayerSettings,
    pub logging: LoggingSettings,
}

/// Initial view used when the user's location is unknown.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub fallback_lat: f64,
    pub fallback_lon: f64,
    /// Span of the view in degrees, applied to latitude and longitude alike.
    pub fallback_span_deg: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncSettings {
    /// Fraction of the viewport diagonal the map center must travel before refetching.
    pub movement_threshold: f64,
    /// Quiet period after the last viewport change, in milliseconds.
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationSettings {
    pub timeout_ms: u64,
    pub high_accuracy: bool,
    /// IP geolocation service; the built-in one when unset.
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverpassSettings {
    pub endpoint: String,
    pub timeout_secs: u64,
}

/// Layers enabled at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSettings {
    pub water: bool,
    pub toilets: bool,
}

impl LayerSettings {
    pub fn is_enabled(&self, layer: Layer) -> bool {
        match layer {
            Layer::Water => self.water,
            Layer::Toilets => self.toilets,
        }
    }

    pub fn enabled(&self) -> Vec<Layer> {
        Layer::ALL
            .into_iter()
            .filter(|layer| self.is_enabled(*layer))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub file: PathBuf,
}

impl ConfigFile {
    /// Fallback map center.
    pub fn fallback_center(&self) -> Result<GeoPoint, ConfigFileError> {
        GeoPoint::new(self.map.fallback_lat, self.map.fallback_lon).map_err(|e| {
            ConfigFileError::InvalidValue {
                section: "map".to_string(),
                key: "fallback_lat/fallback_lon".to_string(),
                value: format!("{},{}", self.map.fallback_lat, self.map.fallback_lon),
                reason: e.to_string(),
            }
        })
    }

    /// Runtime settings for a sync session.
    pub fn sync_config(&self) -> Result<SyncConfig, ConfigFileError> {
        let span = self.map.fallback_span_deg;
        Ok(SyncConfig {
            movement_threshold: self.sync.movement_threshold,
            debounce_delay: Duration::from_millis(self.sync.debounce_ms),
            fallback_viewport: BoundingBox::around(self.fallback_center()?, span, span),
            enabled_layers: self.layers.enabled(),
        })
    }

    pub fn location_options(&self) -> LocationOptions {
        LocationOptions::new(
            Duration::from_millis(self.location.timeout_ms),
            self.location.high_accuracy,
        )
    }

    pub fn overpass_timeout(&self) -> Duration {
        Duration::from_secs(self.overpass.timeout_secs)
    }
}
