//! Default values for all configuration settings.

use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;
use crate::fetch::DEFAULT_OVERPASS_ENDPOINT;
use crate::geo::GeoPoint;
use crate::movement::DEFAULT_MOVEMENT_THRESHOLD;

/// Map center used when the user's location is unknown (Riga old town).
pub const DEFAULT_FALLBACK_CENTER: GeoPoint = GeoPoint::new_unchecked(56.9496, 24.1052);

/// Angular span, in degrees, of the fallback view in both directions.
pub const DEFAULT_FALLBACK_SPAN_DEG: f64 = 0.05;

pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

pub const DEFAULT_LOCATION_TIMEOUT_MS: u64 = 10_000;

pub const DEFAULT_HIGH_ACCURACY: bool = true;

pub const DEFAULT_OVERPASS_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_LOG_FILE_NAME: &str = "facilitymap.log";

/// Default log file (~/.facilitymap/facilitymap.log).
pub fn default_log_file() -> PathBuf {
    config_directory().join(DEFAULT_LOG_FILE_NAME)
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            map: MapSettings {
                fallback_lat: DEFAULT_FALLBACK_CENTER.lat(),
                fallback_lon: DEFAULT_FALLBACK_CENTER.lon(),
                fallback_span_deg: DEFAULT_FALLBACK_SPAN_DEG,
            },
            sync: SyncSettings {
                movement_threshold: DEFAULT_MOVEMENT_THRESHOLD,
                debounce_ms: DEFAULT_DEBOUNCE_MS,
            },
            location: LocationSettings {
                timeout_ms: DEFAULT_LOCATION_TIMEOUT_MS,
                high_accuracy: DEFAULT_HIGH_ACCURACY,
                endpoint: None,
            },
            overpass: OverpassSettings {
                endpoint: DEFAULT_OVERPASS_ENDPOINT.to_string(),
                timeout_secs: DEFAULT_OVERPASS_TIMEOUT_SECS,
            },
            layers: LayerSettings {
                water: true,
                toilets: false,
            },
            logging: LoggingSettings {
                file: default_log_file(),
            },
        }
    }
}
