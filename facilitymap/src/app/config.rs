//! Application configuration for FacilityMapApp.
//!
//! `AppConfig` is the runtime view of the user's config file: durations
//! instead of millisecond counts, a validated fallback viewport, and the
//! layers to enable. CLI flags override it through the `with_*` builders.

use std::time::Duration;

use super::error::AppError;
use crate::config::ConfigFile;
use crate::facility::Layer;
use crate::fetch::{DEFAULT_OVERPASS_ENDPOINT, DEFAULT_REQUEST_TIMEOUT};
use crate::geo::BoundingBox;
use crate::location::{IpGeolocation, LocationOptions, LocationSource, DEFAULT_IP_GEOLOCATION_ENDPOINT};
use crate::sync::SyncConfig;

/// Everything needed to start a session.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub sync: SyncConfig,

    pub location: LocationOptions,

    /// IP geolocation service; the built-in one when `None`.
    pub ip_endpoint: Option<String>,

    pub overpass_endpoint: String,

    /// Deadline for a single facility fetch.
    pub overpass_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sync: SyncConfig::default(),
            location: LocationOptions::default(),
            ip_endpoint: None,
            overpass_endpoint: DEFAULT_OVERPASS_ENDPOINT.to_string(),
            overpass_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl AppConfig {
    pub fn from_config_file(config: &ConfigFile) -> Result<Self, AppError> {
        Ok(Self {
            sync: config.sync_config()?,
            location: config.location_options(),
            ip_endpoint: config.location.endpoint.clone(),
            overpass_endpoint: config.overpass.endpoint.clone(),
            overpass_timeout: config.overpass_timeout(),
        })
    }

    /// Override the layers enabled at startup.
    pub fn with_enabled_layers(mut self, layers: Vec<Layer>) -> Self {
        self.sync.enabled_layers = layers;
        self
    }

    /// Override the view used when the user's location is unknown.
    pub fn with_fallback_viewport(mut self, bounds: BoundingBox) -> Self {
        self.sync.fallback_viewport = bounds;
        self
    }

    pub fn with_overpass_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.overpass_endpoint = endpoint.into();
        self
    }

    /// Location source backed by the configured IP geolocation service.
    pub fn ip_location_source(&self) -> Result<LocationSource, AppError> {
        let endpoint = self
            .ip_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_IP_GEOLOCATION_ENDPOINT);
        Ok(LocationSource::Ip(IpGeolocation::new(endpoint)?))
    }
}
