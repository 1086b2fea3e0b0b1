//! Common arguments and helpers shared across session commands.

use std::time::Duration;

use clap::Args;
use tokio::runtime::Runtime;

use facilitymap::app::AppConfig;
use facilitymap::config::ConfigFile;
use facilitymap::facility::Layer;
use facilitymap::geo::GeoPoint;
use facilitymap::location::LocationSource;
use facilitymap::logging::{init_logging, LoggingGuard};

use crate::error::CliError;

/// Location, layer and endpoint options for `scan` and `watch`.
#[derive(Debug, Clone, Args)]
pub struct SessionArgs {
    /// Your latitude in decimal degrees (skips detection)
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Your longitude in decimal degrees (skips detection)
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Do not detect your location; start at the fallback view
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    pub no_location: bool,

    /// Layers to show, comma separated (water, toilets)
    #[arg(long, value_delimiter = ',')]
    pub layers: Option<Vec<Layer>>,

    /// Overpass API endpoint (overrides overpass.endpoint)
    #[arg(long)]
    pub overpass_url: Option<String>,

    /// Request timeout in seconds (overrides overpass.timeout_secs)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl SessionArgs {
    /// Resolve runtime settings: CLI flags take precedence, then config.
    pub fn app_config(&self, config: &ConfigFile) -> Result<AppConfig, CliError> {
        let mut app_config = AppConfig::from_config_file(config)?;

        if let Some(layers) = &self.layers {
            app_config = app_config.with_enabled_layers(dedup_layers(layers));
        }
        if let Some(url) = &self.overpass_url {
            app_config = app_config.with_overpass_endpoint(url.clone());
        }
        if let Some(secs) = self.timeout {
            if secs == 0 {
                return Err(CliError::InvalidArgument(
                    "--timeout must be at least 1 second".to_string(),
                ));
            }
            app_config.overpass_timeout = Duration::from_secs(secs);
        }

        Ok(app_config)
    }

    /// Where the user's position comes from.
    pub fn location_source(&self, app_config: &AppConfig) -> Result<LocationSource, CliError> {
        if self.no_location {
            return Ok(LocationSource::disabled());
        }

        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => {
                let point = GeoPoint::new(lat, lon)
                    .map_err(|e| CliError::InvalidArgument(format!("--lat/--lon: {}", e)))?;
                Ok(LocationSource::fixed(point))
            }
            _ => Ok(app_config.ip_location_source()?),
        }
    }
}

/// Load the config file and start logging to its configured log file.
pub fn load_config_and_logging(verbose: bool) -> Result<(ConfigFile, LoggingGuard), CliError> {
    let config = ConfigFile::load()?;
    let guard = init_logging(&config.logging.file, verbose)
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;

    tracing::info!(
        version = facilitymap::VERSION,
        log_file = %guard.path().display(),
        "FacilityMap starting"
    );

    Ok((config, guard))
}

/// Build the multi-threaded runtime the session runs on.
pub fn build_runtime() -> Result<Runtime, CliError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)
}

fn dedup_layers(layers: &[Layer]) -> Vec<Layer> {
    let mut unique = Vec::with_capacity(layers.len());
    for layer in layers {
        if !unique.contains(layer) {
            unique.push(*layer);
        }
    }
    unique
}
