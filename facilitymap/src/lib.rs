//! FacilityMap - viewport-driven public facility finder
//!
//! This library keeps a map view in sync with public drinking water and
//! toilet locations from OpenStreetMap. It detects the user's location once,
//! fetches facilities for the visible area, annotates each one with its
//! distance from the user, and refetches only when the view has moved far
//! enough to matter.
//!
//! # Modules
//!
//! - [`geo`]: coordinates, bounding boxes, great-circle distance, nearest search
//! - [`facility`]: facility records, layers, and tag interpretation
//! - [`location`]: one-shot location detection over a platform abstraction
//! - [`movement`]: the significant-movement gate and viewport debouncer
//! - [`fetch`]: Overpass query templates, transport, and response parsing
//! - [`sync`]: the coordinator and session actor tying it all together
//! - [`app`]: session bootstrap from configuration
//! - [`config`]: the `~/.facilitymap/config.ini` file
//! - [`logging`]: tracing subscriber setup

pub mod app;
pub mod config;
pub mod facility;
pub mod fetch;
pub mod geo;
pub mod location;
pub mod logging;
pub mod movement;
pub mod sync;

/// Version of the library, for user agents and `--version` output.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_not_empty() {
        assert!(!VERSION.is_empty(), "Version should not be empty");
    }
}
