//! Overpass JSON response parsing.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use super::error::FetchError;
use crate::facility::{ElementType, Facility, FacilityId, Layer};
use crate::geo::GeoPoint;

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Vec<OverpassElement>,
    /// Server-side diagnostics; runtime errors arrive here with HTTP 200.
    #[serde(default)]
    remark: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    element_type: String,
    id: u64,
    lat: Option<f64>,
    lon: Option<f64>,
    /// Present on ways and relations when queried with `out center`.
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OverpassCenter {
    lat: f64,
    lon: f64,
}

impl OverpassElement {
    fn position(&self) -> Option<GeoPoint> {
        let (lat, lon) = match (&self.center, self.lat, self.lon) {
            (_, Some(lat), Some(lon)) => (lat, lon),
            (Some(center), _, _) => (center.lat, center.lon),
            _ => return None,
        };
        GeoPoint::new(lat, lon).ok()
    }
}

/// Parse an Overpass `[out:json]` body into facilities of `layer`.
///
/// Elements are returned in source order. Elements of unknown type or without
/// a usable position are skipped. A body that is not JSON or lacks the
/// `elements` array is a parse error; a runtime error remark from the server
/// maps to a timeout or network error depending on its cause.
pub fn parse_overpass_response(
    body: &[u8],
    layer: Layer,
    deadline: Duration,
) -> Result<Vec<Facility>, FetchError> {
    let response: OverpassResponse =
        serde_json::from_slice(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    if let Some(remark) = response.remark.as_deref() {
        if remark.contains("runtime error") {
            return Err(if remark.contains("timed out") {
                FetchError::Timeout(deadline)
            } else {
                FetchError::Network(remark.to_string())
            });
        }
    }

    let total = response.elements.len();
    let facilities: Vec<Facility> = response
        .elements
        .into_iter()
        .filter_map(|element| {
            let Some(element_type) = ElementType::from_overpass(&element.element_type) else {
                debug!(kind = %element.element_type, id = element.id, "Skipping unknown element type");
                return None;
            };
            let Some(position) = element.position() else {
                debug!(id = element.id, "Skipping element without position");
                return None;
            };

            Some(Facility::new(
                FacilityId::new(element_type, element.id),
                position,
                layer,
                element.tags,
            ))
        })
        .collect();

    if facilities.len() < total {
        debug!(
            kept = facilities.len(),
            skipped = total - facilities.len(),
            layer = %layer,
            "Overpass elements filtered"
        );
    }

    Ok(facilities)
}
