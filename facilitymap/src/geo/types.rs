//! Coordinate and bounding box types.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::distance::distance;

/// Errors raised when constructing geographic values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// Latitude outside [-90, 90] or not finite
    #[error("latitude {0} is outside [-90, 90]")]
    InvalidLatitude(f64),

    /// Longitude outside [-180, 180] or not finite
    #[error("longitude {0} is outside [-180, 180]")]
    InvalidLongitude(f64),

    /// South edge lies north of the north edge
    #[error("south edge {south} lies north of north edge {north}")]
    InvertedBounds { south: f64, north: f64 },

    /// Text could not be parsed as a coordinate tuple
    #[error("malformed coordinates '{0}': expected comma-separated decimal degrees")]
    Malformed(String),
}

fn check_lat(lat: f64) -> Result<f64, GeoError> {
    if lat.is_finite() && (-90.0..=90.0).contains(&lat) {
        Ok(lat)
    } else {
        Err(GeoError::InvalidLatitude(lat))
    }
}

fn check_lon(lon: f64) -> Result<f64, GeoError> {
    if lon.is_finite() && (-180.0..=180.0).contains(&lon) {
        Ok(lon)
    } else {
        Err(GeoError::InvalidLongitude(lon))
    }
}

fn parse_components<const N: usize>(s: &str) -> Result<[f64; N], GeoError> {
    let malformed = || GeoError::Malformed(s.to_string());
    let mut values = [0.0; N];
    let mut parts = s.split(',');

    for slot in values.iter_mut() {
        *slot = parts
            .next()
            .and_then(|p| p.trim().parse::<f64>().ok())
            .ok_or_else(malformed)?;
    }

    if parts.next().is_some() {
        return Err(malformed());
    }

    Ok(values)
}

/// A WGS84 position in decimal degrees.
///
/// Always holds a latitude in [-90, 90] and a longitude in [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

impl GeoPoint {
    /// Create a point, validating both coordinates.
    pub fn new(lat: f64, lon: f64) -> Result<Self, GeoError> {
        Ok(Self {
            lat: check_lat(lat)?,
            lon: check_lon(lon)?,
        })
    }

    /// Create a point from coordinates known to be in range.
    pub(crate) const fn new_unchecked(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lon)
    }
}

impl FromStr for GeoPoint {
    type Err = GeoError;

    /// Parse `lat,lon`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [lat, lon] = parse_components::<2>(s)?;
        Self::new(lat, lon)
    }
}

/// Geographic rectangle currently visible on the map.
///
/// Edges are in decimal degrees with `south <= north`. Rectangles crossing the
/// antimeridian are not represented; `west > east` is accepted but treated as
/// an ordinary (inverted) longitude span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    south: f64,
    west: f64,
    north: f64,
    east: f64,
}

impl BoundingBox {
    /// Create a bounding box from its four edges.
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Result<Self, GeoError> {
        let south = check_lat(south)?;
        let north = check_lat(north)?;
        let west = check_lon(west)?;
        let east = check_lon(east)?;

        if south > north {
            return Err(GeoError::InvertedBounds { south, north });
        }

        Ok(Self {
            south,
            west,
            north,
            east,
        })
    }

    /// Create a box of the given angular spans centered on a point.
    ///
    /// Edges are clamped to the valid coordinate ranges.
    pub fn around(center: GeoPoint, lat_span: f64, lon_span: f64) -> Self {
        let half_lat = lat_span.abs() / 2.0;
        let half_lon = lon_span.abs() / 2.0;

        Self {
            south: (center.lat - half_lat).max(-90.0),
            west: (center.lon - half_lon).max(-180.0),
            north: (center.lat + half_lat).min(90.0),
            east: (center.lon + half_lon).min(180.0),
        }
    }

    pub fn south(&self) -> f64 {
        self.south
    }

    pub fn west(&self) -> f64 {
        self.west
    }

    pub fn north(&self) -> f64 {
        self.north
    }

    pub fn east(&self) -> f64 {
        self.east
    }

    /// Midpoint of the rectangle in degree space.
    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            lat: (self.south + self.north) / 2.0,
            lon: (self.west + self.east) / 2.0,
        }
    }

    /// North-east corner.
    pub fn north_east(&self) -> GeoPoint {
        GeoPoint {
            lat: self.north,
            lon: self.east,
        }
    }

    /// South-west corner.
    pub fn south_west(&self) -> GeoPoint {
        GeoPoint {
            lat: self.south,
            lon: self.west,
        }
    }

    /// Great-circle distance between the south-west and north-east corners, in meters.
    ///
    /// Used as the size reference for relative movement checks.
    pub fn diagonal(&self) -> f64 {
        distance(self.south_west(), self.north_east())
    }

    /// Check whether a point lies inside or on the edge of this box.
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lon >= self.west
            && point.lon <= self.east
    }

    /// Serialize as `south,west,north,east`, the order bounded geodata queries expect.
    pub fn to_query_string(&self) -> String {
        format!("{},{},{},{}", self.south, self.west, self.north, self.east)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.5},{:.5},{:.5},{:.5}",
            self.south, self.west, self.north, self.east
        )
    }
}

impl FromStr for BoundingBox {
    type Err = GeoError;

    /// Parse `south,west,north,east`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [south, west, north, east] = parse_components::<4>(s)?;
        Self::new(south, west, north, east)
    }
}
