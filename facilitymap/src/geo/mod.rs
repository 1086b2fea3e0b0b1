//! Geographic primitives.
//!
//! Coordinates, viewport rectangles and the great-circle math the sync engine
//! uses to measure how far facilities are from the reference location and how
//! far the viewport has travelled.
//!
//! # Example
//!
//! ```
//! use facilitymap::geo::{distance, GeoPoint};
//!
//! let riga = GeoPoint::new(56.9496, 24.1052).unwrap();
//! let jurmala = GeoPoint::new(56.9680, 23.7704).unwrap();
//! assert!(distance(riga, jurmala) > 20_000.0);
//! ```

mod distance;
mod nearest;
mod types;

pub use distance::{distance, EARTH_RADIUS_M};
pub use nearest::{annotate, nearest, nearest_index, Annotated, Positioned};
pub use types::{BoundingBox, GeoError, GeoPoint};
