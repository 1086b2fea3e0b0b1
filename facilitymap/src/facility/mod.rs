//! Facility model.
//!
//! A facility is a single point of interest the map shows: a drinking-water
//! source or a public toilet. Facilities are grouped into [`Layer`]s that the
//! user toggles independently. The semantic payload of each facility is a
//! tagged [`FacilityDetails`] derived from its OpenStreetMap tags.

mod tags;
mod types;

pub use tags::{parse_yes_no, Wheelchair};
pub use types::{
    AnnotatedFacility, ElementType, Facility, FacilityDetails, FacilityId, Layer, ParseLayerError,
};
