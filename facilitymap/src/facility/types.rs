//! Facility, identifier and layer types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::tags::{parse_yes_no, Wheelchair};
use crate::geo::{Annotated, GeoPoint, Positioned};

/// A facility with its distance from the reference location.
pub type AnnotatedFacility = Annotated<Facility>;

/// OSM element kind a facility was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementType {
    Node,
    Way,
    Relation,
}

impl ElementType {
    /// Parse the `type` field of an Overpass element.
    pub fn from_overpass(s: &str) -> Option<Self> {
        match s {
            "node" => Some(ElementType::Node),
            "way" => Some(ElementType::Way),
            "relation" => Some(ElementType::Relation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Node => "node",
            ElementType::Way => "way",
            ElementType::Relation => "relation",
        }
    }
}

/// Stable identifier of a facility.
///
/// OSM numbers nodes, ways and relations independently, so the element type
/// is part of the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FacilityId {
    pub element: ElementType,
    pub id: u64,
}

impl FacilityId {
    pub fn new(element: ElementType, id: u64) -> Self {
        Self { element, id }
    }

    /// Identifier of an OSM node.
    pub fn node(id: u64) -> Self {
        Self::new(ElementType::Node, id)
    }
}

impl fmt::Display for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.element.as_str(), self.id)
    }
}

/// A toggleable group of facilities sharing one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Drinking-water taps, fountains and refill points
    Water,
    /// Public toilets
    Toilets,
}

impl Layer {
    /// Every layer, in display order.
    pub const ALL: [Layer; 2] = [Layer::Water, Layer::Toilets];

    pub fn name(&self) -> &'static str {
        match self {
            Layer::Water => "water",
            Layer::Toilets => "toilets",
        }
    }

    /// Position of this layer in [`Layer::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Layer::Water => 0,
            Layer::Toilets => 1,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown layer name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown layer '{0}' (expected 'water' or 'toilets')")]
pub struct ParseLayerError(pub String);

impl FromStr for Layer {
    type Err = ParseLayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "water" | "drinking_water" => Ok(Layer::Water),
            "toilets" | "toilet" => Ok(Layer::Toilets),
            other => Err(ParseLayerError(other.to_string())),
        }
    }
}

/// Domain-specific attributes of a facility.
#[derive(Debug, Clone, PartialEq)]
pub enum FacilityDetails {
    DrinkingWater {
        /// Suitable for refilling bottles (`bottle=*`)
        bottle_refill: Option<bool>,
        /// Only available part of the year (`seasonal=*`)
        seasonal: Option<bool>,
        /// Charged (`fee=*`)
        fee: Option<bool>,
    },
    Toilets {
        /// Charged (`fee=*`)
        fee: Option<bool>,
        /// Wheelchair accessibility (`wheelchair=*`)
        wheelchair: Option<Wheelchair>,
        /// Raw `opening_hours=*` value
        opening_hours: Option<String>,
        /// Baby changing table available (`changing_table=*`)
        changing_table: Option<bool>,
    },
}

impl FacilityDetails {
    /// Derive typed details for a layer from raw OSM tags.
    pub fn from_tags(layer: Layer, tags: &BTreeMap<String, String>) -> Self {
        let flag = |key: &str| tags.get(key).and_then(|v| parse_yes_no(v));

        match layer {
            Layer::Water => FacilityDetails::DrinkingWater {
                bottle_refill: flag("bottle"),
                seasonal: flag("seasonal"),
                fee: flag("fee"),
            },
            Layer::Toilets => FacilityDetails::Toilets {
                fee: flag("fee"),
                wheelchair: tags.get("wheelchair").and_then(|v| Wheelchair::from_tag(v)),
                opening_hours: tags.get("opening_hours").cloned(),
                changing_table: flag("changing_table"),
            },
        }
    }

    /// The layer these details belong to.
    pub fn layer(&self) -> Layer {
        match self {
            FacilityDetails::DrinkingWater { .. } => Layer::Water,
            FacilityDetails::Toilets { .. } => Layer::Toilets,
        }
    }

    /// Whether using the facility costs money, if known.
    pub fn fee(&self) -> Option<bool> {
        match self {
            FacilityDetails::DrinkingWater { fee, .. } | FacilityDetails::Toilets { fee, .. } => {
                *fee
            }
        }
    }
}

/// A single point of interest shown on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    pub id: FacilityId,
    pub position: GeoPoint,
    pub details: FacilityDetails,
    /// Raw OSM tags as supplied by the data source.
    pub tags: BTreeMap<String, String>,
}

impl Facility {
    /// Create a facility, deriving its details from the tags.
    pub fn new(
        id: FacilityId,
        position: GeoPoint,
        layer: Layer,
        tags: BTreeMap<String, String>,
    ) -> Self {
        let details = FacilityDetails::from_tags(layer, &tags);
        Self {
            id,
            position,
            details,
            tags,
        }
    }

    pub fn layer(&self) -> Layer {
        self.details.layer()
    }

    /// Human-readable name, if tagged.
    pub fn name(&self) -> Option<&str> {
        self.tags.get("name").map(String::as_str)
    }
}

impl Positioned for Facility {
    fn position(&self) -> GeoPoint {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_facility_id_display() {
        assert_eq!(FacilityId::node(42).to_string(), "node/42");
        assert_eq!(
            FacilityId::new(ElementType::Way, 7).to_string(),
            "way/7"
        );
    }

    #[test]
    fn test_layer_parse_and_display() {
        assert_eq!("water".parse::<Layer>().unwrap(), Layer::Water);
        assert_eq!("Toilets".parse::<Layer>().unwrap(), Layer::Toilets);
        assert!("benches".parse::<Layer>().is_err());
        assert_eq!(Layer::Toilets.to_string(), "toilets");
        assert_eq!(Layer::ALL[Layer::Toilets.index()], Layer::Toilets);
    }

    #[test]
    fn test_water_details_from_tags() {
        let details = FacilityDetails::from_tags(
            Layer::Water,
            &tags(&[("amenity", "drinking_water"), ("bottle", "yes"), ("fee", "no")]),
        );

        assert_eq!(
            details,
            FacilityDetails::DrinkingWater {
                bottle_refill: Some(true),
                seasonal: None,
                fee: Some(false),
            }
        );
        assert_eq!(details.layer(), Layer::Water);
        assert_eq!(details.fee(), Some(false));
    }

    #[test]
    fn test_toilet_details_from_tags() {
        let details = FacilityDetails::from_tags(
            Layer::Toilets,
            &tags(&[
                ("amenity", "toilets"),
                ("wheelchair", "limited"),
                ("opening_hours", "24/7"),
                ("fee", "yes"),
            ]),
        );

        match details {
            FacilityDetails::Toilets {
                fee,
                wheelchair,
                opening_hours,
                changing_table,
            } => {
                assert_eq!(fee, Some(true));
                assert_eq!(wheelchair, Some(Wheelchair::Limited));
                assert_eq!(opening_hours.as_deref(), Some("24/7"));
                assert_eq!(changing_table, None);
            }
            other => panic!("Expected toilet details, got {:?}", other),
        }
    }

    #[test]
    fn test_facility_name() {
        let facility = Facility::new(
            FacilityId::node(1),
            GeoPoint::new(56.95, 24.1).unwrap(),
            Layer::Water,
            tags(&[("name", "Vērmanes dārzs")]),
        );
        assert_eq!(facility.name(), Some("Vērmanes dārzs"));
        assert_eq!(facility.layer(), Layer::Water);
    }
}
