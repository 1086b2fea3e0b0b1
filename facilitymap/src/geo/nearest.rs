//! Nearest-point search and distance annotation.

use super::distance::distance;
use super::types::GeoPoint;

/// Anything with a geographic position.
pub trait Positioned {
    /// Position used for distance calculations.
    fn position(&self) -> GeoPoint;
}

impl Positioned for GeoPoint {
    fn position(&self) -> GeoPoint {
        *self
    }
}

/// An item decorated with its distance from the reference location.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotated<T> {
    /// The underlying item.
    pub item: T,
    /// Great-circle distance from the reference, in meters.
    pub distance_m: f64,
    /// Whether this is the single nearest item of its set.
    pub is_nearest: bool,
}

/// Index of the item closest to `reference`.
///
/// Ties resolve to the first minimal element in input order. Returns `None`
/// for an empty slice.
pub fn nearest_index<T: Positioned>(reference: GeoPoint, items: &[T]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (index, item) in items.iter().enumerate() {
        let d = distance(reference, item.position());
        match best {
            // Strict comparison keeps the earliest minimum.
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((index, d)),
        }
    }

    best.map(|(index, _)| index)
}

/// The item closest to `reference`, first occurrence winning ties.
pub fn nearest<T: Positioned>(reference: GeoPoint, items: &[T]) -> Option<&T> {
    nearest_index(reference, items).map(|index| &items[index])
}

/// Compute distances from `reference` for every item and flag the nearest.
///
/// Input order is preserved. Exactly one element is flagged `is_nearest` for a
/// non-empty input, and it is the element [`nearest`] returns.
pub fn annotate<T: Positioned + Clone>(reference: GeoPoint, items: &[T]) -> Vec<Annotated<T>> {
    let nearest = nearest_index(reference, items);

    items
        .iter()
        .enumerate()
        .map(|(index, item)| Annotated {
            item: item.clone(),
            distance_m: distance(reference, item.position()),
            is_nearest: Some(index) == nearest,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    #[test]
    fn test_nearest_empty_is_none() {
        let items: Vec<GeoPoint> = Vec::new();
        assert!(nearest(point(0.0, 0.0), &items).is_none());
    }

    #[test]
    fn test_nearest_picks_closest() {
        let items = vec![point(1.0, 1.0), point(0.1, 0.1), point(2.0, 2.0)];
        assert_eq!(nearest_index(point(0.0, 0.0), &items), Some(1));
    }

    #[test]
    fn test_nearest_tie_prefers_first_occurrence() {
        // Both are exactly one degree of latitude away.
        let items = vec![point(1.0, 0.0), point(-1.0, 0.0)];
        assert_eq!(nearest_index(point(0.0, 0.0), &items), Some(0));

        let reversed = vec![point(-1.0, 0.0), point(1.0, 0.0)];
        assert_eq!(nearest(point(0.0, 0.0), &reversed), Some(&point(-1.0, 0.0)));
    }

    #[test]
    fn test_annotate_empty() {
        let items: Vec<GeoPoint> = Vec::new();
        assert!(annotate(point(0.0, 0.0), &items).is_empty());
    }

    #[test]
    fn test_annotate_flags_exactly_one() {
        let items = vec![point(0.0, 0.0), point(0.0, 0.0), point(3.0, 3.0)];
        let annotated = annotate(point(0.0, 0.0), &items);

        assert_eq!(annotated.len(), 3);
        assert_eq!(annotated.iter().filter(|a| a.is_nearest).count(), 1);
        assert!(annotated[0].is_nearest);
        assert_eq!(annotated[0].distance_m, 0.0);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_point() -> impl Strategy<Value = GeoPoint> {
            (-90.0..=90.0_f64, -180.0..=180.0_f64)
                .prop_map(|(lat, lon)| GeoPoint::new(lat, lon).unwrap())
        }

        proptest! {
            #[test]
            fn test_annotate_nearest_has_minimum_distance(
                reference in arb_point(),
                items in prop::collection::vec(arb_point(), 1..20),
            ) {
                let annotated = annotate(reference, &items);
                let flagged: Vec<_> = annotated.iter().filter(|a| a.is_nearest).collect();
                prop_assert_eq!(flagged.len(), 1);

                let min = annotated
                    .iter()
                    .map(|a| a.distance_m)
                    .fold(f64::INFINITY, f64::min);
                prop_assert_eq!(flagged[0].distance_m, min);
            }
        }
    }
}
