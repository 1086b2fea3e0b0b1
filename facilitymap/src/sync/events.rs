//! Output contract towards the rendering layer.

use std::fmt;

use tokio::sync::mpsc;
use tracing::trace;

use crate::facility::{AnnotatedFacility, Layer};
use crate::fetch::FetchError;
use crate::geo::{BoundingBox, GeoPoint};
use crate::location::LocationError;

/// How the session's reference location was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationOrigin {
    /// Detected from the user's device or an explicit relocate
    User,
    /// Detection failed; the configured default view is used
    Fallback,
}

impl fmt::Display for LocationOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationOrigin::User => f.write_str("user"),
            LocationOrigin::Fallback => f.write_str("fallback"),
        }
    }
}

/// Which point distances in a [`FacilitySet`] were measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceSource {
    /// The user's location
    User,
    /// The viewport center, because no user location is known
    ViewportCenter,
}

/// Annotated facilities of one layer for one fetch cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct FacilitySet {
    pub layer: Layer,
    /// Point distances were measured from.
    pub reference: GeoPoint,
    pub reference_source: ReferenceSource,
    /// Facilities in source order.
    pub facilities: Vec<AnnotatedFacility>,
}

impl FacilitySet {
    /// The facility flagged nearest, if the set is non-empty.
    pub fn nearest(&self) -> Option<&AnnotatedFacility> {
        self.facilities.iter().find(|f| f.is_nearest)
    }

    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }
}

/// Everything the engine tells the rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    /// Emitted once at initialization and again after each successful relocate.
    LocationResolved {
        origin: LocationOrigin,
        reference: Option<GeoPoint>,
    },
    /// An explicit relocate failed; the current reference is unchanged.
    LocationFailed { error: LocationError },
    /// A fetch cycle produced facilities.
    Facilities(FacilitySet),
    /// A fetch cycle succeeded but the area has no facilities of this layer.
    Empty { layer: Layer, bounds: BoundingBox },
    /// A fetch cycle failed; the previously displayed set is still valid.
    FetchFailed { layer: Layer, error: FetchError },
    /// A layer was disabled and its markers should be removed.
    Cleared { layer: Layer },
}

impl RenderEvent {
    /// Layer the event concerns, if any.
    pub fn layer(&self) -> Option<Layer> {
        match self {
            RenderEvent::Facilities(set) => Some(set.layer),
            RenderEvent::Empty { layer, .. }
            | RenderEvent::FetchFailed { layer, .. }
            | RenderEvent::Cleared { layer } => Some(*layer),
            RenderEvent::LocationResolved { .. } | RenderEvent::LocationFailed { .. } => None,
        }
    }
}

/// Consumer of [`RenderEvent`]s.
pub trait RenderSink: Send {
    fn publish(&mut self, event: RenderEvent);
}

impl RenderSink for mpsc::UnboundedSender<RenderEvent> {
    fn publish(&mut self, event: RenderEvent) {
        if self.send(event).is_err() {
            trace!("Render event dropped: receiver closed");
        }
    }
}

impl RenderSink for Vec<RenderEvent> {
    fn publish(&mut self, event: RenderEvent) {
        self.push(event);
    }
}
