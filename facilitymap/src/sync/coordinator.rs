//! Sync coordinator.
//!
//! Fetch cycles are split in three so the async part never borrows the
//! coordinator:
//!
//! 1. [`SyncCoordinator::begin_cycle`] records the attempted bounds, bumps the
//!    layer generation and hands out a [`CycleTicket`]
//! 2. [`CycleTicket::execute`] runs the fetch against a shared fetcher
//! 3. [`SyncCoordinator::complete_cycle`] applies the outcome, unless a newer
//!    ticket was issued for the layer or the layer was disabled meanwhile
//!
//! [`SyncCoordinator::run_cycle`] chains the three for callers that do not
//! need overlapping fetches.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, info, warn};

use super::events::{FacilitySet, LocationOrigin, ReferenceSource, RenderEvent, RenderSink};
use super::layer::LayerState;
use crate::config::{DEFAULT_FALLBACK_CENTER, DEFAULT_FALLBACK_SPAN_DEG};
use crate::facility::{FacilityId, Layer};
use crate::fetch::{FacilityFetcher, FetchErrorKind, FetchOutcome, OverpassTransport, QueryTemplate};
use crate::geo::{annotate, BoundingBox, GeoPoint};
use crate::location::{GeolocationPlatform, LocationDetector, LocationOutcome};
use crate::movement::{MovementGate, DEFAULT_DEBOUNCE_DELAY, DEFAULT_MOVEMENT_THRESHOLD};

/// Runtime settings of a sync session.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Fraction of the recorded viewport diagonal the center must travel.
    pub movement_threshold: f64,
    /// Quiet period before a viewport change is evaluated.
    pub debounce_delay: Duration,
    /// Initial view when the user's location is unknown.
    pub fallback_viewport: BoundingBox,
    /// Layers enabled at startup.
    pub enabled_layers: Vec<Layer>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            movement_threshold: DEFAULT_MOVEMENT_THRESHOLD,
            debounce_delay: DEFAULT_DEBOUNCE_DELAY,
            fallback_viewport: BoundingBox::around(
                DEFAULT_FALLBACK_CENTER,
                DEFAULT_FALLBACK_SPAN_DEG,
                DEFAULT_FALLBACK_SPAN_DEG,
            ),
            enabled_layers: vec![Layer::Water],
        }
    }
}

/// One issued fetch, detached from the coordinator while it runs.
#[derive(Debug, Clone)]
pub struct CycleTicket {
    pub layer: Layer,
    pub generation: u64,
    /// Bounds the fetch was issued for.
    pub bounds: BoundingBox,
    /// Point distances will be measured from.
    pub reference: GeoPoint,
    pub reference_source: ReferenceSource,
    template: QueryTemplate,
}

impl CycleTicket {
    /// Run the fetch this ticket stands for.
    pub async fn execute<T: OverpassTransport>(&self, fetcher: &FacilityFetcher<T>) -> FetchOutcome {
        fetcher.fetch_facilities(&self.template, &self.bounds).await
    }
}

/// What [`SyncCoordinator::complete_cycle`] did with an outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleResult {
    /// Facilities were published and are now displayed.
    Displayed {
        count: usize,
        nearest: Option<FacilityId>,
    },
    /// The area is empty; the displayed set was cleared.
    Empty,
    /// The fetch failed; the displayed set was kept.
    Failed(FetchErrorKind),
    /// A newer ticket exists or the layer was disabled; nothing was published.
    Discarded,
}

/// Owns the state of one map session.
pub struct SyncCoordinator<T: OverpassTransport, S: RenderSink> {
    fetcher: Arc<FacilityFetcher<T>>,
    sink: S,
    gate: MovementGate,
    fallback_viewport: BoundingBox,
    viewport: BoundingBox,
    reference: Option<GeoPoint>,
    origin: LocationOrigin,
    layers: [LayerState; 2],
}

impl<T: OverpassTransport, S: RenderSink> SyncCoordinator<T, S> {
    /// Create a coordinator showing the fallback view with no reference location.
    pub fn new(fetcher: Arc<FacilityFetcher<T>>, sink: S, config: &SyncConfig) -> Self {
        let layers = Layer::ALL.map(|layer| {
            LayerState::new(
                QueryTemplate::for_layer(layer),
                config.enabled_layers.contains(&layer),
            )
        });

        Self {
            fetcher,
            sink,
            gate: MovementGate::new(config.movement_threshold),
            fallback_viewport: config.fallback_viewport,
            viewport: config.fallback_viewport,
            reference: None,
            origin: LocationOrigin::Fallback,
            layers,
        }
    }

    /// Replace the query template of the template's layer.
    pub fn with_template(mut self, template: QueryTemplate) -> Self {
        self.layers[template.layer().index()].set_template(template);
        self
    }

    pub fn fetcher(&self) -> &Arc<FacilityFetcher<T>> {
        &self.fetcher
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// The user's location, if known.
    pub fn reference(&self) -> Option<GeoPoint> {
        self.reference
    }

    pub fn origin(&self) -> LocationOrigin {
        self.origin
    }

    /// The most recent viewport the coordinator knows of.
    pub fn viewport(&self) -> &BoundingBox {
        &self.viewport
    }

    pub fn layer(&self, layer: Layer) -> &LayerState {
        &self.layers[layer.index()]
    }

    pub fn enabled_layers(&self) -> Vec<Layer> {
        self.layers
            .iter()
            .filter(|state| state.is_enabled())
            .map(LayerState::layer)
            .collect()
    }

    /// Detect the user's location, publish the origin and fetch every enabled layer.
    pub async fn initialize<P: GeolocationPlatform>(
        &mut self,
        detector: &mut LocationDetector<P>,
    ) -> LocationOrigin {
        let outcome = detector.detect_location().await;
        let tickets = self.apply_location(outcome);
        self.run_tickets(tickets).await;
        self.origin
    }

    /// Apply a detection outcome and begin a cycle per enabled layer.
    pub fn apply_location(&mut self, outcome: LocationOutcome) -> Vec<CycleTicket> {
        self.resolve_location(outcome);
        self.begin_enabled_cycles()
    }

    /// Apply the startup detection outcome and publish the resulting origin.
    ///
    /// A failure is not reported as an error: the session falls back to the
    /// configured view and measures distances from the viewport center. Once
    /// a user location is known a failure no longer clears it.
    pub fn resolve_location(&mut self, outcome: LocationOutcome) -> LocationOrigin {
        match outcome {
            Ok(point) => self.locate_at(point),
            Err(e) if self.reference.is_some() => {
                warn!(reason = %e, kind = %e.kind(), "Location unavailable, keeping known location");
            }
            Err(e) => {
                info!(reason = %e, kind = %e.kind(), "Location unavailable, using fallback view");
                self.reference = None;
                self.origin = LocationOrigin::Fallback;
                self.viewport = self.fallback_viewport;
            }
        }

        self.sink.publish(RenderEvent::LocationResolved {
            origin: self.origin,
            reference: self.reference,
        });

        self.origin
    }

    /// Re-run detection on user request.
    ///
    /// On success the view is re-centered on the user and every enabled layer
    /// is refetched. On failure a notice is published and nothing else changes.
    pub async fn relocate<P: GeolocationPlatform>(
        &mut self,
        detector: &mut LocationDetector<P>,
    ) -> LocationOutcome {
        let outcome = detector.detect_location().await;
        let tickets = self.apply_relocation(outcome.clone());
        self.run_tickets(tickets).await;
        outcome
    }

    /// Apply an explicit relocate outcome.
    pub fn apply_relocation(&mut self, outcome: LocationOutcome) -> Vec<CycleTicket> {
        match outcome {
            Ok(point) => self.apply_location(Ok(point)),
            Err(error) => {
                warn!(error = %error, kind = %error.kind(), "Relocate failed, keeping current location");
                self.sink.publish(RenderEvent::LocationFailed { error });
                Vec::new()
            }
        }
    }

    /// Record a settled viewport and begin cycles for the layers it moved away from.
    pub fn viewport_settled(&mut self, bounds: BoundingBox) -> Vec<CycleTicket> {
        self.viewport = bounds;

        let due: Vec<Layer> = self
            .layers
            .iter()
            .filter(|state| state.is_enabled())
            .filter(|state| {
                self.gate
                    .evaluate(state.last_fetched_bounds(), &bounds)
                    .is_significant()
            })
            .map(LayerState::layer)
            .collect();

        if due.is_empty() {
            debug!(bounds = %bounds, "Viewport settled without significant movement");
        }

        due.into_iter().map(|layer| self.begin_cycle(layer)).collect()
    }

    /// Evaluate a settled viewport and run any resulting cycles to completion.
    pub async fn on_viewport_settled(&mut self, bounds: BoundingBox) -> Vec<CycleResult> {
        let tickets = self.viewport_settled(bounds);
        self.run_tickets(tickets).await
    }

    /// Enable or disable a layer.
    ///
    /// Enabling returns a ticket for an immediate cycle with the current
    /// viewport. Disabling clears the displayed set but keeps the layer's last
    /// fetched bounds. Setting a layer to its current state does nothing.
    pub fn set_layer_enabled(&mut self, layer: Layer, enabled: bool) -> Option<CycleTicket> {
        let state = &mut self.layers[layer.index()];
        if state.is_enabled() == enabled {
            return None;
        }

        if enabled {
            info!(layer = %layer, "Layer enabled");
            state.enable();
            Some(self.begin_cycle(layer))
        } else {
            info!(layer = %layer, "Layer disabled");
            state.disable();
            self.sink.publish(RenderEvent::Cleared { layer });
            None
        }
    }

    /// Issue a fetch for `layer` over the current viewport.
    ///
    /// The viewport becomes the layer's last fetched bounds immediately,
    /// whatever the outcome of the fetch turns out to be.
    pub fn begin_cycle(&mut self, layer: Layer) -> CycleTicket {
        let bounds = self.viewport;
        let (reference, reference_source) = match self.reference {
            Some(point) => (point, ReferenceSource::User),
            None => (bounds.center(), ReferenceSource::ViewportCenter),
        };

        let state = &mut self.layers[layer.index()];
        let generation = state.issue(bounds);

        debug!(
            layer = %layer,
            generation = generation,
            bounds = %bounds,
            reference = %reference,
            "Fetch cycle started"
        );

        CycleTicket {
            layer,
            generation,
            bounds,
            reference,
            reference_source,
            template: state.template().clone(),
        }
    }

    /// Apply the outcome of a ticket's fetch and publish the result.
    pub fn complete_cycle(&mut self, ticket: CycleTicket, outcome: FetchOutcome) -> CycleResult {
        let layer = ticket.layer;
        let state = &mut self.layers[layer.index()];

        if !state.accepts(ticket.generation) {
            debug!(
                layer = %layer,
                generation = ticket.generation,
                latest = state.generation(),
                enabled = state.is_enabled(),
                "Discarding stale fetch result"
            );
            return CycleResult::Discarded;
        }

        match outcome {
            Err(error) => {
                warn!(layer = %layer, error = %error, "Fetch cycle failed, keeping displayed facilities");
                let kind = error.kind();
                self.sink.publish(RenderEvent::FetchFailed { layer, error });
                CycleResult::Failed(kind)
            }
            Ok(facilities) if facilities.is_empty() => {
                info!(layer = %layer, bounds = %ticket.bounds, "No facilities in view");
                state.clear();
                self.sink.publish(RenderEvent::Empty {
                    layer,
                    bounds: ticket.bounds,
                });
                CycleResult::Empty
            }
            Ok(facilities) => {
                let set = FacilitySet {
                    layer,
                    reference: ticket.reference,
                    reference_source: ticket.reference_source,
                    facilities: annotate(ticket.reference, &facilities),
                };
                let count = set.len();
                let nearest = set.nearest().map(|f| f.item.id);

                info!(
                    layer = %layer,
                    count = count,
                    nearest = ?nearest,
                    "Facilities updated"
                );

                state.display(set.clone());
                self.sink.publish(RenderEvent::Facilities(set));
                CycleResult::Displayed { count, nearest }
            }
        }
    }

    /// Begin, execute and complete one cycle for `layer`.
    pub async fn run_cycle(&mut self, layer: Layer) -> CycleResult {
        let ticket = self.begin_cycle(layer);
        let outcome = ticket.execute(&self.fetcher).await;
        self.complete_cycle(ticket, outcome)
    }

    fn locate_at(&mut self, point: GeoPoint) {
        info!(location = %point, "User location set");
        self.reference = Some(point);
        self.origin = LocationOrigin::User;
        self.viewport = BoundingBox::around(
            point,
            self.fallback_viewport.north() - self.fallback_viewport.south(),
            self.fallback_viewport.east() - self.fallback_viewport.west(),
        );
    }

    fn begin_enabled_cycles(&mut self) -> Vec<CycleTicket> {
        self.enabled_layers()
            .into_iter()
            .map(|layer| self.begin_cycle(layer))
            .collect()
    }

    /// Execute tickets concurrently and complete them in issue order.
    async fn run_tickets(&mut self, tickets: Vec<CycleTicket>) -> Vec<CycleResult> {
        let fetcher = Arc::clone(&self.fetcher);
        let outcomes = join_all(tickets.iter().map(|ticket| ticket.execute(&fetcher))).await;

        tickets
            .into_iter()
            .zip(outcomes)
            .map(|(ticket, outcome)| self.complete_cycle(ticket, outcome))
            .collect()
    }
}
