//! Application bootstrap implementation.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use super::config::AppConfig;
use super::error::AppError;
use crate::fetch::{FacilityFetcher, OverpassTransport, ReqwestTransport};
use crate::geo::BoundingBox;
use crate::location::{GeolocationPlatform, LocationDetector, LocationSource};
use crate::sync::{MapSession, RenderEvent, RenderSink, SessionHandle, SyncCoordinator};

/// A running map session and the stream of events it renders.
///
/// # Example
///
/// ```ignore
/// let mut app = FacilityMapApp::start(config, LocationSource::disabled())?;
/// app.handle().viewport_changed(bounds);
///
/// while let Some(event) = app.next_event().await {
///     render(event);
/// }
///
/// app.shutdown().await;
/// ```
pub struct FacilityMapApp {
    handle: SessionHandle,
    events: mpsc::UnboundedReceiver<RenderEvent>,
}

impl FacilityMapApp {
    /// Start a session against the configured Overpass endpoint.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP transport cannot be created.
    pub fn start(config: AppConfig, location: LocationSource) -> Result<Self, AppError> {
        let transport = ReqwestTransport::new(&config.overpass_endpoint, config.overpass_timeout)?;

        info!(
            overpass = %config.overpass_endpoint,
            location = %location.describe(),
            layers = ?config.sync.enabled_layers,
            "Starting facility map session"
        );

        Ok(Self::start_with(&config, transport, location))
    }

    /// Start a session with an explicit transport and location platform.
    pub fn start_with<T, P>(config: &AppConfig, transport: T, platform: P) -> Self
    where
        T: OverpassTransport + 'static,
        P: GeolocationPlatform + 'static,
    {
        let (events_tx, events) = mpsc::unbounded_channel();
        let coordinator = build_coordinator(config, transport, events_tx);
        let detector = LocationDetector::new(platform, config.location.clone());
        let handle =
            MapSession::new(coordinator, detector, config.sync.debounce_delay).spawn();

        Self { handle, events }
    }

    /// Handle for feeding viewport changes and commands into the session.
    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    /// Wait for the next render event. `None` once the session has stopped.
    pub async fn next_event(&mut self) -> Option<RenderEvent> {
        self.events.recv().await
    }

    /// Shut down the session gracefully.
    pub async fn shutdown(self) {
        info!("Shutting down facility map session");
        self.handle.shutdown().await;
        info!("Facility map session shut down");
    }
}

/// Run a single detect-and-fetch pass and return everything it rendered.
///
/// Without `bounds`, every enabled layer is fetched around the detected
/// location (or the fallback view). With `bounds`, the location is still
/// detected for distances but the fetch covers `bounds` instead.
pub async fn scan<T, P>(
    config: &AppConfig,
    transport: T,
    platform: P,
    bounds: Option<BoundingBox>,
) -> Vec<RenderEvent>
where
    T: OverpassTransport,
    P: GeolocationPlatform,
{
    let mut coordinator = build_coordinator(config, transport, Vec::new());
    let mut detector = LocationDetector::new(platform, config.location.clone());

    match bounds {
        None => {
            coordinator.initialize(&mut detector).await;
        }
        Some(bounds) => {
            let outcome = detector.detect_location().await;
            coordinator.resolve_location(outcome);
            coordinator.on_viewport_settled(bounds).await;
        }
    }

    coordinator.into_sink()
}

fn build_coordinator<T, S>(config: &AppConfig, transport: T, sink: S) -> SyncCoordinator<T, S>
where
    T: OverpassTransport,
    S: RenderSink,
{
    let fetcher = FacilityFetcher::with_timeout(transport, config.overpass_timeout);
    SyncCoordinator::new(Arc::new(fetcher), sink, &config.sync)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facility::Layer;
    use crate::fetch::{MockTransport, TransportError};
    use crate::geo::GeoPoint;
    use crate::location::{MockPlatform, PlatformError};
    use crate::sync::LocationOrigin;

    const ONE_FOUNTAIN: &str = r#"{"elements":[
        {"type":"node","id":1,"lat":56.95,"lon":24.105,"tags":{"amenity":"drinking_water"}}
    ]}"#;

    fn riga() -> GeoPoint {
        GeoPoint::new(56.9496, 24.1052).unwrap()
    }

    #[tokio::test]
    async fn test_scan_around_user() {
        let events = scan(
            &AppConfig::default(),
            MockTransport::returning(ONE_FOUNTAIN),
            MockPlatform::granting(riga()),
            None,
        )
        .await;

        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            RenderEvent::LocationResolved {
                origin: LocationOrigin::User,
                reference: Some(riga()),
            }
        );
        let RenderEvent::Facilities(set) = &events[1] else {
            panic!("Expected facilities, got {:?}", events[1]);
        };
        assert_eq!(set.len(), 1);
    }

    #[tokio::test]
    async fn test_scan_explicit_bounds() {
        let bounds = BoundingBox::new(52.5, 13.3, 52.6, 13.5).unwrap();
        let transport = MockTransport::returning(r#"{"elements":[]}"#);
        let config = AppConfig::default().with_enabled_layers(vec![Layer::Water, Layer::Toilets]);

        let events = scan(
            &config,
            transport,
            MockPlatform::failing(PlatformError::PermissionDenied),
            Some(bounds),
        )
        .await;

        assert_eq!(
            &events[1..],
            &[
                RenderEvent::Empty {
                    layer: Layer::Water,
                    bounds,
                },
                RenderEvent::Empty {
                    layer: Layer::Toilets,
                    bounds,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_scan_reports_fetch_failure() {
        let events = scan(
            &AppConfig::default(),
            MockTransport::failing(TransportError::Timeout),
            MockPlatform::granting(riga()),
            None,
        )
        .await;

        assert!(matches!(
            events.last(),
            Some(RenderEvent::FetchFailed {
                layer: Layer::Water,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_started_app_streams_events() {
        let mut app = FacilityMapApp::start_with(
            &AppConfig::default(),
            MockTransport::returning(ONE_FOUNTAIN),
            MockPlatform::granting(riga()),
        );

        assert!(matches!(
            app.next_event().await,
            Some(RenderEvent::LocationResolved {
                origin: LocationOrigin::User,
                ..
            })
        ));
        assert!(matches!(
            app.next_event().await,
            Some(RenderEvent::Facilities(_))
        ));

        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_start_builds_reqwest_transport() {
        let app = FacilityMapApp::start(AppConfig::default(), LocationSource::disabled()).unwrap();

        assert!(!app.handle().is_finished());
        app.shutdown().await;
    }
}
