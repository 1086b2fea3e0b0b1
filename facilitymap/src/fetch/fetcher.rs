//! Facility fetcher.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::error::{FetchError, FetchOutcome};
use super::overpass::parse_overpass_response;
use super::query::QueryTemplate;
use super::transport::{OverpassTransport, TransportError};
use crate::geo::BoundingBox;

/// Default deadline for a single fetch.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches the facilities inside a bounding box.
///
/// Issues exactly one request per call and never retries; retry policy belongs
/// to whoever triggers the next fetch.
pub struct FacilityFetcher<T: OverpassTransport> {
    transport: T,
    request_timeout: Duration,
}

impl<T: OverpassTransport> FacilityFetcher<T> {
    pub fn new(transport: T) -> Self {
        Self::with_timeout(transport, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a fetcher with a custom per-request deadline.
    pub fn with_timeout(transport: T, request_timeout: Duration) -> Self {
        Self {
            transport,
            request_timeout,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch the facilities matching `template` inside `bounds`.
    ///
    /// Facilities come back in the order the data source supplied them.
    pub async fn fetch_facilities(
        &self,
        template: &QueryTemplate,
        bounds: &BoundingBox,
    ) -> FetchOutcome {
        let layer = template.layer();
        let query = template.render(bounds);

        debug!(
            layer = %layer,
            bounds = %bounds,
            endpoint = self.transport.endpoint(),
            "Fetching facilities"
        );

        let body = match tokio::time::timeout(self.request_timeout, self.transport.execute(&query))
            .await
        {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => return Err(self.classify(e)),
            Err(_elapsed) => {
                warn!(layer = %layer, timeout = ?self.request_timeout, "Facility fetch timed out");
                return Err(FetchError::Timeout(self.request_timeout));
            }
        };

        let facilities = parse_overpass_response(&body, layer, self.request_timeout)
            .inspect_err(|e| warn!(layer = %layer, error = %e, "Facility response rejected"))?;

        info!(layer = %layer, count = facilities.len(), "Facilities fetched");
        Ok(facilities)
    }

    fn classify(&self, error: TransportError) -> FetchError {
        warn!(error = %error, "Facility transport failed");
        match error {
            TransportError::Timeout => FetchError::Timeout(self.request_timeout),
            TransportError::Connect(_) | TransportError::Status { .. } | TransportError::Body(_) => {
                FetchError::Network(error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facility::{FacilityId, Layer};
    use crate::fetch::{FetchErrorKind, MockTransport};

    fn viewport() -> BoundingBox {
        BoundingBox::new(56.9, 24.0, 57.0, 24.2).unwrap()
    }

    const TWO_FOUNTAINS: &str = r#"{"elements":[
        {"type":"node","id":1,"lat":56.95,"lon":24.105,"tags":{"amenity":"drinking_water"}},
        {"type":"node","id":2,"lat":56.9,"lon":24.0,"tags":{"amenity":"drinking_water"}}
    ]}"#;

    #[tokio::test]
    async fn test_fetch_success() {
        let fetcher = FacilityFetcher::new(MockTransport::returning(TWO_FOUNTAINS));

        let facilities = fetcher
            .fetch_facilities(&QueryTemplate::for_layer(Layer::Water), &viewport())
            .await
            .unwrap();

        assert_eq!(facilities.len(), 2);
        assert_eq!(facilities[0].id, FacilityId::node(1));
        assert_eq!(facilities[0].layer(), Layer::Water);
    }

    #[tokio::test]
    async fn test_fetch_sends_rendered_bounds() {
        let fetcher = FacilityFetcher::new(MockTransport::returning(r#"{"elements":[]}"#));

        fetcher
            .fetch_facilities(&QueryTemplate::for_layer(Layer::Water), &viewport())
            .await
            .unwrap();

        let query = fetcher.transport().last_query().unwrap();
        assert!(query.contains("(56.9,24,57,24.2)"));
    }

    #[tokio::test]
    async fn test_fetch_empty_is_success() {
        let fetcher = FacilityFetcher::new(MockTransport::returning(r#"{"elements":[]}"#));

        let outcome = fetcher
            .fetch_facilities(&QueryTemplate::for_layer(Layer::Toilets), &viewport())
            .await;

        assert_eq!(outcome, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn test_transport_timeout_is_timeout() {
        let fetcher = FacilityFetcher::new(MockTransport::failing(TransportError::Timeout));

        let outcome = fetcher
            .fetch_facilities(&QueryTemplate::for_layer(Layer::Water), &viewport())
            .await;

        assert_eq!(outcome.unwrap_err().kind(), FetchErrorKind::Timeout);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_transport_hits_deadline() {
        let transport =
            MockTransport::returning(TWO_FOUNTAINS).with_delay(Duration::from_secs(120));
        let fetcher = FacilityFetcher::with_timeout(transport, Duration::from_secs(5));

        let outcome = fetcher
            .fetch_facilities(&QueryTemplate::for_layer(Layer::Water), &viewport())
            .await;

        assert_eq!(outcome, Err(FetchError::Timeout(Duration::from_secs(5))));
    }

    #[tokio::test]
    async fn test_connection_failure_is_network() {
        let fetcher =
            FacilityFetcher::new(MockTransport::failing(TransportError::Connect("refused".into())));

        let outcome = fetcher
            .fetch_facilities(&QueryTemplate::for_layer(Layer::Water), &viewport())
            .await;

        match outcome {
            Err(FetchError::Network(msg)) => assert!(msg.contains("refused")),
            other => panic!("Expected network error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_network() {
        let fetcher = FacilityFetcher::new(MockTransport::failing(TransportError::Status {
            status: 504,
            url: "mock://overpass".into(),
        }));

        let outcome = fetcher
            .fetch_facilities(&QueryTemplate::for_layer(Layer::Water), &viewport())
            .await;

        assert_eq!(outcome.unwrap_err().kind(), FetchErrorKind::Network);
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse() {
        let fetcher = FacilityFetcher::new(MockTransport::returning("{\"elements\": [oops"));

        let outcome = fetcher
            .fetch_facilities(&QueryTemplate::for_layer(Layer::Water), &viewport())
            .await;

        assert_eq!(outcome.unwrap_err().kind(), FetchErrorKind::Parse);
    }

    #[tokio::test]
    async fn test_no_retry_on_failure() {
        let transport = MockTransport::failing(TransportError::Connect("refused".into()));
        let calls = transport.calls();
        let fetcher = FacilityFetcher::new(transport);

        let _ = fetcher
            .fetch_facilities(&QueryTemplate::for_layer(Layer::Water), &viewport())
            .await;

        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
