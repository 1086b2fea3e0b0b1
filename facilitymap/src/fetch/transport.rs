//! Query transport abstraction for testability

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, trace, warn};

/// Public Overpass API interpreter endpoint.
pub const DEFAULT_OVERPASS_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

/// Transport-level failure, before classification by the fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Could not connect or the request was rejected before a response
    #[error("connection failed: {0}")]
    Connect(String),

    /// The server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The request deadline expired
    #[error("request timed out")]
    Timeout,

    /// The response body could not be read
    #[error("failed to read response: {0}")]
    Body(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_body() || e.is_decode() {
            TransportError::Body(e.to_string())
        } else {
            TransportError::Connect(e.to_string())
        }
    }
}

/// Trait for executing a rendered geodata query.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock transports in tests.
pub trait OverpassTransport: Send + Sync {
    /// Executes a query and returns the raw response body.
    ///
    /// # Arguments
    ///
    /// * `query` - Fully rendered query text
    fn execute(&self, query: &str) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;

    /// Endpoint description for logging.
    fn endpoint(&self) -> &str;
}

/// Overpass transport over HTTP using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl ReqwestTransport {
    /// Creates a transport for the given interpreter endpoint.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("facilitymap/", env!("CARGO_PKG_VERSION")))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(|e| TransportError::Connect(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Creates a transport for [`DEFAULT_OVERPASS_ENDPOINT`].
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        Self::new(DEFAULT_OVERPASS_ENDPOINT, timeout)
    }
}

impl OverpassTransport for ReqwestTransport {
    async fn execute(&self, query: &str) -> Result<Vec<u8>, TransportError> {
        trace!(endpoint = %self.endpoint, query_len = query.len(), "Overpass query starting");

        let response = match self
            .client
            .post(&self.endpoint)
            .form(&[("data", query)])
            .send()
            .await
        {
            Ok(resp) => {
                debug!(
                    endpoint = %self.endpoint,
                    status = resp.status().as_u16(),
                    "Overpass response received"
                );
                resp
            }
            Err(e) => {
                warn!(
                    endpoint = %self.endpoint,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "Overpass request failed"
                );
                return Err(e.into());
            }
        };

        // Check HTTP status
        if !response.status().is_success() {
            warn!(
                endpoint = %self.endpoint,
                status = response.status().as_u16(),
                "Overpass error status"
            );
            return Err(TransportError::Status {
                status: response.status().as_u16(),
                url: self.endpoint.clone(),
            });
        }

        // Read response body
        match response.bytes().await {
            Ok(bytes) => {
                trace!(endpoint = %self.endpoint, bytes = bytes.len(), "Overpass body read");
                Ok(bytes.to_vec())
            }
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "Failed to read Overpass body");
                Err(e.into())
            }
        }
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Mock transport for testing
    pub struct MockTransport {
        pub response: Result<Vec<u8>, TransportError>,
        pub delay: Option<Duration>,
        calls: Arc<AtomicUsize>,
        last_query: Arc<Mutex<Option<String>>>,
    }

    impl MockTransport {
        pub fn new(response: Result<Vec<u8>, TransportError>) -> Self {
            Self {
                response,
                delay: None,
                calls: Arc::new(AtomicUsize::new(0)),
                last_query: Arc::new(Mutex::new(None)),
            }
        }

        pub fn returning(body: &str) -> Self {
            Self::new(Ok(body.as_bytes().to_vec()))
        }

        pub fn failing(error: TransportError) -> Self {
            Self::new(Err(error))
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn calls(&self) -> Arc<AtomicUsize> {
            Arc::clone(&self.calls)
        }

        pub fn last_query(&self) -> Option<String> {
            self.last_query.lock().unwrap().clone()
        }
    }

    impl OverpassTransport for MockTransport {
        async fn execute(&self, query: &str) -> Result<Vec<u8>, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_query.lock().unwrap() = Some(query.to_string());

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            self.response.clone()
        }

        fn endpoint(&self) -> &str {
            "mock://overpass"
        }
    }

    #[tokio::test]
    async fn test_mock_transport_success() {
        let mock = MockTransport::returning(r#"{"elements":[]}"#);

        let result = mock.execute("[out:json];out;").await;
        assert_eq!(result.unwrap(), br#"{"elements":[]}"#.to_vec());
        assert_eq!(mock.last_query().as_deref(), Some("[out:json];out;"));
        assert_eq!(mock.calls().load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_mock_transport_error() {
        let mock = MockTransport::failing(TransportError::Connect("refused".into()));

        let result = mock.execute("query").await;
        assert!(matches!(result, Err(TransportError::Connect(_))));
    }

    #[test]
    fn test_status_error_display() {
        let err = TransportError::Status {
            status: 429,
            url: DEFAULT_OVERPASS_ENDPOINT.to_string(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP 429 from https://overpass-api.de/api/interpreter"
        );
    }

    #[test]
    fn test_reqwest_transport_endpoint() {
        let transport =
            ReqwestTransport::new("https://overpass.example/api/interpreter", Duration::from_secs(5))
                .unwrap();
        assert_eq!(transport.endpoint(), "https://overpass.example/api/interpreter");
    }
}
