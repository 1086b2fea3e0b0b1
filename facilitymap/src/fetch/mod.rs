//! Facility fetching for a bounding box.
//!
//! A [`QueryTemplate`] is rendered for the current viewport, sent through an
//! [`OverpassTransport`], and the response is parsed into [`Facility`]
//! values. Every failure is classified into one of three kinds
//! ([`FetchErrorKind`]) so the sync engine can report it without caring about
//! transport details.
//!
//! # Example
//!
//! ```ignore
//! use facilitymap::fetch::{FacilityFetcher, QueryTemplate, ReqwestTransport};
//! use facilitymap::facility::Layer;
//!
//! let transport = ReqwestTransport::new(DEFAULT_OVERPASS_ENDPOINT, Duration::from_secs(30))?;
//! let fetcher = FacilityFetcher::new(transport);
//! let outcome = fetcher
//!     .fetch_facilities(&QueryTemplate::for_layer(Layer::Water), &bounds)
//!     .await;
//! ```
//!
//! [`Facility`]: crate::facility::Facility

mod error;
mod fetcher;
mod overpass;
mod query;
mod transport;

pub use error::{FetchError, FetchErrorKind, FetchOutcome};
pub use fetcher::{FacilityFetcher, DEFAULT_REQUEST_TIMEOUT};
pub use overpass::parse_overpass_response;
pub use query::{QueryError, QueryTemplate, BBOX_PLACEHOLDER};
pub use transport::{
    OverpassTransport, ReqwestTransport, TransportError, DEFAULT_OVERPASS_ENDPOINT,
};

#[cfg(test)]
pub use transport::tests::MockTransport;
