//! Viewport-driven facility synchronization.
//!
//! The [`SyncCoordinator`] owns the per-session state (reference location,
//! per-layer last fetched bounds and displayed sets) and turns location
//! results and settled viewports into fetch cycles. Results flow one way, to
//! a [`RenderSink`], as [`RenderEvent`]s.
//!
//! [`MapSession`] runs a coordinator as a single tokio task: viewport
//! notifications pass through a [`Debouncer`](crate::movement::Debouncer),
//! fetches run concurrently in the background, and stale responses are
//! discarded by generation number.
//!
//! # Example
//!
//! ```ignore
//! let (events_tx, mut events_rx) = tokio::sync::mpsc::unbounded_channel();
//! let coordinator = SyncCoordinator::new(Arc::new(fetcher), events_tx, &SyncConfig::default());
//! let handle = MapSession::new(coordinator, detector, DEFAULT_DEBOUNCE_DELAY).spawn();
//!
//! handle.viewport_changed(bounds);
//! while let Some(event) = events_rx.recv().await {
//!     render(event);
//! }
//! ```

mod coordinator;
mod events;
mod layer;
mod session;

pub use coordinator::{CycleResult, CycleTicket, SyncConfig, SyncCoordinator};
pub use events::{FacilitySet, LocationOrigin, ReferenceSource, RenderEvent, RenderSink};
pub use layer::LayerState;
pub use session::{MapSession, SessionCommand, SessionHandle};
