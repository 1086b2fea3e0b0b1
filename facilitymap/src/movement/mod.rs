//! Viewport movement gating.
//!
//! Viewport changes arrive in bursts while the user drags or zooms. The
//! [`Debouncer`] collapses each burst to its final viewport, and the
//! [`MovementGate`] then decides whether that viewport has moved far enough,
//! relative to its own size, to justify fetching facilities again.
//!
//! Measuring movement relative to the viewport diagonal keeps the trigger
//! meaningful at every zoom level: a 200 m pan is significant in a street view
//! and noise in a country view.

mod debounce;
mod gate;

pub use debounce::{Debouncer, DEFAULT_DEBOUNCE_DELAY};
pub use gate::{has_moved_significantly, GateDecision, MovementGate, DEFAULT_MOVEMENT_THRESHOLD};
