//! Relative movement test between two viewports.

use tracing::debug;

use crate::geo::{distance, BoundingBox};

/// Default fraction of the previous viewport diagonal the center must travel.
pub const DEFAULT_MOVEMENT_THRESHOLD: f64 = 0.25;

/// Whether `current` has moved significantly away from `previous`.
///
/// True when the great-circle distance between the two centers is at least
/// `threshold` times the diagonal of `previous`. A degenerate `previous` with
/// zero diagonal counts any nonzero movement as significant.
pub fn has_moved_significantly(previous: &BoundingBox, current: &BoundingBox, threshold: f64) -> bool {
    let moved = distance(previous.center(), current.center());
    let diagonal = previous.diagonal();

    if diagonal == 0.0 {
        return moved > 0.0;
    }

    moved >= threshold * diagonal
}

/// Outcome of one gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateDecision {
    /// Nothing recorded yet; always significant.
    FirstObservation,
    /// The center travelled far enough.
    Moved { moved_m: f64, required_m: f64 },
    /// The center stayed within the threshold.
    Stationary { moved_m: f64, required_m: f64 },
}

impl GateDecision {
    pub fn is_significant(&self) -> bool {
        !matches!(self, GateDecision::Stationary { .. })
    }
}

/// Decides whether a settled viewport warrants a new fetch.
///
/// The gate itself is stateless: callers pass the bounds they last *recorded*
/// (the bounds of the last issued fetch), not the last bounds they observed.
/// Because the recorded bounds only change when the gate fires, a series of
/// small pans cannot creep past the threshold unnoticed.
#[derive(Debug, Clone, Copy)]
pub struct MovementGate {
    threshold: f64,
}

impl Default for MovementGate {
    fn default() -> Self {
        Self::new(DEFAULT_MOVEMENT_THRESHOLD)
    }
}

impl MovementGate {
    /// Create a gate with the given fraction of the viewport diagonal.
    ///
    /// Negative or non-finite thresholds fall back to the default.
    pub fn new(threshold: f64) -> Self {
        let threshold = if threshold.is_finite() && threshold >= 0.0 {
            threshold
        } else {
            DEFAULT_MOVEMENT_THRESHOLD
        };
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Evaluate `current` against the recorded bounds.
    pub fn evaluate(&self, recorded: Option<&BoundingBox>, current: &BoundingBox) -> GateDecision {
        let Some(previous) = recorded else {
            debug!(bounds = %current, "Movement gate: first observation");
            return GateDecision::FirstObservation;
        };

        let moved_m = distance(previous.center(), current.center());
        let required_m = self.threshold * previous.diagonal();
        let significant = has_moved_significantly(previous, current, self.threshold);

        debug!(
            moved_m = moved_m,
            required_m = required_m,
            significant = significant,
            "Movement gate evaluated"
        );

        if significant {
            GateDecision::Moved {
                moved_m,
                required_m,
            }
        } else {
            GateDecision::Stationary {
                moved_m,
                required_m,
            }
        }
    }
}
