//! Trailing-edge debounce timer.
//!
//! Pan and zoom notifications arrive many times per second during a drag.
//! The debouncer keeps only the latest value and releases it once no newer
//! value has arrived for the configured quiet period.

use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

/// Default quiet period before a settled viewport is released.
pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug)]
struct Pending<T> {
    value: T,
    deadline: Instant,
    /// Values replaced by this one within the same burst.
    superseded: usize,
}

/// Cancelable trailing-edge debounce timer.
///
/// [`push`](Self::push) restarts the quiet period; [`fired`](Self::fired)
/// resolves with the last pushed value once the quiet period elapses.
/// Intermediate values are dropped, not queued.
///
/// `fired` is cancel-safe: dropping the future (e.g. when another
/// `tokio::select!` branch wins) leaves the pending value in place.
///
/// # Example
///
/// ```ignore
/// let mut debouncer = Debouncer::new(Duration::from_millis(300));
/// loop {
///     tokio::select! {
///         Some(bounds) = viewport_rx.recv() => debouncer.push(bounds),
///         bounds = debouncer.fired() => on_settled(bounds).await,
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_DELAY)
    }
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a new value, replacing any pending one and restarting the timer.
    pub fn push(&mut self, value: T) {
        let superseded = self.pending.as_ref().map_or(0, |p| p.superseded + 1);
        self.pending = Some(Pending {
            value,
            deadline: Instant::now() + self.delay,
            superseded,
        });
    }

    /// Drop any pending value without firing. Returns it, if there was one.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    /// Whether a value is waiting for its quiet period to elapse.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Wait for the pending value to settle.
    ///
    /// Never resolves while nothing is pending.
    pub async fn fired(&mut self) -> T {
        let Some(deadline) = self.pending.as_ref().map(|p| p.deadline) else {
            return std::future::pending().await;
        };

        tokio::time::sleep_until(deadline).await;

        // `&mut self` is held across the sleep, so nothing can have taken it.
        let Some(pending) = self.pending.take() else {
            return std::future::pending().await;
        };

        trace!(superseded = pending.superseded, "Debounce window elapsed");
        pending.value
    }
}
