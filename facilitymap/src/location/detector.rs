//! Location detector.

use tracing::{debug, info, warn};

use super::platform::GeolocationPlatform;
use super::types::{DetectionState, LocationError, LocationOptions, LocationOutcome};

/// Acquires the user's position, one request at a time.
///
/// Each call to [`detect_location`](Self::detect_location) produces exactly
/// one outcome and never outlives the configured timeout. The detector never
/// retries on its own; retrying is the caller re-invoking it (e.g. a
/// "locate me" action).
pub struct LocationDetector<P: GeolocationPlatform> {
    platform: P,
    options: LocationOptions,
    state: DetectionState,
}

impl<P: GeolocationPlatform> LocationDetector<P> {
    pub fn new(platform: P, options: LocationOptions) -> Self {
        Self {
            platform,
            options,
            state: DetectionState::Idle,
        }
    }

    /// Create a detector with default options (10 s timeout, high accuracy).
    pub fn with_defaults(platform: P) -> Self {
        Self::new(platform, LocationOptions::default())
    }

    pub fn options(&self) -> &LocationOptions {
        &self.options
    }

    /// State of the most recent request.
    pub fn state(&self) -> DetectionState {
        self.state
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Request the user's position once.
    ///
    /// Resolves `NotSupported` immediately, without touching the platform,
    /// when the capability is missing or the context is not secure.
    pub async fn detect_location(&mut self) -> LocationOutcome {
        if !self.platform.is_available() {
            return self.finish(Err(LocationError::NotSupported(
                "no geolocation capability in this runtime".to_string(),
            )));
        }

        if !self.platform.is_secure_context() {
            return self.finish(Err(LocationError::NotSupported(
                "geolocation requires a secure context (HTTPS or localhost)".to_string(),
            )));
        }

        self.state = DetectionState::Pending;
        debug!(
            timeout_ms = self.options.timeout.as_millis() as u64,
            high_accuracy = self.options.high_accuracy,
            "Requesting position"
        );

        let timeout = self.options.timeout;
        let outcome = match tokio::time::timeout(
            timeout,
            self.platform.current_position(&self.options),
        )
        .await
        {
            Ok(Ok(point)) => Ok(point),
            Ok(Err(platform_error)) => Err(LocationError::from_platform(platform_error, timeout)),
            Err(_elapsed) => Err(LocationError::Timeout(timeout)),
        };

        self.finish(outcome)
    }

    fn finish(&mut self, outcome: LocationOutcome) -> LocationOutcome {
        self.state = DetectionState::from_outcome(&outcome);

        match &outcome {
            Ok(point) => info!(position = %point, "Location detected"),
            Err(e) => warn!(kind = %e.kind(), error = %e, "Location detection failed"),
        }

        outcome
    }
}
