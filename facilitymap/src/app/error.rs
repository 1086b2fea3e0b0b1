//! Application error types.

use std::fmt;

use crate::config::ConfigFileError;
use crate::fetch::TransportError;
use crate::location::PlatformError;

/// Errors that can occur while starting the application.
#[derive(Debug)]
pub enum AppError {
    /// The configuration could not be turned into runtime settings.
    Config(ConfigFileError),

    /// Failed to create the Overpass transport.
    Transport(TransportError),

    /// Failed to set up the location source.
    LocationSetup(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
            AppError::Transport(e) => write!(f, "Failed to create Overpass transport: {}", e),
            AppError::LocationSetup(msg) => write!(f, "Failed to set up location source: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(e) => Some(e),
            AppError::Transport(e) => Some(e),
            AppError::LocationSetup(_) => None,
        }
    }
}

impl From<ConfigFileError> for AppError {
    fn from(e: ConfigFileError) -> Self {
        AppError::Config(e)
    }
}

impl From<TransportError> for AppError {
    fn from(e: TransportError) -> Self {
        AppError::Transport(e)
    }
}

impl From<PlatformError> for AppError {
    fn from(e: PlatformError) -> Self {
        let msg = match e {
            PlatformError::PermissionDenied => "permission denied".to_string(),
            PlatformError::Timeout => "timed out".to_string(),
            PlatformError::PositionUnavailable(msg) | PlatformError::Other(msg) => msg,
        };
        AppError::LocationSetup(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_app_error_display() {
        let err = AppError::LocationSetup("no TLS backend".to_string());
        assert!(err.to_string().contains("location source"));
        assert!(err.to_string().contains("no TLS backend"));
    }

    #[test]
    fn test_app_error_from_transport_error() {
        let app_err: AppError = TransportError::Connect("refused".to_string()).into();
        assert!(matches!(app_err, AppError::Transport(_)));
        assert!(app_err.source().is_some());
    }

    #[test]
    fn test_app_error_from_platform_error() {
        let app_err: AppError = PlatformError::Other("bad endpoint".to_string()).into();
        assert!(matches!(app_err, AppError::LocationSetup(ref msg) if msg == "bad endpoint"));
    }
}
