//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::io;
use std::process;

use facilitymap::app::AppError;
use facilitymap::config::ConfigFileError;
use facilitymap::facility::Layer;
use facilitymap::fetch::FetchError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Config file could not be read or written
    ConfigFile(ConfigFileError),
    /// Invalid command-line argument
    InvalidArgument(String),
    /// Failed to set up the session
    Startup(AppError),
    /// Failed to start the async runtime
    Runtime(io::Error),
    /// Failed to read commands from stdin
    Stdin(io::Error),
    /// Failed to install the Ctrl+C handler
    Signal(String),
    /// A layer could not be fetched during a scan
    Fetch { layer: Layer, error: FetchError },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::Fetch { .. } => {
                eprintln!();
                eprintln!("Common issues:");
                eprintln!("  1. No network connection");
                eprintln!("  2. The public Overpass server is busy: wait a minute and retry");
                eprintln!("  3. Use a mirror: facilitymap config set overpass.endpoint <url>");
            }
            CliError::ConfigFile(ConfigFileError::InvalidValue { section, key, .. }) => {
                eprintln!();
                eprintln!(
                    "Fix it with: facilitymap config set {}.{} <value>",
                    section, key
                );
            }
            CliError::Startup(AppError::LocationSetup(_)) => {
                eprintln!();
                eprintln!("Pass --lat/--lon to give your position, or --no-location to skip detection.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "Configuration error: {}", e),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Startup(e) => write!(f, "Failed to start: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Stdin(e) => write!(f, "Failed to read from stdin: {}", e),
            CliError::Signal(msg) => write!(f, "Failed to set signal handler: {}", msg),
            CliError::Fetch { layer, error } => {
                write!(f, "Could not fetch {} facilities: {}", layer, error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Startup(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::Stdin(e) => Some(e),
            CliError::Fetch { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::Config(e) => CliError::ConfigFile(e),
            other => CliError::Startup(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_app_config_error_unwraps_to_config_file() {
        let err = CliError::from(AppError::Config(ConfigFileError::WriteError(
            "disk full".into(),
        )));

        assert!(matches!(err, CliError::ConfigFile(_)));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_fetch_error_display_names_layer() {
        let err = CliError::Fetch {
            layer: Layer::Toilets,
            error: FetchError::Network("refused".into()),
        };

        assert!(err.to_string().starts_with("Could not fetch toilets facilities"));
        assert!(err.source().is_some());
    }
}
