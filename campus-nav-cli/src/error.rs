//! CLI error type.

use std::fmt;
use std::path::PathBuf;

use campus_nav::config::ConfigError;
use campus_nav::logging::LoggingError;
use campus_nav::route::RouteError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Missing or inconsistent settings.
    Config(String),

    /// The configuration file could not be loaded or saved.
    ConfigFile(ConfigError),

    /// Logging could not be initialised.
    Logging(LoggingError),

    /// Route lookup failed.
    Route(RouteError),

    /// An input file could not be read or parsed.
    Input { path: PathBuf, message: String },

    /// Failed to create the Tokio runtime or a task failed.
    Runtime(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "Configuration file error: {}", e),
            CliError::Logging(e) => write!(f, "Logging error: {}", e),
            CliError::Route(e) => write!(f, "{}", e),
            CliError::Input { path, message } => {
                write!(f, "Failed to read {}: {}", path.display(), message)
            }
            CliError::Runtime(msg) => write!(f, "Runtime error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Route(e) => Some(e),
            CliError::Config(_) | CliError::Input { .. } | CliError::Runtime(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<RouteError> for CliError {
    fn from(e: RouteError) -> Self {
        CliError::Route(e)
    }
}
