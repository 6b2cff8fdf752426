//! Shared command setup: configuration and logging.

use std::path::Path;

use campus_nav::config::ConfigFile;
use campus_nav::logging::{init_logging, LoggingGuard};

use crate::error::CliError;

/// Loaded configuration plus the logging guard for one command run.
pub struct CliRunner {
    config: ConfigFile,
    _logging: LoggingGuard,
}

impl CliRunner {
    /// Load configuration (from `config_path` or the default location) and
    /// install logging.
    pub fn new(config_path: Option<&Path>, verbosity: u8) -> Result<Self, CliError> {
        let config = load_config(config_path)?;
        let logging = init_logging(&config.logging, verbosity)?;
        Ok(Self {
            config,
            _logging: logging,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log the command being run.
    pub fn log_startup(&self, command: &str) {
        tracing::info!(version = campus_nav::VERSION, command, "campus-nav starting");
    }
}

/// Load configuration from an explicit path or the default location.
pub fn load_config(config_path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let config = match config_path {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    Ok(config)
}
