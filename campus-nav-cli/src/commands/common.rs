//! Common types and utilities shared across CLI commands.

use std::path::Path;

use clap::ValueEnum;
use serde::de::DeserializeOwned;

use campus_nav::config::ConfigFile;
use campus_nav::route::TravelMode;

use crate::error::CliError;

/// Travel mode selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum ModeArg {
    /// On foot
    Walking,
    /// By bicycle
    Bicycling,
}

impl From<ModeArg> for TravelMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Walking => TravelMode::Walking,
            ModeArg::Bicycling => TravelMode::Bicycling,
        }
    }
}

/// Resolve the travel mode: CLI takes precedence, then config.
pub fn resolve_mode(cli_mode: Option<ModeArg>, config: &ConfigFile) -> TravelMode {
    cli_mode.map(TravelMode::from).unwrap_or(config.provider.mode)
}

/// Resolve the Directions API key: CLI takes precedence, then config.
pub fn resolve_api_key(cli_key: Option<String>, config: &ConfigFile) -> Result<String, CliError> {
    cli_key
        .filter(|k| !k.trim().is_empty())
        .or_else(|| config.provider.google_api_key.clone())
        .ok_or_else(|| {
            CliError::Config(
                "Google Directions requires an API key. \
                 Set google_api_key in config.ini or use --api-key"
                    .to_string(),
            )
        })
}

/// Read and deserialize a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| CliError::Input {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|e| CliError::Input {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
