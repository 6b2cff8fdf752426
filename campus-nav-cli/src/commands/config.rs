//! Configuration management CLI commands.
//!
//! Provides `config get`, `config set`, `config list`, and `config path`
//! for viewing and modifying settings from the command line.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use campus_nav::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;
use crate::runner::load_config;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., navigation.off_route_m)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., provider.google_api_key)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration settings
    #[command(alias = "show")]
    List,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand against `config_path` or the default file.
pub fn run(command: ConfigCommands, config_path: Option<PathBuf>) -> Result<(), CliError> {
    let path = config_path.unwrap_or_else(config_file_path);
    match command {
        ConfigCommands::Get { key } => run_get(&path, &key),
        ConfigCommands::Set { key, value } => run_set(&path, &key, &value),
        ConfigCommands::List => run_list(&path),
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'campus-nav config list' to see available keys.",
            key
        ))
    })
}

/// Print one configuration value.
fn run_get(path: &Path, key: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;
    let config = load_config(Some(path))?;
    let value = config_key.get(&config);

    if value.is_empty() {
        println!("(not set)");
    } else {
        println!("{}", value);
    }

    Ok(())
}

/// Set one configuration value and save the file.
fn run_set(path: &Path, key: &str, value: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;

    let mut config = load_config(Some(path))?;
    config_key.set(&mut config, value)?;
    config.save_to(path)?;

    println!("Set {} = {}", config_key.name(), value);

    Ok(())
}

/// List every setting grouped by section.
fn run_list(path: &Path) -> Result<(), CliError> {
    let config = load_config(Some(path))?;
    print!("{}", render_settings(&config));
    Ok(())
}

fn render_settings(config: &ConfigFile) -> String {
    let mut out = String::from("Configuration Settings\n======================\n");
    let mut current_section = "";

    for key in ConfigKey::all() {
        let section = key.section();
        if section != current_section {
            out.push_str(&format!("\n[{}]\n", section));
            current_section = section;
        }

        let value = key.get(config);
        let shown = if value.is_empty() {
            "(not set)".to_string()
        } else if *key == ConfigKey::ProviderGoogleApiKey {
            mask_secret(&value)
        } else {
            value
        };
        out.push_str(&format!("  {} = {}\n", key.key_name(), shown));
    }

    out
}

/// Show only the last four characters of a secret.
fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_then_get_round_trips_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        run_set(&path, "navigation.off_route_m", "120").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.navigation.off_route_m, 120.0);
    }

    #[test]
    fn test_set_rejects_unknown_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        let err = run_set(&path, "navigation.speed", "3").unwrap_err();
        assert!(err.to_string().contains("Unknown configuration key"));
        assert!(!path.exists());
    }

    #[test]
    fn test_set_rejects_invalid_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        assert!(run_set(&path, "navigation.arrival_m", "0").is_err());
    }

    #[test]
    fn test_render_masks_api_key() {
        let mut config = ConfigFile::default();
        config.provider.google_api_key = Some("AIzaSecretKey1234".to_string());
        let rendered = render_settings(&config);

        assert!(rendered.contains("[navigation]"));
        assert!(rendered.contains("google_api_key = ****1234"));
        assert!(!rendered.contains("AIzaSecret"));
        assert!(rendered.contains("file = (not set)"));
    }
}
