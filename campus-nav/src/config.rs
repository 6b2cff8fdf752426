//! INI configuration file.
//!
//! Settings live in `config.ini` under the platform config directory
//! (`~/.config/campus-nav/config.ini` on Linux). A missing file, section, or
//! key falls back to the built-in default.
//!
//! ```ini
//! [navigation]
//! step_advance_m = 50
//! arrival_m = 10
//! off_route_m = 100
//! stale_after_secs = 15
//!
//! [provider]
//! google_api_key = AIza...
//! mode = walking
//! timeout_secs = 30
//!
//! [logging]
//! level = info
//! file = /tmp/campus-nav.log
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;

use crate::navigation::{
    TrackerConfig, DEFAULT_ARRIVAL_M, DEFAULT_OFF_ROUTE_M, DEFAULT_STEP_ADVANCE_M,
};
use crate::route::TravelMode;

/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Seconds without a fix before a session is considered stale (0 disables).
pub const DEFAULT_STALE_AFTER_SECS: u64 = 15;

/// Directions request timeout in seconds.
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

/// Default log level filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// `[navigation]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationSettings {
    pub step_advance_m: f64,
    pub arrival_m: f64,
    pub off_route_m: f64,
    pub stale_after_secs: u64,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            step_advance_m: DEFAULT_STEP_ADVANCE_M,
            arrival_m: DEFAULT_ARRIVAL_M,
            off_route_m: DEFAULT_OFF_ROUTE_M,
            stale_after_secs: DEFAULT_STALE_AFTER_SECS,
        }
    }
}

/// `[provider]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub google_api_key: Option<String>,
    pub mode: TravelMode,
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            google_api_key: None,
            mode: TravelMode::default(),
            timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub navigation: NavigationSettings,
    pub provider: ProviderSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Load from the default location, or defaults if the file is absent.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`, or defaults if the file is absent.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    /// Parse INI text.
    pub fn parse(text: &str) -> ConfigResult<Self> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Read {
            path: PathBuf::from("<string>"),
            message: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> ConfigResult<Self> {
        let mut config = Self::default();
        for key in ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|props| props.get(key.key_name()))
                .map(str::trim);
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Save to the default location, creating the directory if needed.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating parent directories if needed.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        self.to_ini().write_to_file(path).map_err(write_err)?;
        tracing::info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section()))
                    .set(key.key_name(), value);
            }
        }
        ini
    }

    /// Tracker thresholds from the `[navigation]` section.
    pub fn tracker_config(&self) -> ConfigResult<TrackerConfig> {
        let config = TrackerConfig::default()
            .with_step_advance_m(self.navigation.step_advance_m)
            .with_arrival_m(self.navigation.arrival_m)
            .with_off_route_m(self.navigation.off_route_m);
        config
            .validate()
            .map_err(|e| ConfigError::InvalidValue {
                key: format!("navigation.{}", e.name),
                value: e.value.to_string(),
                reason: e.to_string(),
            })?;
        Ok(config)
    }
}

/// Every recognised `section.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    NavigationStepAdvanceM,
    NavigationArrivalM,
    NavigationOffRouteM,
    NavigationStaleAfterSecs,
    ProviderGoogleApiKey,
    ProviderMode,
    ProviderTimeoutSecs,
    LoggingLevel,
    LoggingFile,
}

impl ConfigKey {
    /// All keys in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::NavigationStepAdvanceM,
            ConfigKey::NavigationArrivalM,
            ConfigKey::NavigationOffRouteM,
            ConfigKey::NavigationStaleAfterSecs,
            ConfigKey::ProviderGoogleApiKey,
            ConfigKey::ProviderMode,
            ConfigKey::ProviderTimeoutSecs,
            ConfigKey::LoggingLevel,
            ConfigKey::LoggingFile,
        ]
    }

    /// INI section name.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::NavigationStepAdvanceM
            | ConfigKey::NavigationArrivalM
            | ConfigKey::NavigationOffRouteM
            | ConfigKey::NavigationStaleAfterSecs => "navigation",
            ConfigKey::ProviderGoogleApiKey
            | ConfigKey::ProviderMode
            | ConfigKey::ProviderTimeoutSecs => "provider",
            ConfigKey::LoggingLevel | ConfigKey::LoggingFile => "logging",
        }
    }

    /// Key name within the section.
    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::NavigationStepAdvanceM => "step_advance_m",
            ConfigKey::NavigationArrivalM => "arrival_m",
            ConfigKey::NavigationOffRouteM => "off_route_m",
            ConfigKey::NavigationStaleAfterSecs => "stale_after_secs",
            ConfigKey::ProviderGoogleApiKey => "google_api_key",
            ConfigKey::ProviderMode => "mode",
            ConfigKey::ProviderTimeoutSecs => "timeout_secs",
            ConfigKey::LoggingLevel => "level",
            ConfigKey::LoggingFile => "file",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as text, empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::NavigationStepAdvanceM => config.navigation.step_advance_m.to_string(),
            ConfigKey::NavigationArrivalM => config.navigation.arrival_m.to_string(),
            ConfigKey::NavigationOffRouteM => config.navigation.off_route_m.to_string(),
            ConfigKey::NavigationStaleAfterSecs => config.navigation.stale_after_secs.to_string(),
            ConfigKey::ProviderGoogleApiKey => {
                config.provider.google_api_key.clone().unwrap_or_default()
            }
            ConfigKey::ProviderMode => config.provider.mode.to_string(),
            ConfigKey::ProviderTimeoutSecs => config.provider.timeout_secs.to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingFile => config
                .logging
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Parse `value` and store it.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> ConfigResult<()> {
        match self {
            ConfigKey::NavigationStepAdvanceM => {
                config.navigation.step_advance_m = self.parse_distance(value)?
            }
            ConfigKey::NavigationArrivalM => {
                config.navigation.arrival_m = self.parse_distance(value)?
            }
            ConfigKey::NavigationOffRouteM => {
                config.navigation.off_route_m = self.parse_distance(value)?
            }
            ConfigKey::NavigationStaleAfterSecs => {
                config.navigation.stale_after_secs = self.parse_value(value)?
            }
            ConfigKey::ProviderGoogleApiKey => {
                config.provider.google_api_key =
                    Some(value.trim()).filter(|v| !v.is_empty()).map(String::from)
            }
            ConfigKey::ProviderMode => config.provider.mode = self.parse_value(value)?,
            ConfigKey::ProviderTimeoutSecs => {
                config.provider.timeout_secs = self.parse_value(value)?
            }
            ConfigKey::LoggingLevel => config.logging.level = value.trim().to_string(),
            ConfigKey::LoggingFile => {
                config.logging.file = Some(value.trim())
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
            }
        }
        Ok(())
    }

    fn parse_value<T>(&self, value: &str) -> ConfigResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        value
            .trim()
            .parse()
            .map_err(|e: T::Err| self.invalid(value, e.to_string()))
    }

    fn parse_distance(&self, value: &str) -> ConfigResult<f64> {
        let meters: f64 = self.parse_value(value)?;
        if !meters.is_finite() || meters <= 0.0 {
            return Err(self.invalid(value, "must be a positive distance in meters".to_string()));
        }
        Ok(meters)
    }

    fn invalid(&self, value: &str, reason: String) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason,
        }
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

/// Platform configuration directory for this application.
pub fn config_directory() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("campus-nav")
}

/// Full path of the default configuration file.
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}
