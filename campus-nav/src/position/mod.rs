//! Position fixes and the sources that emit them.
//!
//! A position source (device GPS, browser geolocation, a recorded track)
//! emits [`PositionEvent`]s: either a [`PositionSample`] or a
//! [`PositionError`]. Errors do not end the stream; a later sample may still
//! arrive.

mod source;

pub use source::{PositionSource, ReplayPositionSource};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::LatLng;

/// A single position fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSample {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// 1-sigma accuracy radius in meters.
    #[serde(default)]
    pub accuracy: f64,
    /// Direction of travel in degrees from true north.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    /// Ground speed in meters per second.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Fix time, milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl PositionSample {
    /// Create a sample with explicit timestamp.
    pub fn new(latitude: f64, longitude: f64, accuracy: f64, timestamp: i64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy,
            heading: None,
            speed: None,
            timestamp,
        }
    }

    /// Create a sample stamped with the current wall-clock time.
    pub fn now(latitude: f64, longitude: f64, accuracy: f64) -> Self {
        Self::new(
            latitude,
            longitude,
            accuracy,
            chrono::Utc::now().timestamp_millis(),
        )
    }

    /// Set heading.
    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = Some(heading);
        self
    }

    /// Set speed.
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    /// The fix as a coordinate.
    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }

    /// Latitude and longitude are both finite.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// Error reported by a position source.
///
/// Codes follow the W3C Geolocation API: 1 permission denied, 2 position
/// unavailable, 3 timeout. Code 0 means the platform has no position support.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("position error {code}: {message}")]
pub struct PositionError {
    pub code: i32,
    pub message: String,
}

impl PositionError {
    pub const UNSUPPORTED: i32 = 0;
    pub const PERMISSION_DENIED: i32 = 1;
    pub const POSITION_UNAVAILABLE: i32 = 2;
    pub const TIMEOUT: i32 = 3;

    /// Create an error with code and message.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// One emission from a position source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PositionEvent {
    /// A new fix.
    Sample(PositionSample),
    /// A source-side failure.
    Error(PositionError),
}

impl From<PositionSample> for PositionEvent {
    fn from(sample: PositionSample) -> Self {
        PositionEvent::Sample(sample)
    }
}

impl From<PositionError> for PositionEvent {
    fn from(error: PositionError) -> Self {
        PositionEvent::Error(error)
    }
}
