//! Geographic primitives.
//!
//! Provides the coordinate type shared by routes and position samples, the
//! great-circle distance used by the navigation tracker, and decoding of the
//! encoded overview polylines returned by the directions provider.

mod polyline;

pub use polyline::{decode_polyline, PolylineError};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius in meters (spherical approximation).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 coordinate in degrees.
///
/// Field names follow the directions provider wire format (`lat`/`lng`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl LatLng {
    /// Create a new coordinate.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Great-circle distance to another coordinate in meters.
    pub fn distance_to(&self, other: &LatLng) -> f64 {
        distance(self.lat, self.lng, other.lat, other.lng)
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

/// Error parsing a `"lat,lng"` coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseLatLngError {
    #[error("expected 'lat,lng', got '{0}'")]
    MissingSeparator(String),

    #[error("invalid latitude '{0}'")]
    InvalidLatitude(String),

    #[error("invalid longitude '{0}'")]
    InvalidLongitude(String),
}

impl std::str::FromStr for LatLng {
    type Err = ParseLatLngError;

    /// Parse `"lat,lng"` (whitespace around either component is ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| ParseLatLngError::MissingSeparator(s.to_string()))?;
        let (lat, lng) = (lat.trim(), lng.trim());
        let lat: f64 = lat
            .parse()
            .map_err(|_| ParseLatLngError::InvalidLatitude(lat.to_string()))?;
        let lng: f64 = lng
            .parse()
            .map_err(|_| ParseLatLngError::InvalidLongitude(lng.to_string()))?;
        Ok(Self { lat, lng })
    }
}

/// Great-circle distance between two points in meters (haversine).
///
/// Inputs are degrees and are not validated. The coordinate deltas are taken
/// as absolute values so that swapping the two points yields a bit-identical
/// result.
#[inline]
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).abs().to_radians();
    let d_lambda = (lon2 - lon1).abs().to_radians();

    let sin_d_phi = (d_phi / 2.0).sin();
    let sin_d_lambda = (d_lambda / 2.0).sin();

    // Rounding can push `a` a hair above 1 for near-antipodal points
    let a = (sin_d_phi * sin_d_phi + phi1.cos() * phi2.cos() * sin_d_lambda * sin_d_lambda)
        .min(1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}
