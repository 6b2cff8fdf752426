//! Routes returned by a directions provider.
//!
//! A [`Route`] is an ordered list of [`RouteStep`]s plus display strings and
//! the encoded overview polyline. Routes are immutable once returned by a
//! provider and are shared with the navigation tracker via `Arc`.
//!
//! # Wire format
//!
//! Serialized field names follow the web client's JSON shape:
//!
//! ```text
//! { "distance": "0.4 mi", "duration": "8 mins", "overview_polyline": "...",
//!   "steps": [ { "instruction": "Head <b>north</b>", "distance": "190 ft",
//!                "duration": "1 min", "maneuver": "turn-left",
//!                "startLocation": { "lat": .., "lng": .. },
//!                "endLocation": { "lat": .., "lng": .. } } ] }
//! ```

mod http;
mod provider;

pub use http::{HttpClient, ReqwestClient};
pub use provider::{
    GoogleDirectionsProvider, RouteError, RouteProvider, RouteResult, DIRECTIONS_ENDPOINT,
};

#[cfg(test)]
pub use http::tests::MockHttpClient;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::{decode_polyline, LatLng, PolylineError};

/// Matches any inline markup tag in provider instructions.
static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("markup pattern is valid"));

/// Travel mode requested from the directions provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    /// On foot.
    #[default]
    Walking,
    /// By bicycle.
    Bicycling,
}

impl TravelMode {
    /// Provider query parameter value.
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Walking => "walking",
            TravelMode::Bicycling => "bicycling",
        }
    }
}

impl std::fmt::Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unrecognised travel mode name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown travel mode '{0}' (expected walking or bicycling)")]
pub struct ParseTravelModeError(pub String);

impl std::str::FromStr for TravelMode {
    type Err = ParseTravelModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "walking" | "walk" => Ok(TravelMode::Walking),
            "bicycling" | "bike" | "cycling" => Ok(TravelMode::Bicycling),
            other => Err(ParseTravelModeError(other.to_string())),
        }
    }
}

/// One leg of a route with its own instruction and endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStep {
    /// Instruction text, possibly with inline markup (`<b>`, `<div>`).
    pub instruction: String,

    /// Pre-formatted distance for display (e.g. "190 ft").
    #[serde(rename = "distance")]
    pub distance_text: String,

    /// Pre-formatted duration for display (e.g. "1 min").
    #[serde(rename = "duration")]
    pub duration_text: String,

    /// Provider maneuver tag (e.g. "turn-left").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maneuver: Option<String>,

    /// Where the step begins, when the provider supplied it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_location: Option<LatLng>,

    /// Where the step ends, when the provider supplied it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_location: Option<LatLng>,
}

impl RouteStep {
    /// Create a step with instruction and display strings, no coordinates.
    pub fn new(
        instruction: impl Into<String>,
        distance_text: impl Into<String>,
        duration_text: impl Into<String>,
    ) -> Self {
        Self {
            instruction: instruction.into(),
            distance_text: distance_text.into(),
            duration_text: duration_text.into(),
            maneuver: None,
            start_location: None,
            end_location: None,
        }
    }

    /// Set the maneuver tag.
    pub fn with_maneuver(mut self, maneuver: impl Into<String>) -> Self {
        self.maneuver = Some(maneuver.into());
        self
    }

    /// Set the start coordinate.
    pub fn with_start(mut self, start: LatLng) -> Self {
        self.start_location = Some(start);
        self
    }

    /// Set the end coordinate.
    pub fn with_end(mut self, end: LatLng) -> Self {
        self.end_location = Some(end);
        self
    }

    /// Instruction with markup tags removed, for display.
    pub fn display_instruction(&self) -> String {
        strip_markup(&self.instruction)
    }
}

/// A complete route from origin to destination.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Route {
    /// Pre-formatted total distance.
    #[serde(rename = "distance")]
    pub distance_text: String,

    /// Pre-formatted total duration.
    #[serde(rename = "duration")]
    pub duration_text: String,

    /// Ordered steps; may be empty.
    #[serde(default)]
    pub steps: Vec<RouteStep>,

    /// Encoded overview polyline of the whole route.
    #[serde(rename = "overview_polyline", default)]
    pub encoded_overview_polyline: String,
}

impl Route {
    /// Create a route from display strings and steps.
    pub fn new(
        distance_text: impl Into<String>,
        duration_text: impl Into<String>,
        steps: Vec<RouteStep>,
    ) -> Self {
        Self {
            distance_text: distance_text.into(),
            duration_text: duration_text.into(),
            steps,
            encoded_overview_polyline: String::new(),
        }
    }

    /// Set the encoded overview polyline.
    pub fn with_polyline(mut self, encoded: impl Into<String>) -> Self {
        self.encoded_overview_polyline = encoded.into();
        self
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Route has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Index of the final step, if any.
    pub fn last_index(&self) -> Option<usize> {
        self.steps.len().checked_sub(1)
    }

    /// Decode the overview polyline into a coordinate path.
    pub fn overview_path(&self) -> Result<Vec<LatLng>, PolylineError> {
        decode_polyline(&self.encoded_overview_polyline)
    }

    /// Final coordinate of the route, from the last step that has one.
    pub fn destination(&self) -> Option<LatLng> {
        self.steps.iter().rev().find_map(|s| s.end_location)
    }
}

/// Remove every `<...>` tag from provider markup.
pub fn strip_markup(text: &str) -> String {
    MARKUP_TAG.replace_all(text, "").into_owned()
}
