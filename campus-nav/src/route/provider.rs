//! Directions provider abstraction and the Google Directions implementation.
//!
//! # API
//!
//! The Directions web service is queried with:
//!
//! ```text
//! https://maps.googleapis.com/maps/api/directions/json
//!     ?origin={lat},{lng}&destination={lat},{lng}&mode={walking|bicycling}&key={API_KEY}
//! ```
//!
//! The first route's first leg becomes a [`Route`]. Status codes other than
//! `OK` map onto [`RouteError`] variants so callers can tell "no path exists"
//! apart from "provider is down".

use serde::Deserialize;
use thiserror::Error;

use super::http::HttpClient;
use super::{Route, RouteStep, TravelMode};
use crate::geo::LatLng;

/// Google Directions JSON endpoint.
pub const DIRECTIONS_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/directions/json";

/// Result type for route lookups.
pub type RouteResult<T> = Result<T, RouteError>;

/// Errors from computing a route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The provider found no path between the two points.
    #[error("No route found between these locations")]
    NoRoute,

    /// The origin or destination could not be resolved.
    #[error("One or both locations could not be found")]
    NotFound,

    /// The provider answered with a failure status.
    #[error("Directions request failed: {0}")]
    ProviderFailure(String),

    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The response body was not the expected JSON.
    #[error("Failed to parse directions response: {0}")]
    Parse(String),
}

/// Computes routes between two coordinates.
///
/// Implementations are blocking; async callers should use
/// `tokio::task::spawn_blocking`.
pub trait RouteProvider: Send + Sync {
    /// Compute a route from `origin` to `destination`.
    fn compute_route(
        &self,
        origin: LatLng,
        destination: LatLng,
        mode: TravelMode,
    ) -> RouteResult<Route>;

    /// Human-readable provider name.
    fn name(&self) -> &str;
}

/// Google Directions provider.
///
/// Requires a Google Maps Platform API key with the Directions API enabled.
///
/// # Example
///
/// ```no_run
/// use campus_nav::geo::LatLng;
/// use campus_nav::route::{GoogleDirectionsProvider, ReqwestClient, RouteProvider, TravelMode};
///
/// let client = ReqwestClient::new().unwrap();
/// let provider = GoogleDirectionsProvider::new(client, "YOUR_API_KEY".to_string());
/// let route = provider.compute_route(
///     LatLng::new(39.2540, -76.7110),
///     LatLng::new(39.2560, -76.7120),
///     TravelMode::Walking,
/// );
/// ```
pub struct GoogleDirectionsProvider<C: HttpClient> {
    http_client: C,
    api_key: String,
    endpoint: String,
}

impl<C: HttpClient> GoogleDirectionsProvider<C> {
    /// Creates a provider against the public Directions endpoint.
    pub fn new(http_client: C, api_key: String) -> Self {
        Self {
            http_client,
            api_key,
            endpoint: DIRECTIONS_ENDPOINT.to_string(),
        }
    }

    /// Use a different endpoint (proxies, test servers).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Build the request URL for a lookup.
    fn build_url(
        &self,
        origin: LatLng,
        destination: LatLng,
        mode: TravelMode,
    ) -> RouteResult<String> {
        let origin = format!("{},{}", origin.lat, origin.lng);
        let destination = format!("{},{}", destination.lat, destination.lng);
        let url = reqwest::Url::parse_with_params(
            &self.endpoint,
            &[
                ("origin", origin.as_str()),
                ("destination", destination.as_str()),
                ("mode", mode.as_str()),
                ("key", self.api_key.as_str()),
            ],
        )
        .map_err(|e| RouteError::ProviderFailure(format!("invalid endpoint: {}", e)))?;

        Ok(url.into())
    }
}

impl<C: HttpClient> RouteProvider for GoogleDirectionsProvider<C> {
    fn compute_route(
        &self,
        origin: LatLng,
        destination: LatLng,
        mode: TravelMode,
    ) -> RouteResult<Route> {
        let url = self.build_url(origin, destination, mode)?;

        tracing::debug!(%origin, %destination, %mode, "Requesting directions");

        let body = self.http_client.get(&url)?;
        let route = parse_directions(&body)?;

        tracing::info!(
            steps = route.steps.len(),
            distance = %route.distance_text,
            duration = %route.duration_text,
            %mode,
            "Route computed"
        );

        Ok(route)
    }

    fn name(&self) -> &str {
        "Google Directions"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Response parsing
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    legs: Vec<DirectionsLeg>,
    #[serde(default)]
    overview_polyline: Option<EncodedPolyline>,
}

#[derive(Debug, Deserialize)]
struct EncodedPolyline {
    points: String,
}

#[derive(Debug, Deserialize)]
struct DirectionsLeg {
    distance: TextValue,
    duration: TextValue,
    #[serde(default)]
    steps: Vec<DirectionsStep>,
}

#[derive(Debug, Deserialize)]
struct DirectionsStep {
    #[serde(default)]
    html_instructions: String,
    distance: TextValue,
    duration: TextValue,
    #[serde(default)]
    maneuver: Option<String>,
    #[serde(default)]
    start_location: Option<LatLng>,
    #[serde(default)]
    end_location: Option<LatLng>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    text: String,
}

/// Parse a Directions JSON body into a [`Route`].
fn parse_directions(body: &[u8]) -> RouteResult<Route> {
    let response: DirectionsResponse =
        serde_json::from_slice(body).map_err(|e| RouteError::Parse(e.to_string()))?;

    match response.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" => return Err(RouteError::NoRoute),
        "NOT_FOUND" => return Err(RouteError::NotFound),
        other => {
            let detail = match response.error_message {
                Some(msg) => format!("{} ({})", other, msg),
                None => other.to_string(),
            };
            return Err(RouteError::ProviderFailure(detail));
        }
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or(RouteError::NoRoute)?;
    let polyline = route
        .overview_polyline
        .map(|p| p.points)
        .unwrap_or_default();
    let leg = route.legs.into_iter().next().ok_or(RouteError::NoRoute)?;

    let steps = leg
        .steps
        .into_iter()
        .map(|step| RouteStep {
            instruction: step.html_instructions,
            distance_text: step.distance.text,
            duration_text: step.duration.text,
            maneuver: step.maneuver.filter(|m| !m.is_empty()),
            start_location: step.start_location,
            end_location: step.end_location,
        })
        .collect();

    Ok(Route {
        distance_text: leg.distance.text,
        duration_text: leg.duration.text,
        steps,
        encoded_overview_polyline: polyline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::MockHttpClient;

    const OK_RESPONSE: &str = r#"{
        "status": "OK",
        "routes": [{
            "overview_polyline": { "points": "_p~iF~ps|U_ulLnnqC" },
            "legs": [{
                "distance": { "text": "0.2 mi", "value": 322 },
                "duration": { "text": "4 mins", "value": 240 },
                "steps": [{
                    "html_instructions": "Head <b>north</b> on <b>Hilltop Cir</b>",
                    "distance": { "text": "384 ft", "value": 117 },
                    "duration": { "text": "1 min", "value": 85 },
                    "start_location": { "lat": 39.2540, "lng": -76.7110 },
                    "end_location": { "lat": 39.2550, "lng": -76.7115 }
                }, {
                    "html_instructions": "Turn <b>left</b><div style=\"font-size:0.9em\">Destination will be on the right</div>",
                    "distance": { "text": "0.1 mi", "value": 205 },
                    "duration": { "text": "3 mins", "value": 155 },
                    "maneuver": "turn-left",
                    "start_location": { "lat": 39.2550, "lng": -76.7115 },
                    "end_location": { "lat": 39.2560, "lng": -76.7120 }
                }]
            }]
        }]
    }"#;

    fn provider(mock: MockHttpClient) -> GoogleDirectionsProvider<MockHttpClient> {
        GoogleDirectionsProvider::new(mock, "test-key".to_string())
    }

    fn origin() -> LatLng {
        LatLng::new(39.2540, -76.7110)
    }

    fn destination() -> LatLng {
        LatLng::new(39.2560, -76.7120)
    }

    #[test]
    fn test_compute_route_success() {
        let provider = provider(MockHttpClient::ok(OK_RESPONSE));
        let route = provider
            .compute_route(origin(), destination(), TravelMode::Walking)
            .unwrap();

        assert_eq!(route.distance_text, "0.2 mi");
        assert_eq!(route.duration_text, "4 mins");
        assert_eq!(route.encoded_overview_polyline, "_p~iF~ps|U_ulLnnqC");
        assert_eq!(route.steps.len(), 2);

        let first = &route.steps[0];
        assert_eq!(first.display_instruction(), "Head north on Hilltop Cir");
        assert_eq!(first.distance_text, "384 ft");
        assert!(first.maneuver.is_none());
        assert_eq!(first.end_location, Some(LatLng::new(39.2550, -76.7115)));

        let second = &route.steps[1];
        assert_eq!(second.maneuver.as_deref(), Some("turn-left"));
        assert_eq!(
            second.display_instruction(),
            "Turn leftDestination will be on the right"
        );
    }

    #[test]
    fn test_request_url_parameters() {
        let provider = provider(MockHttpClient::ok(OK_RESPONSE));
        provider
            .compute_route(origin(), destination(), TravelMode::Bicycling)
            .unwrap();

        let url = provider.http_client.last_url().unwrap();
        assert!(url.starts_with(DIRECTIONS_ENDPOINT));
        assert!(url.contains("origin=39.254%2C-76.711"), "url: {}", url);
        assert!(url.contains("destination=39.256%2C-76.712"), "url: {}", url);
        assert!(url.contains("mode=bicycling"));
        assert!(url.contains("key=test-key"));
    }

    #[test]
    fn test_custom_endpoint() {
        let provider = provider(MockHttpClient::ok(OK_RESPONSE))
            .with_endpoint("http://localhost:8080/directions");
        provider
            .compute_route(origin(), destination(), TravelMode::Walking)
            .unwrap();

        let url = provider.http_client.last_url().unwrap();
        assert!(url.starts_with("http://localhost:8080/directions?"));
    }

    #[test]
    fn test_zero_results_maps_to_no_route() {
        let provider = provider(MockHttpClient::ok(
            r#"{ "status": "ZERO_RESULTS", "routes": [] }"#,
        ));
        let err = provider
            .compute_route(origin(), destination(), TravelMode::Walking)
            .unwrap_err();
        assert_eq!(err, RouteError::NoRoute);
    }

    #[test]
    fn test_not_found_status() {
        let provider = provider(MockHttpClient::ok(r#"{ "status": "NOT_FOUND" }"#));
        let err = provider
            .compute_route(origin(), destination(), TravelMode::Walking)
            .unwrap_err();
        assert_eq!(err, RouteError::NotFound);
    }

    #[test]
    fn test_other_status_is_provider_failure() {
        let provider = provider(MockHttpClient::ok(
            r#"{ "status": "REQUEST_DENIED", "error_message": "The provided API key is invalid." }"#,
        ));
        let err = provider
            .compute_route(origin(), destination(), TravelMode::Walking)
            .unwrap_err();
        match err {
            RouteError::ProviderFailure(msg) => {
                assert!(msg.contains("REQUEST_DENIED"));
                assert!(msg.contains("API key is invalid"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_ok_without_routes_is_no_route() {
        let provider = provider(MockHttpClient::ok(r#"{ "status": "OK", "routes": [] }"#));
        let err = provider
            .compute_route(origin(), destination(), TravelMode::Walking)
            .unwrap_err();
        assert_eq!(err, RouteError::NoRoute);
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        let provider = provider(MockHttpClient::ok("<html>not json</html>"));
        let err = provider
            .compute_route(origin(), destination(), TravelMode::Walking)
            .unwrap_err();
        assert!(matches!(err, RouteError::Parse(_)));
    }

    #[test]
    fn test_http_error_propagates() {
        let provider = provider(MockHttpClient::err(RouteError::Http("HTTP 503".into())));
        let err = provider
            .compute_route(origin(), destination(), TravelMode::Walking)
            .unwrap_err();
        assert_eq!(err, RouteError::Http("HTTP 503".into()));
    }

    #[test]
    fn test_steps_without_locations_are_kept() {
        let body = r#"{
            "status": "OK",
            "routes": [{ "legs": [{
                "distance": { "text": "1 ft" },
                "duration": { "text": "1 min" },
                "steps": [{
                    "html_instructions": "Walk",
                    "distance": { "text": "1 ft" },
                    "duration": { "text": "1 min" },
                    "maneuver": ""
                }]
            }]}]
        }"#;
        let provider = provider(MockHttpClient::ok(body));
        let route = provider
            .compute_route(origin(), destination(), TravelMode::Walking)
            .unwrap();
        assert_eq!(route.steps.len(), 1);
        assert!(route.steps[0].start_location.is_none());
        assert!(route.steps[0].maneuver.is_none());
        assert!(route.encoded_overview_polyline.is_empty());
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(provider(MockHttpClient::ok("")).name(), "Google Directions");
    }
}
