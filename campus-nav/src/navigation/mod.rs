//! Turn-by-turn navigation along a precomputed route.
//!
//! [`NavigationTracker`] is the synchronous state machine: arm it with a
//! route, feed it position fixes, and it reports the current step, distance
//! to the step's end, off-route status, and edge-triggered events.
//! [`NavigationSession`] drives a tracker from an async position stream.
//!
//! # Example
//!
//! ```
//! use campus_nav::geo::LatLng;
//! use campus_nav::navigation::{NavigationEvent, NavigationTracker, TrackerConfig};
//! use campus_nav::position::PositionSample;
//! use campus_nav::route::{Route, RouteStep};
//!
//! let route = Route::new("0.1 mi", "2 mins", vec![
//!     RouteStep::new("Head north", "364 ft", "1 min")
//!         .with_end(LatLng::new(39.2550, -76.7115)),
//!     RouteStep::new("Turn <b>left</b>", "390 ft", "1 min")
//!         .with_start(LatLng::new(39.2550, -76.7115))
//!         .with_end(LatLng::new(39.2560, -76.7120)),
//! ]);
//!
//! let mut tracker = NavigationTracker::new(TrackerConfig::default());
//! tracker.arm(route);
//!
//! let events = tracker.update(&PositionSample::new(39.2550, -76.7115, 5.0, 0));
//! assert_eq!(events, vec![NavigationEvent::StepAdvanced { index: 1 }]);
//! assert_eq!(tracker.state().current_step_index, 1);
//! ```

mod config;
mod session;
mod tracker;

pub use config::{
    InvalidThreshold, TrackerConfig, DEFAULT_ARRIVAL_M, DEFAULT_OFF_ROUTE_M,
    DEFAULT_STEP_ADVANCE_M,
};
pub use session::{NavigationSession, SessionStatus};
pub use tracker::{EventContext, NavigationEvent, NavigationTracker, TrackerState};
