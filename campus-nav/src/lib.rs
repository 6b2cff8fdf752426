//! Campus Nav - live turn-by-turn walking navigation
//!
//! This library fetches a route between two campus locations and follows the
//! user's position fixes along it, reporting the current step, distance to
//! the next maneuver, off-route status, and arrival.
//!
//! # Modules
//!
//! - [`geo`] - coordinates, great-circle distance, polyline decoding
//! - [`route`] - route model and the Google Directions provider
//! - [`position`] - position fixes and position sources
//! - [`navigation`] - the tracker state machine and async session
//! - [`config`] - `config.ini` loading and saving
//! - [`logging`] - tracing subscriber setup

pub mod config;
pub mod geo;
pub mod logging;
pub mod navigation;
pub mod position;
pub mod route;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
