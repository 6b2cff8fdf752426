//! Live navigation tracking.
//!
//! Follows a user's position fixes along a precomputed [`Route`] and derives
//! which step is current, how far the current step's end is, and whether the
//! user has strayed from the route.
//!
//! # State Machine
//!
//! ```text
//! Disarmed --arm(route)--> Armed{step 0, distance unknown, on route}
//! Armed    --arm(route)--> Armed (state reset for the new route)
//! Armed    --disarm()---> Disarmed
//! ```
//!
//! While armed, each [`NavigationTracker::update`] evaluates, in order:
//!
//! 1. **Advance**: closer than `step_advance_m` to the current step's end and
//!    not on the last step: move to the next step (at most one per update).
//! 2. **Arrival**: already on the last step and closer than `arrival_m` to
//!    its end: destination reached (once per arming).
//! 3. **Off route**: farther than `off_route_m` from both the current step's
//!    start and end. Entering emits an event, leaving clears the flag
//!    silently.
//!
//! Events are delivered synchronously to the registered callbacks inside
//! `update`, in the order above. The tracker takes no locks; hosts sharing it
//! across threads wrap it in a mutex.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::config::TrackerConfig;
use crate::geo::LatLng;
use crate::position::PositionSample;
use crate::route::{Route, RouteStep};

/// Observable tracker state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerState {
    /// Index of the step the user is on.
    pub current_step_index: usize,

    /// Meters from the last evaluated fix to the current step's end.
    ///
    /// `None` until a fix has been evaluated against a step with an end.
    pub distance_to_next_step_end: Option<f64>,

    /// User is far from both ends of the current step.
    pub is_off_route: bool,
}

/// Edge-triggered tracker events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum NavigationEvent {
    /// The current step changed to the given index.
    StepAdvanced { index: usize },
    /// The user moved off the route.
    OffRouteEntered,
    /// The user reached the end of the final step.
    DestinationReached,
}

impl std::fmt::Display for NavigationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NavigationEvent::StepAdvanced { index } => write!(f, "step advanced to {}", index),
            NavigationEvent::OffRouteEntered => write!(f, "off route"),
            NavigationEvent::DestinationReached => write!(f, "destination reached"),
        }
    }
}

/// Handle passed to event callbacks.
///
/// The tracker is mutably borrowed while callbacks run, so a callback that
/// wants to stop navigation calls [`EventContext::disarm`] instead. The
/// tracker disarms as soon as the callback returns and delivers nothing
/// further for that update.
#[derive(Debug, Default)]
pub struct EventContext {
    disarm_requested: bool,
}

impl EventContext {
    /// Request that the tracker disarm after this callback.
    pub fn disarm(&mut self) {
        self.disarm_requested = true;
    }

    /// Whether a disarm has been requested.
    pub fn disarm_requested(&self) -> bool {
        self.disarm_requested
    }
}

type StepAdvancedCallback = Box<dyn FnMut(usize, &mut EventContext) + Send>;
type SignalCallback = Box<dyn FnMut(&mut EventContext) + Send>;

#[derive(Default)]
struct Callbacks {
    step_advanced: Vec<StepAdvancedCallback>,
    off_route_entered: Vec<SignalCallback>,
    destination_reached: Vec<SignalCallback>,
}

/// Per-arming state.
#[derive(Debug)]
struct ArmedSession {
    route: Arc<Route>,
    state: TrackerState,
    /// Last index a step-advance event was raised for.
    previous_step_index: usize,
    /// Destination event already raised for this arming.
    arrived: bool,
}

impl ArmedSession {
    fn new(route: Arc<Route>) -> Self {
        Self {
            route,
            state: TrackerState::default(),
            previous_step_index: 0,
            arrived: false,
        }
    }
}

#[derive(Debug)]
enum Mode {
    Disarmed,
    Armed(ArmedSession),
}

/// Follows position fixes along a route and raises navigation events.
///
/// # Usage
///
/// ```ignore
/// let mut tracker = NavigationTracker::new(TrackerConfig::default());
/// tracker.on_step_advanced(|index, _| println!("Now on step {}", index));
/// tracker.on_destination_reached(|ctx| ctx.disarm());
///
/// tracker.arm(route);
/// for sample in fixes {
///     tracker.update(&sample);
/// }
/// ```
pub struct NavigationTracker {
    config: TrackerConfig,
    mode: Mode,
    callbacks: Callbacks,
}

impl std::fmt::Debug for NavigationTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationTracker")
            .field("config", &self.config)
            .field("armed", &self.is_armed())
            .field("state", &self.state())
            .finish()
    }
}

impl Default for NavigationTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl NavigationTracker {
    /// Create a disarmed tracker.
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            mode: Mode::Disarmed,
            callbacks: Callbacks::default(),
        }
    }

    /// Thresholds in use.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Start following `route`, resetting all progress.
    ///
    /// Arming while already armed switches to the new route. A route with no
    /// steps arms normally but every update is ignored.
    pub fn arm(&mut self, route: impl Into<Arc<Route>>) {
        let route = route.into();
        tracing::info!(
            steps = route.steps.len(),
            distance = %route.distance_text,
            "Navigation armed"
        );
        self.mode = Mode::Armed(ArmedSession::new(route));
    }

    /// Stop following the route and discard progress. Idempotent.
    pub fn disarm(&mut self) {
        if let Mode::Armed(session) = &self.mode {
            tracing::info!(
                step = session.state.current_step_index,
                "Navigation disarmed"
            );
        }
        self.mode = Mode::Disarmed;
    }

    /// Whether a route is being followed.
    pub fn is_armed(&self) -> bool {
        matches!(self.mode, Mode::Armed(_))
    }

    /// Current state; reset values while disarmed.
    pub fn state(&self) -> TrackerState {
        match &self.mode {
            Mode::Armed(session) => session.state,
            Mode::Disarmed => TrackerState::default(),
        }
    }

    /// The route being followed.
    pub fn route(&self) -> Option<&Arc<Route>> {
        match &self.mode {
            Mode::Armed(session) => Some(&session.route),
            Mode::Disarmed => None,
        }
    }

    /// The step the user is on.
    pub fn current_step(&self) -> Option<&RouteStep> {
        match &self.mode {
            Mode::Armed(session) => session.route.steps.get(session.state.current_step_index),
            Mode::Disarmed => None,
        }
    }

    /// Register a callback for step changes; receives the new index.
    pub fn on_step_advanced<F>(&mut self, callback: F)
    where
        F: FnMut(usize, &mut EventContext) + Send + 'static,
    {
        self.callbacks.step_advanced.push(Box::new(callback));
    }

    /// Register a callback for leaving the route.
    pub fn on_off_route_entered<F>(&mut self, callback: F)
    where
        F: FnMut(&mut EventContext) + Send + 'static,
    {
        self.callbacks.off_route_entered.push(Box::new(callback));
    }

    /// Register a callback for arriving at the destination.
    pub fn on_destination_reached<F>(&mut self, callback: F)
    where
        F: FnMut(&mut EventContext) + Send + 'static,
    {
        self.callbacks.destination_reached.push(Box::new(callback));
    }

    /// Evaluate a position fix.
    ///
    /// Returns the events delivered during this call, in delivery order.
    /// Ignored (empty result, no state change) when disarmed, when the route
    /// has no steps, when the fix has non-finite coordinates, or when the
    /// current step has no end coordinate.
    pub fn update(&mut self, sample: &PositionSample) -> Vec<NavigationEvent> {
        let pending = self.evaluate(sample);
        if pending.is_empty() {
            return pending;
        }
        self.dispatch(pending)
    }

    /// Apply a fix to the armed state, returning events to deliver.
    fn evaluate(&mut self, sample: &PositionSample) -> Vec<NavigationEvent> {
        let mut pending = Vec::new();

        let Mode::Armed(session) = &mut self.mode else {
            return pending;
        };
        let Some(last_index) = session.route.last_index() else {
            return pending;
        };
        if !sample.is_valid() {
            tracing::debug!(
                lat = sample.latitude,
                lon = sample.longitude,
                "Ignoring non-finite position fix"
            );
            return pending;
        }

        let index = session.state.current_step_index;
        let step = &session.route.steps[index];
        let Some(end) = step.end_location.filter(LatLng::is_finite) else {
            tracing::debug!(step = index, "Current step has no end location, skipping fix");
            return pending;
        };
        let start = step.start_location.filter(LatLng::is_finite);

        let position = sample.position();
        let distance_to_end = position.distance_to(&end);
        session.state.distance_to_next_step_end = Some(distance_to_end);

        tracing::trace!(
            step = index,
            distance_m = distance_to_end,
            accuracy_m = sample.accuracy,
            "Position evaluated"
        );

        if distance_to_end < self.config.step_advance_m && index < last_index {
            let next = index + 1;
            session.state.current_step_index = next;
            if next != session.previous_step_index {
                pending.push(NavigationEvent::StepAdvanced { index: next });
            }
            session.previous_step_index = next;
        } else if index == last_index
            && distance_to_end < self.config.arrival_m
            && !session.arrived
        {
            session.arrived = true;
            pending.push(NavigationEvent::DestinationReached);
        }

        if let Some(start) = start {
            let distance_to_start = position.distance_to(&start);
            let off_route = distance_to_start > self.config.off_route_m
                && distance_to_end > self.config.off_route_m;

            if off_route && !session.state.is_off_route {
                session.state.is_off_route = true;
                pending.push(NavigationEvent::OffRouteEntered);
            } else if !off_route && session.state.is_off_route {
                session.state.is_off_route = false;
                tracing::debug!(
                    step = index,
                    distance_to_start_m = distance_to_start,
                    distance_to_end_m = distance_to_end,
                    "Back on route"
                );
            }
        }

        pending
    }

    /// Deliver events to callbacks, honouring disarm requests.
    fn dispatch(&mut self, pending: Vec<NavigationEvent>) -> Vec<NavigationEvent> {
        let mut delivered = Vec::with_capacity(pending.len());
        let mut ctx = EventContext::default();
        let distance_m = self.state().distance_to_next_step_end;

        for event in pending {
            match event {
                NavigationEvent::StepAdvanced { index } => {
                    tracing::info!(step = index, ?distance_m, "Step advanced");
                    for callback in self.callbacks.step_advanced.iter_mut() {
                        callback(index, &mut ctx);
                        if ctx.disarm_requested {
                            break;
                        }
                    }
                }
                NavigationEvent::OffRouteEntered => {
                    tracing::info!(?distance_m, "Off route");
                    for callback in self.callbacks.off_route_entered.iter_mut() {
                        callback(&mut ctx);
                        if ctx.disarm_requested {
                            break;
                        }
                    }
                }
                NavigationEvent::DestinationReached => {
                    tracing::info!(?distance_m, "Destination reached");
                    for callback in self.callbacks.destination_reached.iter_mut() {
                        callback(&mut ctx);
                        if ctx.disarm_requested {
                            break;
                        }
                    }
                }
            }
            delivered.push(event);

            if ctx.disarm_requested {
                self.disarm();
                break;
            }
        }

        delivered
    }
}
