//! Async driver that feeds a position stream into a tracker.
//!
//! # Architecture
//!
//! ```text
//! PositionSource ──mpsc──► NavigationSession task ──► NavigationTracker (Mutex)
//!                                  │                          │
//!                                  │                    NavigationEvent
//!                                  ▼                          ▼
//!                           SessionStatus              broadcast channel
//! ```
//!
//! The session owns the tracker behind a mutex so the UI side can arm,
//! disarm and read state while the task applies fixes. Position errors are
//! logged and counted; they never stop the loop. With a stale-fix timeout
//! configured, a gap between fixes longer than the timeout marks the session
//! stale until the next fix arrives.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::tracker::{NavigationEvent, NavigationTracker, TrackerState};
use crate::position::{PositionError, PositionEvent};
use crate::route::Route;

/// Capacity of the navigation event broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Point-in-time view of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    /// Tracker state (reset values while disarmed).
    pub state: TrackerState,
    /// Whether a route is being followed.
    pub armed: bool,
    /// Position fixes handed to the tracker.
    pub samples_processed: u64,
    /// Position errors received from the source.
    pub errors_seen: u64,
    /// Most recent position error.
    pub last_error: Option<PositionError>,
    /// No fix within the stale timeout.
    pub stale: bool,
}

/// Counters shared between the session handle and its task.
#[derive(Debug, Default)]
struct SessionStats {
    samples_processed: AtomicU64,
    errors_seen: AtomicU64,
    stale: AtomicBool,
    last_error: Mutex<Option<PositionError>>,
}

/// Drives a [`NavigationTracker`] from a channel of position events.
///
/// Cheap to clone; clones share the same tracker and counters.
///
/// # Example
///
/// ```ignore
/// let session = NavigationSession::new(NavigationTracker::default())
///     .with_stale_after(Duration::from_secs(15));
/// let mut events = session.subscribe();
///
/// session.arm(route);
/// let handle = session.start(position_rx, CancellationToken::new());
///
/// while let Ok(event) = events.recv().await {
///     println!("{}", event);
/// }
/// ```
#[derive(Clone)]
pub struct NavigationSession {
    tracker: Arc<Mutex<NavigationTracker>>,
    stats: Arc<SessionStats>,
    events: broadcast::Sender<NavigationEvent>,
    stale_after: Option<Duration>,
}

impl std::fmt::Debug for NavigationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationSession")
            .field("status", &self.snapshot())
            .field("stale_after", &self.stale_after)
            .finish()
    }
}

impl NavigationSession {
    /// Wrap a tracker in a session.
    pub fn new(tracker: NavigationTracker) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            tracker: Arc::new(Mutex::new(tracker)),
            stats: Arc::new(SessionStats::default()),
            events,
            stale_after: None,
        }
    }

    /// Mark the session stale when no fix arrives for `timeout`.
    ///
    /// A zero duration disables the watchdog.
    pub fn with_stale_after(mut self, timeout: Duration) -> Self {
        self.stale_after = (!timeout.is_zero()).then_some(timeout);
        self
    }

    /// Shared handle to the tracker, e.g. for registering callbacks.
    ///
    /// Callbacks run while this lock is held and must not lock it again;
    /// use the callback's `EventContext` to disarm.
    pub fn tracker(&self) -> Arc<Mutex<NavigationTracker>> {
        Arc::clone(&self.tracker)
    }

    /// Subscribe to navigation events.
    pub fn subscribe(&self) -> broadcast::Receiver<NavigationEvent> {
        self.events.subscribe()
    }

    /// Arm the tracker with a route.
    pub fn arm(&self, route: impl Into<Arc<Route>>) {
        self.tracker.lock().arm(route);
    }

    /// Disarm the tracker.
    pub fn disarm(&self) {
        self.tracker.lock().disarm();
    }

    /// Current tracker state.
    pub fn state(&self) -> TrackerState {
        self.tracker.lock().state()
    }

    /// Whether the fix stream has gone quiet.
    pub fn is_stale(&self) -> bool {
        self.stats.stale.load(Ordering::Relaxed)
    }

    /// Take a status snapshot.
    pub fn snapshot(&self) -> SessionStatus {
        let (state, armed) = {
            let tracker = self.tracker.lock();
            (tracker.state(), tracker.is_armed())
        };
        SessionStatus {
            state,
            armed,
            samples_processed: self.stats.samples_processed.load(Ordering::Relaxed),
            errors_seen: self.stats.errors_seen.load(Ordering::Relaxed),
            last_error: self.stats.last_error.lock().clone(),
            stale: self.is_stale(),
        }
    }

    /// Apply one position event synchronously.
    ///
    /// Returns the navigation events raised by a sample.
    pub fn handle_event(&self, event: PositionEvent) -> Vec<NavigationEvent> {
        match event {
            PositionEvent::Sample(sample) => {
                self.stats.samples_processed.fetch_add(1, Ordering::Relaxed);
                if self.stats.stale.swap(false, Ordering::Relaxed) {
                    tracing::info!("Position fixes resumed");
                }

                let raised = self.tracker.lock().update(&sample);
                for event in &raised {
                    // No subscribers is fine
                    let _ = self.events.send(*event);
                }
                raised
            }
            PositionEvent::Error(error) => {
                self.stats.errors_seen.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(code = error.code, message = %error.message, "Position source error");
                *self.stats.last_error.lock() = Some(error);
                Vec::new()
            }
        }
    }

    /// Spawn the processing loop on the current tokio runtime.
    ///
    /// Runs until the channel closes or `cancellation` fires.
    pub fn start(
        &self,
        mut rx: mpsc::Receiver<PositionEvent>,
        cancellation: CancellationToken,
    ) -> JoinHandle<()> {
        let session = self.clone();

        tokio::spawn(async move {
            tracing::info!(stale_after = ?session.stale_after, "Navigation session started");
            let mut last_fix = Instant::now();

            loop {
                let deadline = session
                    .stale_after
                    .filter(|_| !session.is_stale())
                    .map(|timeout| last_fix + timeout);

                tokio::select! {
                    biased;

                    _ = cancellation.cancelled() => break,

                    event = rx.recv() => {
                        let Some(event) = event else { break };
                        if matches!(event, PositionEvent::Sample(_)) {
                            last_fix = Instant::now();
                        }
                        session.handle_event(event);
                    }

                    _ = wait_until(deadline) => {
                        session.stats.stale.store(true, Ordering::Relaxed);
                        tracing::warn!(
                            silent_secs = last_fix.elapsed().as_secs_f64(),
                            "No position fix received, navigation data is stale"
                        );
                    }
                }
            }

            tracing::info!(
                samples = session.stats.samples_processed.load(Ordering::Relaxed),
                errors = session.stats.errors_seen.load(Ordering::Relaxed),
                "Navigation session stopped"
            );
        })
    }
}

/// Sleep until `deadline`, or forever when there is none.
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
