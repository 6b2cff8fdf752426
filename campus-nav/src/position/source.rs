//! Position source contract and a replay implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::PositionEvent;

/// A stream of position fixes that can be started and stopped.
///
/// Emissions are delivered on whatever channel the implementation was built
/// with, in non-decreasing timestamp order.
pub trait PositionSource: Send {
    /// Begin emitting. No-op if already started.
    fn start(&mut self);

    /// Cease emitting. Idempotent.
    fn stop(&mut self);

    /// Whether the source is currently emitting.
    fn is_tracking(&self) -> bool;
}

/// Replays a recorded list of position events.
///
/// Samples are paced by the gaps between their timestamps, divided by the
/// speed factor. A speed factor of zero (or any non-finite / negative value)
/// replays as fast as the receiver accepts. Error events are emitted without
/// delay.
///
/// `start()` spawns onto the current tokio runtime and must be called from
/// within one.
///
/// # Example
///
/// ```ignore
/// let (tx, rx) = tokio::sync::mpsc::channel(64);
/// let mut source = ReplayPositionSource::new(events, tx).with_speed(10.0);
/// source.start();
/// // ... consume rx ...
/// source.finished().await;
/// ```
pub struct ReplayPositionSource {
    events: Arc<Vec<PositionEvent>>,
    sender: mpsc::Sender<PositionEvent>,
    speed: f64,
    tracking: Arc<AtomicBool>,
    cancellation: Option<CancellationToken>,
    handle: Option<JoinHandle<()>>,
}

impl ReplayPositionSource {
    /// Create a replay source for the given events.
    pub fn new(events: Vec<PositionEvent>, sender: mpsc::Sender<PositionEvent>) -> Self {
        Self {
            events: Arc::new(events),
            sender,
            speed: 1.0,
            tracking: Arc::new(AtomicBool::new(false)),
            cancellation: None,
            handle: None,
        }
    }

    /// Set the replay speed factor (1.0 = real time).
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// No recorded events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Wait until the current replay finishes or is stopped.
    pub async fn finished(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Replay task ended abnormally");
            }
        }
    }

    /// Delay before emitting an event that follows `previous_ts`.
    ///
    /// A gap that does not fit in a `Duration` after scaling is not delayed.
    fn pacing_delay(&self, previous_ts: Option<i64>, event: &PositionEvent) -> Option<Duration> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return None;
        }
        let PositionEvent::Sample(sample) = event else {
            return None;
        };
        let gap_ms = sample.timestamp.checked_sub(previous_ts?)?;
        if gap_ms <= 0 {
            return None;
        }
        match Duration::try_from_secs_f64(gap_ms as f64 / 1000.0 / self.speed) {
            Ok(delay) => Some(delay),
            Err(e) => {
                tracing::debug!(gap_ms, speed = self.speed, error = %e, "Replay gap too large to pace");
                None
            }
        }
    }
}

impl PositionSource for ReplayPositionSource {
    fn start(&mut self) {
        if self.tracking.swap(true, Ordering::SeqCst) {
            return;
        }

        let token = CancellationToken::new();
        let events = Arc::clone(&self.events);
        let sender = self.sender.clone();
        let tracking = Arc::clone(&self.tracking);

        // Precompute delays so the task doesn't need `self`
        let mut previous_ts = None;
        let delays: Vec<Option<Duration>> = events
            .iter()
            .map(|event| {
                let delay = self.pacing_delay(previous_ts, event);
                if let PositionEvent::Sample(s) = event {
                    previous_ts = Some(s.timestamp);
                }
                delay
            })
            .collect();

        tracing::info!(events = events.len(), speed = self.speed, "Replay started");

        let task_token = token.clone();
        self.handle = Some(tokio::spawn(async move {
            for (event, delay) in events.iter().zip(delays) {
                if let Some(delay) = delay {
                    tokio::select! {
                        biased;
                        _ = task_token.cancelled() => break,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }

                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => break,
                    sent = sender.send(event.clone()) => {
                        if sent.is_err() {
                            tracing::debug!("Replay receiver dropped");
                            break;
                        }
                    }
                }
            }
            tracking.store(false, Ordering::SeqCst);
            tracing::info!("Replay finished");
        }));
        self.cancellation = Some(token);
    }

    fn stop(&mut self) {
        if let Some(token) = self.cancellation.take() {
            token.cancel();
            tracing::info!("Replay stopped");
        }
        self.tracking.store(false, Ordering::SeqCst);
    }

    fn is_tracking(&self) -> bool {
        self.tracking.load(Ordering::SeqCst)
    }
}

impl Drop for ReplayPositionSource {
    fn drop(&mut self) {
        if let Some(token) = self.cancellation.take() {
            token.cancel();
        }
    }
}
