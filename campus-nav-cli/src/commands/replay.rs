//! Replay command - run a recorded track against a saved route.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use campus_nav::navigation::{NavigationEvent, NavigationSession, NavigationTracker};
use campus_nav::position::{PositionEvent, PositionSample, PositionSource, ReplayPositionSource};
use campus_nav::route::Route;

use super::common::read_json;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Position channel capacity between the replay source and the session.
const POSITION_CHANNEL_CAPACITY: usize = 64;

/// Arguments for the replay command.
pub struct ReplayArgs {
    pub route: PathBuf,
    pub track: PathBuf,
    pub speed: f64,
}

/// Run the replay command.
pub fn run(runner: &CliRunner, args: ReplayArgs) -> Result<(), CliError> {
    runner.log_startup("replay");
    let config = runner.config();

    let route: Route = read_json(&args.route)?;
    let track = load_track(&args.track)?;
    let tracker = NavigationTracker::new(config.tracker_config()?);
    let session = NavigationSession::new(tracker)
        .with_stale_after(Duration::from_secs(config.navigation.stale_after_secs));

    println!(
        "Replaying {} fixes over {} steps ({}, {})",
        track.len(),
        route.len(),
        route.distance_text,
        route.duration_text
    );
    if let Some(first) = route.steps.first() {
        println!("  Step 1: {}", first.display_instruction());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(format!("Failed to create Tokio runtime: {}", e)))?;

    session.arm(route);
    runtime.block_on(drive(&session, track, args.speed))?;

    let status = session.snapshot();
    println!();
    println!("Final state");
    println!("  Armed:          {}", status.armed);
    println!("  Step:           {}", status.state.current_step_index + 1);
    match status.state.distance_to_next_step_end {
        Some(d) => println!("  To step end:    {:.1} m", d),
        None => println!("  To step end:    -"),
    }
    println!("  Off route:      {}", status.state.is_off_route);
    println!("  Fixes:          {}", status.samples_processed);
    println!("  Source errors:  {}", status.errors_seen);

    Ok(())
}

/// Feed the track through the session, printing events as they arrive.
async fn drive(session: &NavigationSession, track: Vec<PositionEvent>, speed: f64) -> Result<(), CliError> {
    let (tx, rx) = mpsc::channel(POSITION_CHANNEL_CAPACITY);
    let mut events = session.subscribe();
    let mut handle = session.start(rx, CancellationToken::new());

    let mut source = ReplayPositionSource::new(track, tx).with_speed(speed);
    let feeder = tokio::spawn(async move {
        source.start();
        source.finished().await;
    });

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => print_event(session, event),
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Event printer fell behind");
                }
                Err(RecvError::Closed) => break,
            },
            result = &mut handle => {
                result.map_err(|e| CliError::Runtime(format!("Session task failed: {}", e)))?;
                break;
            }
        }
    }

    while let Ok(event) = events.try_recv() {
        print_event(session, event);
    }

    feeder
        .await
        .map_err(|e| CliError::Runtime(format!("Replay task failed: {}", e)))
}

fn print_event(session: &NavigationSession, event: NavigationEvent) {
    match event {
        NavigationEvent::StepAdvanced { index } => {
            let tracker = session.tracker();
            let tracker = tracker.lock();
            let instruction = tracker
                .route()
                .and_then(|route| route.steps.get(index))
                .map(|step| step.display_instruction())
                .unwrap_or_default();
            println!("  Step {}: {}", index + 1, instruction);
        }
        NavigationEvent::OffRouteEntered => println!("  ! Off route"),
        NavigationEvent::DestinationReached => println!("  * You have arrived"),
    }
}

/// Read a track as position events, falling back to bare samples.
fn load_track(path: &Path) -> Result<Vec<PositionEvent>, CliError> {
    match read_json::<Vec<PositionEvent>>(path) {
        Ok(events) => Ok(events),
        Err(first_err) => match read_json::<Vec<PositionSample>>(path) {
            Ok(samples) => Ok(samples.into_iter().map(PositionEvent::from).collect()),
            Err(_) => Err(first_err),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_track_accepts_samples() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("track.json");
        std::fs::write(
            &path,
            r#"[{"latitude": 39.254, "longitude": -76.711, "accuracy": 5.0, "timestamp": 0}]"#,
        )
        .unwrap();

        let track = load_track(&path).unwrap();
        assert_eq!(track.len(), 1);
        assert!(matches!(track[0], PositionEvent::Sample(_)));
    }

    #[test]
    fn test_load_track_accepts_tagged_events() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("track.json");
        std::fs::write(
            &path,
            r#"[
                {"type": "sample", "latitude": 39.254, "longitude": -76.711, "accuracy": 5.0, "timestamp": 0},
                {"type": "error", "code": 3, "message": "Timed out"}
            ]"#,
        )
        .unwrap();

        let track = load_track(&path).unwrap();
        assert_eq!(track.len(), 2);
        assert!(matches!(track[1], PositionEvent::Error(_)));
    }

    #[test]
    fn test_load_track_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("track.json");
        std::fs::write(&path, r#"{"not": "a list"}"#).unwrap();
        assert!(matches!(load_track(&path), Err(CliError::Input { .. })));
    }
}
