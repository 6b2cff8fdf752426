//! Integration tests for live navigation.
//!
//! These tests verify the complete flow:
//! - Replay source → channel → session → tracker
//! - Navigation events broadcast to subscribers
//! - Position errors, cancellation and the stale-fix watchdog
//!
//! Run with: `cargo test --test navigation_integration`

use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use campus_nav::geo::LatLng;
use campus_nav::navigation::{NavigationEvent, NavigationSession, NavigationTracker};
use campus_nav::position::{
    PositionError, PositionEvent, PositionSample, PositionSource, ReplayPositionSource,
};
use campus_nav::route::{Route, RouteStep};

// ============================================================================
// Helper Functions
// ============================================================================

const LNG: f64 = -76.7110;

/// Two steps heading north, roughly 111 m each.
fn campus_route() -> Route {
    Route::new(
        "0.1 mi",
        "3 mins",
        vec![
            RouteStep::new("Head <b>north</b> on Hilltop Cir", "364 ft", "1 min")
                .with_start(LatLng::new(39.2540, LNG))
                .with_end(LatLng::new(39.2550, LNG)),
            RouteStep::new("Continue to the <b>Library</b>", "364 ft", "1 min")
                .with_maneuver("straight")
                .with_start(LatLng::new(39.2550, LNG))
                .with_end(LatLng::new(39.2560, LNG)),
        ],
    )
}

/// A fix on the route line, one second apart.
fn fix(lat: f64, second: i64) -> PositionEvent {
    PositionSample::new(lat, LNG, 5.0, second * 1000).into()
}

/// Drain everything already broadcast.
fn drain(rx: &mut broadcast::Receiver<NavigationEvent>) -> Vec<NavigationEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// ============================================================================
// Integration Tests
// ============================================================================

/// Walk the whole route from a recording and check every edge fires once.
#[tokio::test]
async fn test_replayed_walk_reaches_destination() {
    let session = NavigationSession::new(NavigationTracker::default());
    let mut events = session.subscribe();
    session.arm(campus_route());

    let recording = vec![
        fix(39.2542, 0),  // ~89 m from step 0 end
        fix(39.2547, 1),  // ~33 m, advance to step 1
        fix(39.2549, 2),  // still step 1, no repeat
        fix(39.2555, 3),  // ~56 m from the end
        fix(39.25595, 4), // ~6 m, arrived
        fix(39.2560, 5),  // arrival is not repeated
    ];

    let (tx, rx) = mpsc::channel(16);
    let handle = session.start(rx, CancellationToken::new());
    let mut source = ReplayPositionSource::new(recording, tx).with_speed(0.0);

    source.start();
    source.finished().await;
    drop(source);
    handle.await.unwrap();

    assert_eq!(
        drain(&mut events),
        vec![
            NavigationEvent::StepAdvanced { index: 1 },
            NavigationEvent::DestinationReached,
        ]
    );

    let status = session.snapshot();
    assert_eq!(status.samples_processed, 6);
    assert_eq!(status.state.current_step_index, 1);
    assert!(!status.state.is_off_route);
    assert!(status.armed);
}

/// Wandering away and back raises a single off-route event.
#[tokio::test]
async fn test_off_route_detour() {
    let session = NavigationSession::new(NavigationTracker::default());
    let mut events = session.subscribe();
    session.arm(campus_route());

    let far_east = PositionSample::new(39.2545, LNG + 0.02, 5.0, 1000);
    let recording = vec![
        fix(39.2541, 0),
        far_east.into(),
        PositionSample::new(39.2545, LNG + 0.02, 5.0, 2000).into(),
        fix(39.2542, 3),
    ];

    let (tx, rx) = mpsc::channel(16);
    let handle = session.start(rx, CancellationToken::new());
    let mut source = ReplayPositionSource::new(recording, tx).with_speed(0.0);
    source.start();
    source.finished().await;
    drop(source);
    handle.await.unwrap();

    assert_eq!(drain(&mut events), vec![NavigationEvent::OffRouteEntered]);
    let status = session.snapshot();
    assert!(!status.state.is_off_route);
    assert_eq!(status.state.current_step_index, 0);
}

/// Position errors are counted and do not interrupt tracking.
#[tokio::test]
async fn test_position_errors_do_not_stop_session() {
    let session = NavigationSession::new(NavigationTracker::default());
    session.arm(campus_route());

    let (tx, rx) = mpsc::channel(16);
    let handle = session.start(rx, CancellationToken::new());

    tx.send(PositionError::new(PositionError::TIMEOUT, "Timed out").into())
        .await
        .unwrap();
    tx.send(fix(39.2547, 1)).await.unwrap();
    drop(tx);
    handle.await.unwrap();

    let status = session.snapshot();
    assert_eq!(status.errors_seen, 1);
    assert_eq!(status.samples_processed, 1);
    assert_eq!(status.state.current_step_index, 1);
    assert_eq!(
        status.last_error.map(|e| e.code),
        Some(PositionError::TIMEOUT)
    );
}

/// Cancelling the token ends the loop while the channel is still open.
#[tokio::test]
async fn test_cancellation_stops_session() {
    let session = NavigationSession::new(NavigationTracker::default());
    let (tx, rx) = mpsc::channel::<PositionEvent>(4);
    let token = CancellationToken::new();

    let handle = session.start(rx, token.clone());
    token.cancel();

    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("session should stop after cancellation")
        .unwrap();
    assert!(tx.is_closed());
}

/// A silent source marks the session stale; the next fix clears it.
#[tokio::test]
async fn test_stale_watchdog() {
    let session = NavigationSession::new(NavigationTracker::default())
        .with_stale_after(Duration::from_millis(50));
    session.arm(campus_route());

    let (tx, rx) = mpsc::channel(4);
    let token = CancellationToken::new();
    let handle = session.start(rx, token.clone());

    tx.send(fix(39.2541, 0)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(session.snapshot().stale);

    // Errors are not fixes
    tx.send(PositionError::new(PositionError::POSITION_UNAVAILABLE, "No fix").into())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(session.is_stale());

    tx.send(fix(39.2542, 1)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!session.is_stale());

    token.cancel();
    handle.await.unwrap();
}

/// A destination callback may disarm the tracker it runs in.
#[tokio::test]
async fn test_destination_callback_disarms() {
    let session = NavigationSession::new(NavigationTracker::default());
    session
        .tracker()
        .lock()
        .on_destination_reached(|ctx| ctx.disarm());
    session.arm(campus_route());

    let (tx, rx) = mpsc::channel(8);
    let handle = session.start(rx, CancellationToken::new());
    for (i, lat) in [39.2547, 39.25595, 39.2560].into_iter().enumerate() {
        tx.send(fix(lat, i as i64)).await.unwrap();
    }
    drop(tx);
    handle.await.unwrap();

    let status = session.snapshot();
    assert!(!status.armed);
    assert_eq!(status.state.current_step_index, 0);
    assert_eq!(status.state.distance_to_next_step_end, None);
    assert_eq!(status.samples_processed, 3);
}
