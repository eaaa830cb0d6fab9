//! Detail runtime scenarios driven by the in-memory mock host.

use netps_common::ProcessId;
use netps_core::hydration::{
    DetailRuntime, FetchErrorKind, HydrationState, ScreenState, Settled, SlotKind,
};
use netps_core::mock_sources::{MockFailure, MockHost, MockProcess};
use netps_core::procfs::net::SocketState;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn deadline() -> Option<Instant> {
    Some(Instant::now() + Duration::from_secs(10))
}

fn host() -> MockHost {
    MockHost::new()
        .with_process(
            MockProcess::new(100, "api")
                .uids(1000, 1000)
                .socket(10, 8080, SocketState::Listen),
        )
        .with_process(
            MockProcess::new(200, "worker")
                .uids(0, 0)
                .socket(20, 9090, SocketState::Established),
        )
        .with_user(1000, "svc")
        .with_user(0, "root")
}

#[test]
fn revisit_discards_slow_results_from_previous_process() {
    let host = Arc::new(host().delay(SlotKind::Resource, Duration::from_millis(150)));
    let mut runtime = DetailRuntime::new(host.sources());

    runtime.visit(ProcessId(100), "api");
    let first = runtime.coordinator().token().cloned().unwrap();
    runtime.visit(ProcessId(200), "worker");
    assert!(first.is_cancelled());

    let Settled::Finished(view) = runtime.run_until_settled(deadline()) else {
        panic!("expected Finished");
    };
    assert_eq!(view.pid, Some(ProcessId(200)));
    assert_eq!(view.screen, ScreenState::AllOkay);
    assert_eq!(view.resource.unwrap().pid, ProcessId(200));
    assert_eq!(view.ownership.unwrap().username, "root");
}

#[test]
fn dismiss_hides_panel_but_keeps_errors() {
    let host = Arc::new(host().fail(SlotKind::Ownership, MockFailure::PermissionDenied, 1));
    let mut runtime = DetailRuntime::new(host.sources());
    runtime.visit(ProcessId(100), "api");

    let Settled::Finished(view) = runtime.run_until_settled(deadline()) else {
        panic!("expected Finished");
    };
    assert!(view.errors_visible);
    assert_eq!(view.errors[0].kind, FetchErrorKind::PermissionDenied);
    assert!(!view.errors[0].retry_hint());

    runtime.dismiss_errors();
    let view = runtime.view();
    assert_eq!(view.screen, ScreenState::ErrorsDismissed);
    assert!(!view.errors_visible);
    assert!(view.is_partial());
    assert_eq!(view.errors.len(), 1);

    // Retry is still accepted once the panel is dismissed.
    runtime.retry();
    assert_eq!(
        runtime.coordinator().slot_state(SlotKind::Ownership),
        HydrationState::Hydrating
    );
    let Settled::Finished(view) = runtime.run_until_settled(deadline()) else {
        panic!("expected Finished");
    };
    assert_eq!(view.screen, ScreenState::AllOkay);
}

#[test]
fn unresolved_username_shows_numeric_uid() {
    let host = Arc::new(
        MockHost::new().with_process(MockProcess::new(300, "orphan").uids(4321, 4321)),
    );
    let mut runtime = DetailRuntime::new(host.sources());
    runtime.visit(ProcessId(300), "orphan");

    let Settled::Finished(view) = runtime.run_until_settled(deadline()) else {
        panic!("expected Finished");
    };
    let ownership = view.ownership.unwrap();
    assert_eq!(ownership.username, "4321");
    assert!(!ownership.username_resolved);
    assert_eq!(view.screen, ScreenState::AllOkay);
}

#[test]
fn leaving_mid_cycle_cancels_workers() {
    let host = Arc::new(host().delay(SlotKind::Sockets, Duration::from_millis(200)));
    let mut runtime = DetailRuntime::new(host.sources());
    runtime.visit(ProcessId(100), "api");
    let token = runtime.coordinator().token().cloned().unwrap();

    runtime.leave();
    assert!(token.is_cancelled());
    assert!(matches!(runtime.run_until_settled(deadline()), Settled::Left));
    assert_eq!(runtime.view().screen, ScreenState::Init);
}
