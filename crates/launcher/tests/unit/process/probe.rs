//! # Debug-Port Probe Tests

use crate::common::fixtures::{closed_port, exit_status, open_port};
use crate::common::mocks::MockChild;
use virtrun_core::LaunchError;
use virtrun_core::config::ProbeConfig;
use virtrun_core::process::probe::wait_for_port;

fn quick(attempts: u32) -> ProbeConfig {
    ProbeConfig {
        attempts,
        backoff_ms: 10,
    }
}

fn alive() -> MockChild {
    let mut child = MockChild::new();
    child.expect_try_wait().returning(|| Ok(None));
    child
}

#[test]
fn test_open_port_ready_on_first_attempt() {
    let (_listener, port) = open_port();
    let mut child = alive();
    assert_eq!(wait_for_port(port, &quick(3), &mut child).unwrap(), 1);
}

#[test]
fn test_closed_port_exhausts_attempts() {
    let port = closed_port();
    let mut child = MockChild::new();
    child.expect_try_wait().times(3).returning(|| Ok(None));

    let err = wait_for_port(port, &quick(3), &mut child).unwrap_err();
    assert!(matches!(
        err,
        LaunchError::DebugPortUnavailable { port: p, attempts: 3 } if p == port
    ));
}

#[test]
fn test_zero_attempts_still_tries_once() {
    let port = closed_port();
    let mut child = MockChild::new();
    child.expect_try_wait().times(1).returning(|| Ok(None));

    let err = wait_for_port(port, &quick(0), &mut child).unwrap_err();
    assert!(matches!(err, LaunchError::DebugPortUnavailable { attempts: 1, .. }));
}

#[test]
fn test_exited_emulator_stops_probe() {
    let (_listener, port) = open_port();
    let mut child = MockChild::new();
    child
        .expect_try_wait()
        .times(1)
        .returning(|| Ok(Some(exit_status(1))));

    let err = wait_for_port(port, &quick(5), &mut child).unwrap_err();
    match err {
        LaunchError::EmulatorExited { status } => assert_eq!(status.code(), Some(1)),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_poll_failure_reported() {
    let port = closed_port();
    let mut child = MockChild::new();
    child
        .expect_try_wait()
        .returning(|| Err(std::io::Error::other("poll failed")));

    let err = wait_for_port(port, &quick(2), &mut child).unwrap_err();
    assert!(matches!(err, LaunchError::Poll(_)));
}
