//! `tiltbar trigger` specs

use crate::prelude::*;

#[test]
fn trigger_invokes_tilt_with_the_name() {
    let tilt = FakeTilt::new();

    tilt.tiltbar()
        .args(&["trigger", "api"])
        .passes()
        .stdout_eq("Triggered api\n");
    assert_eq!(tilt.calls(), "trigger api\n");
}

#[test]
fn host_and_port_are_forwarded() {
    let tilt = FakeTilt::new();

    tilt.tiltbar()
        .args(&["trigger", "api", "--host", "10.0.0.5", "--port", "10351"])
        .passes();
    assert_eq!(tilt.calls(), "trigger api --host 10.0.0.5 --port 10351\n");
}

#[test]
fn failure_shows_tilt_output() {
    let tilt = FakeTilt::new();
    tilt.fail_triggers("resource \"nope\" not found");

    tilt.tiltbar()
        .args(&["trigger", "nope"])
        .fails()
        .stderr_has("Error: failed to trigger nope")
        .stderr_has("resource \"nope\" not found");
}

#[test]
fn missing_executable_is_reported() {
    let tilt = FakeTilt::new();

    tilt.tiltbar()
        .env("TILTBAR_TILT_PATH", tilt.path().join("missing/tilt"))
        .args(&["trigger", "api"])
        .fails()
        .stderr_has("executable not found");
}
