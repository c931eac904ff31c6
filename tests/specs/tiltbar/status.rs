//! `tiltbar status` specs

use crate::prelude::*;

#[test]
fn snapshot_shows_every_view() {
    let tilt = FakeTilt::new();
    tilt.resources(&[BUILDING_DB, FAILED_API, HEALTHY_WEB]);
    tilt.engine(ENGINE_DB_DEPENDENTS);

    tilt.tiltbar()
        .args(&["status", "--settle-ms", "300"])
        .passes()
        .stdout_has("connection: connected\n")
        .stdout_has("counts: 1 in progress, 1 ok, 0 warning, 1 error\n")
        .stdout_has("failures:\n  api  ")
        .stdout_has("exit status 1\n")
        .stdout_has("building:\n  db  ")
        .stdout_has("pending:\n  (none)");
}

#[test]
fn json_snapshot() {
    let tilt = FakeTilt::new();
    tilt.resources(&[BUILDING_DB, FAILED_API, HEALTHY_WEB]);
    tilt.engine(ENGINE_DB_DEPENDENTS);

    let run = tilt
        .tiltbar()
        .args(&["status", "--settle-ms", "300", "-o", "json"])
        .passes();
    let value = run.json();
    assert_eq!(value["connection"], "connected");
    assert_eq!(value["counts"]["error"], 1);
    assert_eq!(value["failures"][0]["name"], "api");
    assert_eq!(value["failures"][0]["error"], "exit status 1");
    assert_eq!(value["in_progress"][0]["name"], "db");
}

#[test]
fn unreachable_tilt_fails_with_the_state() {
    let tilt = FakeTilt::new();

    tilt.tiltbar()
        .env("TILTBAR_TILT_PATH", tilt.path().join("missing/tilt"))
        .args(&["status", "--timeout-ms", "300"])
        .fails()
        .stderr_has("Error: not connected to tilt after 1s: server_unreachable");
}

#[test]
fn silent_watch_never_connects() {
    let tilt = FakeTilt::new();

    let run = tilt
        .tiltbar()
        .args(&["status", "--timeout-ms", "300"])
        .fails();
    assert_eq!(run.code(), Some(1));
    run.stderr_has("not connected to tilt").stderr_has("connecting");
}
