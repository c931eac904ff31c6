//! `tiltbar watch` specs
//!
//! The watch runs until interrupted, so these specs spawn it with stdout
//! redirected to a file and stop it with SIGINT.

use std::process::{Child, Stdio};

use crate::prelude::*;

fn spawn_watch(tilt: &FakeTilt, extra: &[&str]) -> (Child, std::path::PathBuf) {
    let out = tilt.path().join("watch.out");
    let mut cmd = tilt.tiltbar().args(&["watch"]).args(extra).command();
    cmd.stdout(std::fs::File::create(&out).unwrap())
        .stderr(Stdio::null());
    (cmd.spawn().unwrap(), out)
}

fn interrupt(child: &mut Child) -> std::process::ExitStatus {
    std::process::Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    child.wait().unwrap()
}

fn read(path: &std::path::Path) -> String {
    std::fs::read_to_string(path).unwrap_or_default()
}

#[test]
fn prints_changes_and_stops_on_interrupt() {
    let tilt = FakeTilt::new();
    tilt.resources(&[BUILDING_DB]);

    let (mut child, out) = spawn_watch(&tilt, &[]);
    let seen = wait_for(SPEC_WAIT_MAX_MS, || read(&out).contains("building: db"));
    let status = interrupt(&mut child);

    let text = read(&out);
    assert!(seen, "output: {text}");
    assert!(status.success(), "exit: {status:?}");
    assert!(text.starts_with("connection: connecting\nconnection: connected\n"), "{text}");
    assert!(text.contains("counts: 1 in progress, 0 ok, 0 warning, 0 error\n"));
}

#[test]
fn json_lines_when_requested() {
    let tilt = FakeTilt::new();
    tilt.resources(&[FAILED_API]);

    let (mut child, out) = spawn_watch(&tilt, &["-o", "json"]);
    let seen = wait_for(SPEC_WAIT_MAX_MS, || read(&out).contains("failures:changed"));
    interrupt(&mut child);

    let text = read(&out);
    assert!(seen, "output: {text}");
    for line in text.lines() {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(value["type"].is_string());
    }
}

#[test]
fn missing_executable_shows_unreachable_with_countdown() {
    let tilt = FakeTilt::new();

    let out = tilt.path().join("watch.out");
    let mut cmd = tilt
        .tiltbar()
        .env("TILTBAR_TILT_PATH", tilt.path().join("missing/tilt"))
        .args(&["watch"])
        .command();
    cmd.stdout(std::fs::File::create(&out).unwrap())
        .stderr(Stdio::null());
    let mut child = cmd.spawn().unwrap();

    let seen = wait_for(SPEC_WAIT_MAX_MS, || {
        read(&out).contains("connection: server_unreachable (next retry in 1s)")
    });
    interrupt(&mut child);
    assert!(seen, "output: {}", read(&out));
}
