// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::framer::ObjectReader;
use serial_test::serial;
use std::os::unix::fs::PermissionsExt;
use tempfile::TempDir;

/// Write an executable shell script standing in for the tool.
fn fake_tilt(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("tilt");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn default_points_at_well_known_install_path() {
    let cli = TiltCli::default();
    assert_eq!(cli.executable(), Path::new(DEFAULT_TILT_PATH));
}

#[test]
fn resolve_rejects_missing_path() {
    let cli = TiltCli::new("/nonexistent/dir/tilt");
    let err = cli.resolve().unwrap_err();
    assert!(err.is_not_found(), "got: {err}");
}

#[test]
fn resolve_rejects_bare_name_missing_from_path() {
    let cli = TiltCli::new("tiltbar-definitely-not-installed");
    assert!(cli.resolve().unwrap_err().is_not_found());
}

#[test]
fn resolve_finds_bare_name_on_path() {
    let cli = TiltCli::new("sh");
    assert!(cli.resolve().unwrap().is_absolute());
}

#[tokio::test]
async fn spawn_watch_missing_executable_is_not_found() {
    let cli = TiltCli::new("/nonexistent/dir/tilt");
    let err = cli.spawn_watch().await.err().unwrap();
    assert!(err.is_not_found(), "got: {err}");
}

#[tokio::test]
async fn spawn_watch_streams_stdout_and_reports_exit() {
    let dir = TempDir::new().unwrap();
    let tilt = fake_tilt(
        &dir,
        r#"echo "$@" >&2
printf '{\n  "metadata": {"name": "api"}\n}\n'
exit 7"#,
    );

    let mut process = TiltCli::new(&tilt).spawn_watch().await.unwrap();
    let mut reader = ObjectReader::new(process.stdout);
    let object = reader.next_object().await.unwrap();
    assert!(object.contains("\"api\""));
    assert!(reader.next_object().await.is_none());

    let mut args = String::new();
    tokio::io::AsyncReadExt::read_to_string(&mut process.stderr, &mut args)
        .await
        .unwrap();
    assert_eq!(args.trim(), "get uiresources --watch --output json");

    assert_eq!(process.child.wait().await.unwrap(), Some(7));
}

#[tokio::test]
async fn spawn_watch_forwards_host_and_port() {
    let dir = TempDir::new().unwrap();
    let tilt = fake_tilt(&dir, r#"echo "$@""#);

    let process = TiltCli::new(&tilt)
        .with_host("10.0.0.2")
        .with_port(10351)
        .spawn_watch()
        .await
        .unwrap();
    let mut out = String::new();
    let mut stdout = process.stdout;
    tokio::io::AsyncReadExt::read_to_string(&mut stdout, &mut out)
        .await
        .unwrap();
    assert_eq!(
        out.trim(),
        "get uiresources --watch --output json --host 10.0.0.2 --port 10351"
    );
}

#[tokio::test]
async fn kill_terminates_long_running_watch() {
    let dir = TempDir::new().unwrap();
    let tilt = fake_tilt(&dir, "exec sleep 60");

    let mut process = TiltCli::new(&tilt).spawn_watch().await.unwrap();
    process.child.kill().await.unwrap();
    assert_eq!(process.child.wait().await.unwrap(), None);
}

#[tokio::test]
async fn trigger_passes_resource_name() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("calls");
    let tilt = fake_tilt(&dir, &format!(r#"echo "$@" >> {}"#, log.display()));

    TiltCli::new(&tilt).trigger("api").await.unwrap();
    assert_eq!(std::fs::read_to_string(log).unwrap().trim(), "trigger api");
}

#[tokio::test]
async fn trigger_failure_carries_output() {
    let dir = TempDir::new().unwrap();
    let tilt = fake_tilt(&dir, "echo 'no such resource' >&2; exit 1");

    let err = TiltCli::new(&tilt).trigger("nope").await.unwrap_err();
    match err {
        AdapterError::CommandFailed { code, output, .. } => {
            assert_eq!(code, Some(1));
            assert_eq!(output, "no such resource");
        }
        other => panic!("expected CommandFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn dump_engine_returns_stdout() {
    let dir = TempDir::new().unwrap();
    let tilt = fake_tilt(&dir, r#"echo '{"ManifestTargets": {}}'"#);

    let dump = TiltCli::new(&tilt).dump_engine().await.unwrap();
    assert_eq!(dump.trim(), r#"{"ManifestTargets": {}}"#);
}

#[tokio::test]
#[serial(tilt_env)]
async fn trigger_honours_timeout_override() {
    let dir = TempDir::new().unwrap();
    let tilt = fake_tilt(&dir, "exec sleep 10");

    std::env::set_var("TILTBAR_TRIGGER_TIMEOUT_MS", "100");
    let result = TiltCli::new(&tilt).trigger("slow").await;
    std::env::remove_var("TILTBAR_TRIGGER_TIMEOUT_MS");

    assert!(matches!(result, Err(AdapterError::Timeout(_))), "got: {result:?}");
}
