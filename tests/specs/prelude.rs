//! Test helpers for behavioral specifications.
//!
//! Provides a high-level DSL for running the tiltbar binary against a
//! fake `tilt` executable written as a shell script.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

// Spec polling timeouts
pub const SPEC_POLL_INTERVAL_MS: u64 = 10;
pub const SPEC_WAIT_MAX_MS: u64 = 5000;

/// Returns the path to a binary, checking llvm-cov target directory first.
/// Falls back to resolving relative to the test binary itself when
/// CARGO_MANIFEST_DIR is stale.
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug").join(name);
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }

    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    // The test binary lives at target/debug/deps/specs-<hash>
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

/// Returns the path to the tiltbar binary.
pub fn tiltbar_binary() -> PathBuf {
    binary_path("tiltbar")
}

/// Create a CLI builder with no fake executable configured
pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

/// High-level CLI builder for fluent test assertions
pub struct CliBuilder {
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new() -> Self {
        Self {
            args: Vec::new(),
            envs: vec![("NO_COLOR".into(), "1".into())],
        }
    }

    /// Add CLI arguments
    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Set environment variable
    pub fn env(mut self, key: &str, value: impl AsRef<Path>) -> Self {
        self.envs.push((
            key.to_string(),
            value.as_ref().to_string_lossy().to_string(),
        ));
        self
    }

    /// Build the command without running it
    pub fn command(self) -> Command {
        let mut cmd = Command::new(tiltbar_binary());
        cmd.args(&self.args);

        // Keep the caller's configuration out of the test
        for var in [
            "TILTBAR_CONFIG",
            "TILTBAR_TILT_PATH",
            "TILTBAR_WEB_URL",
            "TILTBAR_STATE_DIR",
            "COLOR",
        ] {
            cmd.env_remove(var);
        }

        for (key, value) in self.envs {
            cmd.env(key, value);
        }

        cmd
    }

    /// Run and expect success (exit code 0)
    pub fn passes(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            output.status.success(),
            "expected command to pass, got exit code {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    /// Run and expect failure (non-zero exit code)
    pub fn fails(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            !output.status.success(),
            "expected command to fail, but it passed\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }
}

/// Result of a CLI run for chaining assertions
pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn code(&self) -> Option<i32> {
        self.output.status.code()
    }

    /// Assert stdout equals expected exactly (with diff on failure).
    /// **Prefer this for format specs** - catches format regressions.
    pub fn stdout_eq(self, expected: &str) -> Self {
        let stdout = self.stdout();
        similar_asserts::assert_eq!(stdout, expected);
        self
    }

    /// Assert stdout contains substring.
    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(expected),
            "stdout does not contain '{}'\nstdout: {}",
            expected,
            stdout
        );
        self
    }

    /// Assert stderr contains substring.
    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.contains(expected),
            "stderr does not contain '{}'\nstderr: {}",
            expected,
            stderr
        );
        self
    }

    /// Parse stdout as a single JSON document.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout()).expect("stdout should be JSON")
    }
}

// =============================================================================
// Polling
// =============================================================================

/// Poll a condition until it returns true or timeout is reached.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);
    let poll_interval = std::time::Duration::from_millis(SPEC_POLL_INTERVAL_MS);

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll_interval);
    }
    false
}

// =============================================================================
// Fake tilt
// =============================================================================

/// Isolated directories plus a scriptable fake `tilt` executable.
///
/// The fake answers:
/// - `get uiresources --watch ...` with the contents of `watch.json`, then
///   stays alive until killed,
/// - `trigger <name>` by appending its arguments to `calls.log`, failing
///   with the contents of `trigger-error` when that file exists,
/// - `dump engine` with the contents of `engine.json`.
pub struct FakeTilt {
    dir: tempfile::TempDir,
    state_dir: tempfile::TempDir,
}

impl FakeTilt {
    pub fn new() -> Self {
        let fake = Self {
            dir: tempfile::tempdir().unwrap(),
            state_dir: tempfile::tempdir().unwrap(),
        };
        fake.write_script();
        fake
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn executable(&self) -> PathBuf {
        self.path().join("tilt")
    }

    pub fn state_path(&self) -> &Path {
        self.state_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("config.toml")
    }

    /// Resource objects streamed by the watch, as the tool pretty-prints them
    pub fn resources(&self, objects: &[&str]) {
        let pretty: Vec<String> = objects
            .iter()
            .map(|o| {
                let value: serde_json::Value = serde_json::from_str(o).unwrap();
                serde_json::to_string_pretty(&value).unwrap()
            })
            .collect();
        self.file("watch.json", &(pretty.join("\n") + "\n"));
    }

    pub fn engine(&self, dump: &str) {
        self.file("engine.json", dump);
    }

    pub fn fail_triggers(&self, output: &str) {
        self.file("trigger-error", output);
    }

    pub fn config(&self, toml: &str) {
        std::fs::write(self.config_path(), toml).unwrap();
    }

    /// Arguments of every trigger invocation, one line each
    pub fn calls(&self) -> String {
        std::fs::read_to_string(self.path().join("calls.log")).unwrap_or_default()
    }

    pub fn log(&self) -> String {
        std::fs::read_to_string(self.state_path().join("tiltbar.log"))
            .unwrap_or_else(|_| "(no log)".to_string())
    }

    /// Run tiltbar against this fake
    pub fn tiltbar(&self) -> CliBuilder {
        cli()
            .env("TILTBAR_TILT_PATH", self.executable())
            .env("TILTBAR_STATE_DIR", self.state_path())
            .env("TILTBAR_CONFIG", self.config_path())
    }

    fn file(&self, name: &str, content: &str) {
        std::fs::write(self.path().join(name), content).unwrap();
    }

    fn write_script(&self) {
        let dir = self.path().display();
        let script = format!(
            r#"#!/bin/sh
case "$1" in
  get)
    [ -f "{dir}/watch.json" ] && cat "{dir}/watch.json"
    exec sleep 30
    ;;
  trigger)
    echo "$@" >> "{dir}/calls.log"
    if [ -f "{dir}/trigger-error" ]; then
      cat "{dir}/trigger-error" >&2
      exit 1
    fi
    ;;
  dump)
    cat "{dir}/engine.json" 2>/dev/null || {{ echo "no engine" >&2; exit 1; }}
    ;;
  *)
    echo "unexpected: $@" >&2
    exit 2
    ;;
esac
"#
        );
        let path = self.executable();
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}

/// A resource with a build in progress since a fixed time
pub const BUILDING_DB: &str =
    r#"{"metadata":{"name":"db"},"status":{"currentBuild":{"startTime":"2024-01-01T00:00:00Z"}}}"#;

/// A resource whose last build failed
pub const FAILED_API: &str = r#"{"metadata":{"name":"api"},"status":{"buildHistory":[{"error":"exit status 1","finishTime":"2024-01-01T00:00:00Z"}]}}"#;

/// A resource whose last build succeeded
pub const HEALTHY_WEB: &str = r#"{"metadata":{"name":"web"},"status":{"buildHistory":[{"finishTime":"2024-01-01T00:00:00Z"}],"runtimeStatus":"ok"}}"#;

/// Engine dump where `api` and `web` depend on `db`
pub const ENGINE_DB_DEPENDENTS: &str = r#"{"ManifestTargets":{"api":{"Manifest":{"Name":"api","ResourceDependencies":["db"]}},"web":{"Manifest":{"Name":"web","ResourceDependencies":["db"]}}}}"#;
