// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapter that shells out to the `tilt` executable

use super::{AdapterError, TiltAdapter, WatchChild, WatchProcess};
use crate::subprocess::{merged_output, run_with_timeout, RunError};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};

/// Well-known install location of the executable.
pub const DEFAULT_TILT_PATH: &str = "/usr/local/bin/tilt";

/// `tilt` CLI adapter
#[derive(Clone, Debug)]
pub struct TiltCli {
    executable: PathBuf,
    host: Option<String>,
    port: Option<u16>,
}

impl Default for TiltCli {
    fn default() -> Self {
        Self::new(DEFAULT_TILT_PATH)
    }
}

impl TiltCli {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            host: None,
            port: None,
        }
    }

    /// Target a tool instance on a non-default host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Target a tool instance on a non-default port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Resolve the executable: paths must exist, bare names are looked up on `PATH`.
    pub fn resolve(&self) -> Result<PathBuf, AdapterError> {
        let is_path = self.executable.components().count() > 1;
        if is_path {
            if self.executable.is_file() {
                return Ok(self.executable.clone());
            }
            return Err(AdapterError::NotFound(self.executable.display().to_string()));
        }
        which::which(&self.executable)
            .map_err(|_| AdapterError::NotFound(self.executable.display().to_string()))
    }

    fn command(&self, args: &[&str]) -> Result<Command, AdapterError> {
        let mut cmd = Command::new(self.resolve()?);
        cmd.args(args);
        if let Some(host) = &self.host {
            cmd.arg("--host").arg(host);
        }
        if let Some(port) = self.port {
            cmd.arg("--port").arg(port.to_string());
        }
        cmd.stdin(Stdio::null());
        Ok(cmd)
    }

    async fn run_one_shot(
        &self,
        args: &[&str],
        timeout: Duration,
    ) -> Result<std::process::Output, AdapterError> {
        let description = format!("tilt {}", args.join(" "));
        let cmd = self.command(args)?;
        let output = run_with_timeout(cmd, timeout, &description)
            .await
            .map_err(|e| match e {
                RunError::NotFound { .. } => {
                    AdapterError::NotFound(self.executable.display().to_string())
                }
                RunError::Io { source, .. } => AdapterError::Io(source),
                RunError::TimedOut { description, .. } => AdapterError::Timeout(description),
            })?;

        if output.status.success() {
            Ok(output)
        } else {
            Err(AdapterError::CommandFailed {
                command: description,
                code: output.status.code(),
                output: merged_output(&output),
            })
        }
    }
}

#[async_trait]
impl TiltAdapter for TiltCli {
    async fn spawn_watch(&self) -> Result<WatchProcess, AdapterError> {
        let mut cmd = self.command(&["get", "uiresources", "--watch", "--output", "json"])?;
        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                AdapterError::NotFound(format!("{}: {e}", self.executable.display()))
            }
            _ => AdapterError::SpawnFailed(e.to_string()),
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AdapterError::SpawnFailed("stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| AdapterError::SpawnFailed("stderr was not captured".to_string()))?;

        tracing::debug!(pid = ?child.id(), "watch process started");

        Ok(WatchProcess {
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
            child: Box::new(TokioChild(child)),
        })
    }

    async fn trigger(&self, resource: &str) -> Result<(), AdapterError> {
        self.run_one_shot(&["trigger", resource], crate::env::trigger_timeout())
            .await?;
        Ok(())
    }

    async fn dump_engine(&self) -> Result<String, AdapterError> {
        let output = self
            .run_one_shot(&["dump", "engine"], crate::env::dump_timeout())
            .await?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

struct TokioChild(Child);

#[async_trait]
impl WatchChild for TokioChild {
    async fn wait(&mut self) -> io::Result<Option<i32>> {
        let status = self.0.wait().await?;
        Ok(status.code())
    }

    async fn kill(&mut self) -> io::Result<()> {
        self.0.kill().await
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
