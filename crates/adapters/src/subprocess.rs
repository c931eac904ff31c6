// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot subprocess execution

use std::io;
use std::process::Output;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Errors from running a one-shot command.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("{description} failed: executable not found")]
    NotFound { description: String },
    #[error("{description} failed: {source}")]
    Io {
        description: String,
        #[source]
        source: io::Error,
    },
    #[error("{description} timed out after {secs}s")]
    TimedOut { description: String, secs: u64 },
}

/// Run a subprocess to completion with a timeout.
///
/// `Command::output()` drains stdout and stderr concurrently while waiting,
/// so a child writing more than a pipe buffer's worth cannot deadlock
/// against us. The child is killed if the timeout elapses (the command is
/// marked `kill_on_drop`). A non-zero exit status is not an error here.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, RunError> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) if e.kind() == io::ErrorKind::NotFound => Err(RunError::NotFound {
            description: description.to_string(),
        }),
        Ok(Err(source)) => Err(RunError::Io {
            description: description.to_string(),
            source,
        }),
        Err(_elapsed) => Err(RunError::TimedOut {
            description: description.to_string(),
            secs: timeout.as_secs(),
        }),
    }
}

/// Stdout followed by stderr, lossily decoded and trimmed.
pub fn merged_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    match (stdout.trim(), stderr.trim()) {
        ("", err) => err.to_string(),
        (out, "") => out.to_string(),
        (out, err) => format!("{out}\n{err}"),
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
