// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup for the binary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;

pub const LOG_FILE_NAME: &str = "tiltbar.log";

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
}

impl LogTarget {
    /// The log file under `state_dir`, or stderr when requested.
    pub fn resolve(to_stderr: bool) -> Result<Self> {
        if to_stderr {
            return Ok(LogTarget::Stderr);
        }
        let state_dir = crate::env::state_dir()?;
        Ok(LogTarget::File(state_dir.join(LOG_FILE_NAME)))
    }
}

/// Create the log directory and an appender for `path`.
pub fn file_appender(path: &Path) -> Result<RollingFileAppender> {
    let dir = path
        .parent()
        .with_context(|| format!("log path {} has no parent", path.display()))?;
    let file_name = path
        .file_name()
        .with_context(|| format!("log path {} has no file name", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    Ok(tracing_appender::rolling::never(dir, file_name))
}

/// Install the global subscriber. Keep the guard alive until exit so
/// buffered lines are flushed.
pub fn setup_logging(target: &LogTarget) -> Result<WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let (writer, guard) = match target {
        LogTarget::File(path) => tracing_appender::non_blocking(file_appender(path)?),
        LogTarget::Stderr => tracing_appender::non_blocking(std::io::stderr()),
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .context("failed to install log subscriber")?;

    Ok(guard)
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
