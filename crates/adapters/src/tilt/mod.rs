// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapters for the orchestration tool's CLI

mod cli;

pub use cli::{TiltCli, DEFAULT_TILT_PATH};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeTiltAdapter, FakeWatch, TiltCall};

use async_trait::async_trait;
use std::io;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Errors from invoking the orchestration CLI
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The executable could not be located or launched.
    #[error("executable not found: {0}")]
    NotFound(String),
    #[error("spawn failed: {0}")]
    SpawnFailed(String),
    #[error("{command} exited with {}: {output}", exit_label(*.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        output: String,
    },
    #[error("{0} timed out")]
    Timeout(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

fn exit_label(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "signal".to_string(),
    }
}

impl AdapterError {
    /// Whether this error means the executable itself is unavailable.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AdapterError::NotFound(_))
    }
}

/// Boxed byte source for a child's output pipe.
pub type PipeReader = Box<dyn AsyncRead + Send + Unpin>;

/// Handle on a running watch subprocess.
#[async_trait]
pub trait WatchChild: Send {
    /// Wait for the process to exit, returning its exit code (`None` when
    /// killed by a signal). Must be cancel-safe.
    async fn wait(&mut self) -> io::Result<Option<i32>>;

    /// Terminate the process.
    async fn kill(&mut self) -> io::Result<()>;
}

/// A launched watch subprocess with its output pipes taken.
pub struct WatchProcess {
    pub stdout: PipeReader,
    pub stderr: PipeReader,
    pub child: Box<dyn WatchChild>,
}

/// Adapter for the orchestration CLI.
#[async_trait]
pub trait TiltAdapter: Clone + Send + Sync + 'static {
    /// Launch the long-lived watch streaming resource objects as JSON.
    async fn spawn_watch(&self) -> Result<WatchProcess, AdapterError>;

    /// Ask the tool to rebuild one resource.
    async fn trigger(&self, resource: &str) -> Result<(), AdapterError>;

    /// Dump the engine state (manifest graph) as a JSON document.
    async fn dump_engine(&self) -> Result<String, AdapterError>;
}
