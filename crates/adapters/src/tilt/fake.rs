// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake tilt adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{AdapterError, TiltAdapter, WatchChild, WatchProcess};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, DuplexStream};
use tokio::sync::oneshot;

const PIPE_CAPACITY: usize = 64 * 1024;

/// Recorded adapter call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TiltCall {
    SpawnWatch,
    Trigger(String),
    DumpEngine,
}

struct FakeTiltState {
    watches: VecDeque<Result<WatchProcess, AdapterError>>,
    calls: Vec<TiltCall>,
    trigger_failures: HashMap<String, String>,
    engine_dump: Option<String>,
}

/// Fake tilt adapter for testing.
///
/// Each `spawn_watch` pops the next queued outcome; an empty queue fails
/// the spawn.
#[derive(Clone)]
pub struct FakeTiltAdapter {
    inner: Arc<Mutex<FakeTiltState>>,
}

impl Default for FakeTiltAdapter {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeTiltState {
                watches: VecDeque::new(),
                calls: Vec::new(),
                trigger_failures: HashMap::new(),
                engine_dump: None,
            })),
        }
    }
}

impl FakeTiltAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<TiltCall> {
        self.inner.lock().calls.clone()
    }

    /// Number of watch spawns attempted so far
    pub fn spawn_count(&self) -> usize {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|c| **c == TiltCall::SpawnWatch)
            .count()
    }

    /// Queue a watch process for the next spawn, returning its control handle
    pub fn push_watch(&self) -> FakeWatch {
        let (stdout_tx, stdout_rx) = tokio::io::duplex(PIPE_CAPACITY);
        let (stderr_tx, stderr_rx) = tokio::io::duplex(PIPE_CAPACITY);
        let (exit_tx, exit_rx) = oneshot::channel();
        let killed = Arc::new(AtomicBool::new(false));

        let process = WatchProcess {
            stdout: Box::new(stdout_rx),
            stderr: Box::new(stderr_rx),
            child: Box::new(FakeChild {
                exit_rx: Some(exit_rx),
                exited: None,
                killed: Arc::clone(&killed),
            }),
        };
        self.inner.lock().watches.push_back(Ok(process));

        FakeWatch {
            stdout: Some(stdout_tx),
            stderr: Some(stderr_tx),
            exit: Some(exit_tx),
            killed,
        }
    }

    /// Queue a spawn failure for the next spawn
    pub fn push_watch_error(&self, error: AdapterError) {
        self.inner.lock().watches.push_back(Err(error));
    }

    /// Make `trigger` fail for one resource
    pub fn fail_trigger(&self, resource: &str, output: &str) {
        self.inner
            .lock()
            .trigger_failures
            .insert(resource.to_string(), output.to_string());
    }

    /// Set the engine dump returned by `dump_engine`; `None` makes it fail
    pub fn set_engine_dump(&self, dump: Option<&str>) {
        self.inner.lock().engine_dump = dump.map(str::to_string);
    }
}

#[async_trait]
impl TiltAdapter for FakeTiltAdapter {
    async fn spawn_watch(&self) -> Result<WatchProcess, AdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(TiltCall::SpawnWatch);
        inner
            .watches
            .pop_front()
            .unwrap_or_else(|| Err(AdapterError::SpawnFailed("no fake watch queued".to_string())))
    }

    async fn trigger(&self, resource: &str) -> Result<(), AdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(TiltCall::Trigger(resource.to_string()));
        match inner.trigger_failures.get(resource) {
            Some(output) => Err(AdapterError::CommandFailed {
                command: format!("tilt trigger {resource}"),
                code: Some(1),
                output: output.clone(),
            }),
            None => Ok(()),
        }
    }

    async fn dump_engine(&self) -> Result<String, AdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(TiltCall::DumpEngine);
        inner
            .engine_dump
            .clone()
            .ok_or_else(|| AdapterError::CommandFailed {
                command: "tilt dump engine".to_string(),
                code: Some(1),
                output: "no engine dump configured".to_string(),
            })
    }
}

/// Test-side control of a fake watch process
pub struct FakeWatch {
    stdout: Option<DuplexStream>,
    stderr: Option<DuplexStream>,
    exit: Option<oneshot::Sender<Option<i32>>>,
    killed: Arc<AtomicBool>,
}

impl FakeWatch {
    /// Write raw text to the process's stdout
    pub async fn write_stdout(&mut self, text: &str) -> io::Result<()> {
        write_pipe(self.stdout.as_mut(), text).await
    }

    /// Write raw text to the process's stderr
    pub async fn write_stderr(&mut self, text: &str) -> io::Result<()> {
        write_pipe(self.stderr.as_mut(), text).await
    }

    /// Close stdout, delivering end-of-stream to the reader
    pub fn close_stdout(&mut self) {
        self.stdout = None;
    }

    /// Report the process as exited without closing its pipes
    pub fn exit(&mut self, code: Option<i32>) {
        if let Some(tx) = self.exit.take() {
            let _ = tx.send(code);
        }
    }

    /// Close both pipes and exit
    pub fn finish(&mut self, code: Option<i32>) {
        self.stdout = None;
        self.stderr = None;
        self.exit(code);
    }

    /// Whether the supervisor killed this process
    pub fn is_killed(&self) -> bool {
        self.killed.load(Ordering::SeqCst)
    }
}

async fn write_pipe(pipe: Option<&mut DuplexStream>, text: &str) -> io::Result<()> {
    match pipe {
        Some(pipe) => {
            pipe.write_all(text.as_bytes()).await?;
            pipe.flush().await
        }
        None => Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed")),
    }
}

struct FakeChild {
    exit_rx: Option<oneshot::Receiver<Option<i32>>>,
    exited: Option<Option<i32>>,
    killed: Arc<AtomicBool>,
}

#[async_trait]
impl WatchChild for FakeChild {
    async fn wait(&mut self) -> io::Result<Option<i32>> {
        if let Some(code) = self.exited {
            return Ok(code);
        }
        let code = match self.exit_rx.as_mut() {
            Some(rx) => match rx.await {
                Ok(code) => code,
                // Control handle dropped without exiting: stay running.
                Err(_) => std::future::pending().await,
            },
            None => std::future::pending().await,
        };
        self.exit_rx = None;
        self.exited = Some(code);
        Ok(code)
    }

    async fn kill(&mut self) -> io::Result<()> {
        self.killed.store(true, Ordering::SeqCst);
        self.exit_rx = None;
        self.exited = Some(None);
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
