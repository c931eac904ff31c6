// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tiltbar status`: connect, let the stream settle, print one snapshot.

use std::time::Duration;

use anyhow::{bail, Result};
use clap::Args;
use tb_adapters::TiltAdapter;
use tb_core::{format_duration, format_until, Clock, ConnectionState, Event, StatusSnapshot};
use tb_engine::{Supervisor, SupervisorConfig};
use tokio::time::Instant;

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    /// Quiet period after connecting before the snapshot is taken
    #[arg(long, default_value_t = 500)]
    pub settle_ms: u64,
    /// Give up if not connected within this many milliseconds
    #[arg(long, default_value_t = 10_000)]
    pub timeout_ms: u64,
}

impl StatusArgs {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Start a supervisor and return its snapshot once connected and quiet.
///
/// While connected, every event restarts the `settle` window. If the
/// deadline passes while connected the current snapshot is returned;
/// otherwise the command fails with the last connection state.
pub async fn collect<T: TiltAdapter, C: Clock>(
    adapter: T,
    clock: C,
    config: SupervisorConfig,
    settle: Duration,
    timeout: Duration,
) -> Result<StatusSnapshot> {
    let (handle, mut events) = Supervisor::spawn(adapter, clock.clone(), config);
    handle.start();

    let deadline = Instant::now() + timeout;
    let mut state = ConnectionState::Connecting;
    let mut quiet_at = deadline;

    loop {
        let wake = if state.is_connected() {
            quiet_at.min(deadline)
        } else {
            deadline
        };
        tokio::select! {
            event = events.recv() => match event {
                Some(Event::ConnectionChanged { state: next, .. }) => state = next,
                Some(_) => {}
                None => break,
            },
            _ = tokio::time::sleep_until(wake) => break,
        }
        quiet_at = Instant::now() + settle;
    }

    let snapshot = handle.snapshot().await;
    handle.shutdown().await;

    let Some(snapshot) = snapshot else {
        bail!("supervisor stopped before a snapshot was taken");
    };
    if !snapshot.connection.is_connected() {
        let retry = snapshot
            .next_retry_at
            .map(|at| format!(", next retry in {}", format_until(at, clock.utc_now())))
            .unwrap_or_default();
        bail!(
            "not connected to tilt after {}: {}{retry}",
            format_duration(timeout),
            snapshot.connection
        );
    }
    Ok(snapshot)
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
