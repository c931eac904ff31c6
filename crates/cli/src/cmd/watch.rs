// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tiltbar watch`: print every change event until interrupted.

use std::future::Future;
use std::io::Write;

use anyhow::Result;
use tb_adapters::TiltAdapter;
use tb_core::Clock;
use tb_engine::{Supervisor, SupervisorConfig};

use crate::output::Renderer;

/// Run the supervisor and write one line per event to `out` until `stop`
/// resolves or the event stream closes.
pub async fn watch<T, C, W>(
    adapter: T,
    clock: C,
    config: SupervisorConfig,
    renderer: Renderer,
    out: &mut W,
    stop: impl Future<Output = ()>,
) -> Result<()>
where
    T: TiltAdapter,
    C: Clock,
    W: Write,
{
    let (handle, mut events) = Supervisor::spawn(adapter, clock.clone(), config);
    handle.start();
    tokio::pin!(stop);

    let result = loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break Ok(()) };
                tracing::debug!(event = %event.log_summary(), "observed");
                let line = match renderer.event(&event, clock.utc_now()) {
                    Ok(line) => line,
                    Err(e) => break Err(e),
                };
                if let Err(e) = writeln!(out, "{line}").and_then(|()| out.flush()) {
                    break Err(e.into());
                }
            }
            _ = &mut stop => {
                tracing::info!("interrupted, stopping watch");
                break Ok(());
            }
        }
    };

    handle.shutdown().await;
    result
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
