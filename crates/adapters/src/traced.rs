// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrapper for consistent observability

use crate::tilt::{AdapterError, TiltAdapter, WatchProcess};
use async_trait::async_trait;
use tracing::Instrument;

/// Wrapper that adds tracing to any TiltAdapter
#[derive(Clone)]
pub struct TracedTilt<T> {
    inner: T,
}

impl<T> TracedTilt<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: TiltAdapter> TiltAdapter for TracedTilt<T> {
    async fn spawn_watch(&self) -> Result<WatchProcess, AdapterError> {
        async {
            tracing::info!("starting");
            let start = std::time::Instant::now();
            let result = self.inner.spawn_watch().await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(_) => tracing::info!(elapsed_ms, "watch started"),
                Err(e) if e.is_not_found() => {
                    tracing::warn!(elapsed_ms, error = %e, "executable unavailable")
                }
                Err(e) => tracing::error!(elapsed_ms, error = %e, "spawn failed"),
            }
            result
        }
        .instrument(tracing::info_span!("tilt.watch"))
        .await
    }

    async fn trigger(&self, resource: &str) -> Result<(), AdapterError> {
        async {
            let start = std::time::Instant::now();
            let result = self.inner.trigger(resource).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "triggered"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "trigger failed"),
            }
            result
        }
        .instrument(tracing::info_span!("tilt.trigger", resource))
        .await
    }

    async fn dump_engine(&self) -> Result<String, AdapterError> {
        let result = self.inner.dump_engine().await;
        tracing::info_span!("tilt.dump").in_scope(|| match &result {
            Ok(dump) => tracing::debug!(dump_len = dump.len(), "dumped"),
            Err(e) => tracing::warn!(error = %e, "dump failed"),
        });
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
