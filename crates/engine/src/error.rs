// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use tb_adapters::AdapterError;
use thiserror::Error;

/// Errors refreshing the dependency graph
#[derive(Debug, Error)]
pub enum DependencyError {
    #[error("engine dump is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("engine dump failed: {0}")]
    Fetch(#[from] AdapterError),
}
