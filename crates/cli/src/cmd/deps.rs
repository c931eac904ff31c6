// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tiltbar deps`: print who depends on whom.

use anyhow::{Context, Result};
use tb_adapters::TiltAdapter;
use tb_core::DependentsMap;

pub async fn deps<T: TiltAdapter>(adapter: &T) -> Result<DependentsMap> {
    tb_engine::fetch_dependents(adapter)
        .await
        .context("failed to read the dependency graph")
}

#[cfg(test)]
#[path = "deps_tests.rs"]
mod tests;
