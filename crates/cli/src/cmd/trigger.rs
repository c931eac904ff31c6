// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tiltbar trigger <name>`: request a manual rebuild.

use anyhow::{Context, Result};
use tb_adapters::TiltAdapter;

pub async fn trigger<T: TiltAdapter>(adapter: &T, name: &str) -> Result<()> {
    adapter
        .trigger(name)
        .await
        .with_context(|| format!("failed to trigger {name}"))
}

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod tests;
