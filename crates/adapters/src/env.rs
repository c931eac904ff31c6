// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.

use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Timeout for `tilt trigger` (default: 30000ms).
pub fn trigger_timeout() -> Duration {
    parse_duration_ms("TILTBAR_TRIGGER_TIMEOUT_MS").unwrap_or(Duration::from_secs(30))
}

/// Timeout for `tilt dump engine` (default: 30000ms).
pub fn dump_timeout() -> Duration {
    parse_duration_ms("TILTBAR_DUMP_TIMEOUT_MS").unwrap_or(Duration::from_secs(30))
}
