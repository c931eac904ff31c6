// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Short human-readable durations for build ages and retry countdowns.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Format seconds as a short human-readable duration: `"5s"`, `"2m"`, `"1h30m"`, `"3d"`.
///
/// For the hours range, minutes are included when non-zero (e.g. `"1h"` vs `"1h5m"`).
pub fn format_elapsed(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86400 {
        let h = secs / 3600;
        let m = (secs % 3600) / 60;
        if m > 0 {
            format!("{}h{}m", h, m)
        } else {
            format!("{}h", h)
        }
    } else {
        format!("{}d", secs / 86400)
    }
}

/// Format a [`Duration`], rounding sub-second remainders up so a pending
/// retry never reads as `"0s"`.
pub fn format_duration(duration: Duration) -> String {
    let mut secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs += 1;
    }
    format_elapsed(secs)
}

/// Time elapsed from `from` until `now`; timestamps in the future read as `"0s"`.
pub fn format_since(from: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - from).num_seconds().max(0) as u64;
    format_elapsed(secs)
}

/// Time remaining until `at`; deadlines in the past read as `"0s"`.
pub fn format_until(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let remaining = (at - now).to_std().unwrap_or_default();
    format_duration(remaining)
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
