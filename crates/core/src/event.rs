// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Change notifications delivered to observers.

use crate::connection::ConnectionState;
use crate::view::{AggregateCounts, FailureEntry, InProgressEntry, PendingEntry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A change to exactly one published view.
///
/// Serializes with `{"type": "view:changed", ...fields}` format. Each event
/// carries an immutable snapshot of the view at the time of the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "counts:changed")]
    CountsChanged { counts: AggregateCounts },

    #[serde(rename = "connection:changed")]
    ConnectionChanged {
        state: ConnectionState,
        /// When the next reconnect attempt is scheduled, if one is.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        next_retry_at: Option<DateTime<Utc>>,
    },

    #[serde(rename = "failures:changed")]
    FailuresChanged { failures: Vec<FailureEntry> },

    #[serde(rename = "in_progress:changed")]
    InProgressChanged { builds: Vec<InProgressEntry> },

    #[serde(rename = "pending:changed")]
    PendingChanged { pending: Vec<PendingEntry> },
}

/// Which view an [`Event`] updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Counts,
    Connection,
    Failures,
    InProgress,
    Pending,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::CountsChanged { .. } => EventKind::Counts,
            Event::ConnectionChanged { .. } => EventKind::Connection,
            Event::FailuresChanged { .. } => EventKind::Failures,
            Event::InProgressChanged { .. } => EventKind::InProgress,
            Event::PendingChanged { .. } => EventKind::Pending,
        }
    }

    /// Short one-line description for logs.
    pub fn log_summary(&self) -> String {
        match self {
            Event::CountsChanged { counts } => format!(
                "counts:changed in_progress={} success={} warning={} error={}",
                counts.in_progress, counts.success, counts.warning, counts.error
            ),
            Event::ConnectionChanged { state, .. } => format!("connection:changed state={state}"),
            Event::FailuresChanged { failures } => {
                format!("failures:changed count={}", failures.len())
            }
            Event::InProgressChanged { builds } => {
                format!("in_progress:changed count={}", builds.len())
            }
            Event::PendingChanged { pending } => format!("pending:changed count={}", pending.len()),
        }
    }
}

/// Collapse a backlog of events to the newest event of each kind.
///
/// Observers that render snapshots use this to skip intermediate states
/// instead of replaying a queue. Output is ordered by [`EventKind`].
pub fn latest_per_kind(events: impl IntoIterator<Item = Event>) -> Vec<Event> {
    let mut latest = std::collections::BTreeMap::new();
    for event in events {
        latest.insert(event.kind(), event);
    }
    latest.into_values().collect()
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
