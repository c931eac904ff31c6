// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Derived views published to observers.

use crate::connection::ConnectionState;
use crate::status::StatusCategory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Most recent failures kept in the failure list.
pub const MAX_FAILURES: usize = 5;

/// Builds kept in the in-progress list.
pub const MAX_IN_PROGRESS: usize = 5;

/// Display limit for the pending list.
pub const MAX_PENDING: usize = 10;

/// Resource name → names of the resources that declare it as a dependency.
pub type DependentsMap = BTreeMap<String, Vec<String>>;

/// Per-category resource counts. `Unknown` is counted as success.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateCounts {
    pub in_progress: usize,
    pub success: usize,
    pub warning: usize,
    pub error: usize,
}

impl AggregateCounts {
    pub fn record(&mut self, category: StatusCategory) {
        match category {
            StatusCategory::InProgress => self.in_progress += 1,
            StatusCategory::Success | StatusCategory::Unknown => self.success += 1,
            StatusCategory::Warning => self.warning += 1,
            StatusCategory::Error => self.error += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.in_progress + self.success + self.warning + self.error
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureEntry {
    pub name: String,
    pub error: String,
    pub failed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InProgressEntry {
    pub name: String,
    pub started_at: DateTime<Utc>,
    /// Resources that would be unblocked once this build completes.
    pub dependents: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingEntry {
    pub name: String,
    pub waiting_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Everything an observer needs to render from scratch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub connection: ConnectionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_retry_at: Option<DateTime<Utc>>,
    pub counts: AggregateCounts,
    pub failures: Vec<FailureEntry>,
    pub in_progress: Vec<InProgressEntry>,
    pub pending: Vec<PendingEntry>,
}

#[cfg(test)]
#[path = "view_tests.rs"]
mod tests;
