// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builders for resource records in tests.

use crate::resource::{
    BuildRecord, CurrentBuild, ResourceMetadata, ResourceRecord, ResourceStatus, Waiting,
    WaitingOn,
};
use chrono::{DateTime, Utc};

/// Parse an RFC 3339 timestamp, panicking on malformed test input.
#[allow(clippy::expect_used)]
pub fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("valid test timestamp")
        .with_timezone(&Utc)
}

/// Fluent builder for a [`ResourceRecord`] with a `status` block.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    name: String,
    status: ResourceStatus,
}

impl RecordBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: ResourceStatus::default(),
        }
    }

    /// Mark a build as running since `start`.
    pub fn building(mut self, start: &str) -> Self {
        self.status.current_build = Some(CurrentBuild {
            start_time: Some(ts(start)),
        });
        self
    }

    /// Prepend a failed build that finished at `finish`.
    pub fn failed(mut self, error: &str, finish: &str) -> Self {
        self.status.build_history.insert(
            0,
            BuildRecord {
                error: Some(error.to_string()),
                finish_time: Some(ts(finish)),
                ..BuildRecord::default()
            },
        );
        self
    }

    /// Prepend a clean build that finished at `finish`.
    pub fn succeeded(mut self, finish: &str) -> Self {
        self.status.build_history.insert(
            0,
            BuildRecord {
                finish_time: Some(ts(finish)),
                ..BuildRecord::default()
            },
        );
        self
    }

    pub fn warned(mut self, warning: &str) -> Self {
        self.status.build_history.insert(
            0,
            BuildRecord {
                warnings: vec![warning.to_string()],
                ..BuildRecord::default()
            },
        );
        self
    }

    pub fn update_status(mut self, status: &str) -> Self {
        self.status.update_status = Some(status.to_string());
        self
    }

    pub fn runtime_status(mut self, status: &str) -> Self {
        self.status.runtime_status = Some(status.to_string());
        self
    }

    /// Waiting on the named resources for `reason`.
    pub fn waiting(mut self, on: &[&str], reason: &str) -> Self {
        self.status.waiting = Some(Waiting {
            on: on
                .iter()
                .map(|n| WaitingOn {
                    name: Some(n.to_string()),
                })
                .collect(),
            reason: Some(reason.to_string()),
        });
        self
    }

    pub fn build(self) -> ResourceRecord {
        ResourceRecord {
            metadata: ResourceMetadata { name: self.name },
            status: Some(self.status),
        }
    }
}

/// A record with no `status` block at all.
pub fn bare_record(name: &str) -> ResourceRecord {
    ResourceRecord {
        metadata: ResourceMetadata {
            name: name.to_string(),
        },
        status: None,
    }
}
