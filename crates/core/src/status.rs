// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource status classification.

use crate::resource::ResourceRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse status bucket a resource is counted and displayed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    InProgress,
    Success,
    Warning,
    Error,
    Unknown,
}

impl StatusCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCategory::InProgress => "in_progress",
            StatusCategory::Success => "success",
            StatusCategory::Warning => "warning",
            StatusCategory::Error => "error",
            StatusCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a resource record.
///
/// Precedence, highest first:
/// 1. an active build marker is always `InProgress`
/// 2. `updateStatus`: error / warning / in_progress|pending (`ok` falls through)
/// 3. the most recent build: error text, then warnings
/// 4. `runtimeStatus`: error / warning / pending
/// 5. otherwise `Success`
///
/// A missing record or a record without `status` is `Unknown`.
pub fn classify(record: Option<&ResourceRecord>) -> StatusCategory {
    let Some(record) = record else {
        return StatusCategory::Unknown;
    };
    let Some(status) = record.status.as_ref() else {
        return StatusCategory::Unknown;
    };

    if record.is_building() {
        return StatusCategory::InProgress;
    }

    match status.update_status.as_deref() {
        Some("error") => return StatusCategory::Error,
        Some("warning") => return StatusCategory::Warning,
        Some("in_progress") | Some("pending") => return StatusCategory::InProgress,
        _ => {}
    }

    if let Some(last) = record.last_build() {
        if last.error_text().is_some() {
            return StatusCategory::Error;
        }
        if !last.warnings.is_empty() {
            return StatusCategory::Warning;
        }
    }

    match status.runtime_status.as_deref() {
        Some("error") => StatusCategory::Error,
        Some("warning") => StatusCategory::Warning,
        Some("pending") => StatusCategory::InProgress,
        _ => StatusCategory::Success,
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
