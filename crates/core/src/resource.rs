// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource records as streamed by `tilt get uiresources --watch --output json`.
//!
//! Only the subset of the schema the status bar consumes is modelled; unknown
//! fields are ignored. Each decoded object is a complete snapshot of one
//! resource and replaces any previous record with the same name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize `null` as the type's default (Go omits or nulls empty slices).
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One resource snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub metadata: ResourceMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ResourceStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMetadata {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStatus {
    /// Completed builds, most recent first.
    #[serde(default, deserialize_with = "null_as_default")]
    pub build_history: Vec<BuildRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_build: Option<CurrentBuild>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waiting: Option<Waiting>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_time: Option<DateTime<Utc>>,
}

/// Marker for a build that is running right now.
///
/// The tool reports an idle resource as an empty object, so the marker is
/// only active when it carries a start time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentBuild {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waiting {
    #[serde(default, deserialize_with = "null_as_default")]
    pub on: Vec<WaitingOn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingOn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ResourceRecord {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Start time of the build currently running, if any.
    pub fn active_build_start(&self) -> Option<DateTime<Utc>> {
        self.status
            .as_ref()?
            .current_build
            .as_ref()
            .and_then(|b| b.start_time)
    }

    pub fn is_building(&self) -> bool {
        self.active_build_start().is_some()
    }

    /// The most recent completed build.
    pub fn last_build(&self) -> Option<&BuildRecord> {
        self.status.as_ref()?.build_history.first()
    }

    /// Names of the resources this one is waiting on.
    pub fn waiting_on(&self) -> Vec<String> {
        self.status
            .as_ref()
            .and_then(|s| s.waiting.as_ref())
            .map(|w| w.on.iter().filter_map(|r| r.name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn waiting_reason(&self) -> Option<String> {
        self.status
            .as_ref()?
            .waiting
            .as_ref()?
            .reason
            .clone()
            .filter(|r| !r.is_empty())
    }
}

impl BuildRecord {
    /// Error text, if the build failed with a non-empty message.
    pub fn error_text(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
