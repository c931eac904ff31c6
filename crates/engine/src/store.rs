// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Aggregate state store.
//!
//! Holds the latest record per resource and every view derived from them.
//! Views are recomputed from the full record set on each mutation and
//! compared with the previously published value, so a mutation only yields
//! events for the views it actually changed and replaying an update is a
//! no-op.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tb_core::{
    classify, AggregateCounts, Clock, ConnectionState, DependentsMap, Event, FailureEntry,
    InProgressEntry, PendingEntry, ResourceRecord, StatusCategory, StatusSnapshot, MAX_FAILURES,
    MAX_IN_PROGRESS, MAX_PENDING,
};

/// Failure text for an error reported only through `updateStatus`.
pub const UPDATE_ERROR_TEXT: &str = "update failed";

/// Failure text for an error reported only through `runtimeStatus`.
pub const RUNTIME_ERROR_TEXT: &str = "runtime error";

/// Single owner of resource state and its derived views.
pub struct StateStore<C: Clock> {
    clock: C,
    records: BTreeMap<String, ResourceRecord>,
    /// `None` until the first dependency refresh lands.
    dependents: Option<DependentsMap>,
    /// When each resource was first seen in error, for failures without a finish time.
    error_since: HashMap<String, DateTime<Utc>>,
    connection: ConnectionState,
    next_retry_at: Option<DateTime<Utc>>,
    counts: AggregateCounts,
    failures: Vec<FailureEntry>,
    in_progress: Vec<InProgressEntry>,
    pending: Vec<PendingEntry>,
}

impl<C: Clock> StateStore<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            records: BTreeMap::new(),
            dependents: None,
            error_since: HashMap::new(),
            connection: ConnectionState::default(),
            next_retry_at: None,
            counts: AggregateCounts::default(),
            failures: Vec::new(),
            in_progress: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Replace the record for one resource.
    pub fn apply_update(&mut self, record: ResourceRecord) -> Vec<Event> {
        let name = record.name().to_string();
        if classify(Some(&record)) == StatusCategory::Error {
            let now = self.clock.utc_now();
            self.error_since.entry(name.clone()).or_insert(now);
        } else {
            self.error_since.remove(&name);
        }
        self.records.insert(name, record);
        self.recompute()
    }

    /// Replace the dependents map wholesale.
    pub fn apply_dependents(&mut self, dependents: DependentsMap) -> Vec<Event> {
        self.dependents = Some(dependents);
        self.recompute()
    }

    /// Drop every record and derived view.
    pub fn clear(&mut self) -> Vec<Event> {
        self.records.clear();
        self.error_since.clear();
        self.dependents = None;
        self.recompute()
    }

    pub fn set_connection(
        &mut self,
        state: ConnectionState,
        next_retry_at: Option<DateTime<Utc>>,
    ) -> Vec<Event> {
        if self.connection == state && self.next_retry_at == next_retry_at {
            return Vec::new();
        }
        self.connection = state;
        self.next_retry_at = next_retry_at;
        vec![Event::ConnectionChanged {
            state,
            next_retry_at,
        }]
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn record(&self, name: &str) -> Option<&ResourceRecord> {
        self.records.get(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn dependents(&self) -> Option<&DependentsMap> {
        self.dependents.as_ref()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            connection: self.connection,
            next_retry_at: self.next_retry_at,
            counts: self.counts,
            failures: self.failures.clone(),
            in_progress: self.in_progress.clone(),
            pending: self.pending.clone(),
        }
    }

    fn dependent_count(&self, name: &str) -> usize {
        self.dependents
            .as_ref()
            .and_then(|d| d.get(name))
            .map_or(0, Vec::len)
    }

    fn recompute(&mut self) -> Vec<Event> {
        let mut counts = AggregateCounts::default();
        let mut failures = Vec::new();
        let mut in_progress = Vec::new();
        let mut pending = Vec::new();

        for record in self.records.values() {
            let category = classify(Some(record));
            counts.record(category);
            match category {
                StatusCategory::Error => failures.push(self.failure_entry(record)),
                StatusCategory::InProgress => match record.active_build_start() {
                    Some(started_at) => in_progress.push(InProgressEntry {
                        name: record.name().to_string(),
                        started_at,
                        dependents: self.dependent_count(record.name()),
                    }),
                    None => pending.push(PendingEntry {
                        name: record.name().to_string(),
                        waiting_on: record.waiting_on(),
                        reason: record.waiting_reason(),
                    }),
                },
                _ => {}
            }
        }

        failures.sort_by(|a, b| {
            b.failed_at
                .cmp(&a.failed_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        failures.truncate(MAX_FAILURES);

        in_progress.sort_by(|a, b| {
            b.dependents
                .cmp(&a.dependents)
                .then_with(|| a.started_at.cmp(&b.started_at))
                .then_with(|| a.name.cmp(&b.name))
        });
        in_progress.truncate(MAX_IN_PROGRESS);

        // Records iterate in name order, so pending is already alphabetical.
        if self.dependents.is_some() {
            pending.retain(|p| self.dependent_count(&p.name) > 0);
        }
        pending.truncate(MAX_PENDING);

        let mut events = Vec::new();
        if counts != self.counts {
            self.counts = counts;
            events.push(Event::CountsChanged { counts });
        }
        if failures != self.failures {
            self.failures = failures.clone();
            events.push(Event::FailuresChanged { failures });
        }
        if in_progress != self.in_progress {
            self.in_progress = in_progress.clone();
            events.push(Event::InProgressChanged {
                builds: in_progress,
            });
        }
        if pending != self.pending {
            self.pending = pending.clone();
            events.push(Event::PendingChanged { pending });
        }
        events
    }

    fn failure_entry(&self, record: &ResourceRecord) -> FailureEntry {
        let failed_build = record.last_build().filter(|b| b.error_text().is_some());
        let error = match failed_build.and_then(|b| b.error_text()) {
            Some(text) => text.to_string(),
            None if record.status.as_ref().and_then(|s| s.update_status.as_deref())
                == Some("error") =>
            {
                UPDATE_ERROR_TEXT.to_string()
            }
            None => RUNTIME_ERROR_TEXT.to_string(),
        };
        let failed_at = failed_build
            .and_then(|b| b.finish_time)
            .or_else(|| self.error_since.get(record.name()).copied())
            .unwrap_or_else(|| self.clock.utc_now());
        FailureEntry {
            name: record.name().to_string(),
            error,
            failed_at,
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
