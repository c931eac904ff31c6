// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Text and JSON rendering of change events, snapshots and the dependency graph.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use tb_core::{
    format_since, format_until, AggregateCounts, ConnectionState, DependentsMap, Event,
    FailureEntry, InProgressEntry, PendingEntry, StatusSnapshot,
};

use crate::color;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Renders values in one output format.
#[derive(Clone, Copy, Debug)]
pub struct Renderer {
    format: OutputFormat,
    colorize: bool,
}

impl Renderer {
    /// Colors follow [`color::should_colorize`].
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: format == OutputFormat::Text && color::should_colorize(),
        }
    }

    /// Never emits color codes (for tests).
    #[cfg(test)]
    pub fn plain(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: false,
        }
    }

    /// One line per change event.
    pub fn event(&self, event: &Event, now: DateTime<Utc>) -> anyhow::Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string(event)?);
        }
        let line = match event {
            Event::ConnectionChanged {
                state,
                next_retry_at,
            } => format!(
                "{} {}",
                self.header("connection:"),
                self.connection(*state, *next_retry_at, now)
            ),
            Event::CountsChanged { counts } => {
                format!("{} {}", self.header("counts:"), self.counts(counts))
            }
            Event::FailuresChanged { failures } => format!(
                "{} {}",
                self.header("failures:"),
                joined(failures, |f| format!(
                    "{} ({} ago)",
                    f.name,
                    format_since(f.failed_at, now)
                ))
            ),
            Event::InProgressChanged { builds } => format!(
                "{} {}",
                self.header("building:"),
                joined(builds, |b| format!("{} ({})", b.name, build_detail(b, now)))
            ),
            Event::PendingChanged { pending } => format!(
                "{} {}",
                self.header("pending:"),
                joined(pending, |p| match waiting_detail(p) {
                    Some(detail) => format!("{} ({detail})", p.name),
                    None => p.name.clone(),
                })
            ),
        };
        Ok(line)
    }

    /// Full multi-line status report.
    pub fn snapshot(&self, snapshot: &StatusSnapshot, now: DateTime<Utc>) -> anyhow::Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(snapshot)?);
        }
        let mut out = Vec::new();
        out.push(format!(
            "{} {}",
            self.header("connection:"),
            self.connection(snapshot.connection, snapshot.next_retry_at, now)
        ));
        out.push(format!(
            "{} {}",
            self.header("counts:"),
            self.counts(&snapshot.counts)
        ));

        out.push(self.header("failures:"));
        self.section(&mut out, &snapshot.failures, |f| self.failure_line(f, now));
        out.push(self.header("building:"));
        self.section(&mut out, &snapshot.in_progress, |b| {
            format!("{}  {}", b.name, self.muted(&build_detail(b, now)))
        });
        out.push(self.header("pending:"));
        self.section(&mut out, &snapshot.pending, |p| match waiting_detail(p) {
            Some(detail) => format!("{}  {}", p.name, self.muted(&detail)),
            None => p.name.clone(),
        });
        Ok(out.join("\n"))
    }

    /// Each resource followed by the resources that depend on it.
    pub fn dependents(&self, map: &DependentsMap) -> anyhow::Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(map)?);
        }
        if map.is_empty() {
            return Ok(self.muted("no dependencies"));
        }
        let width = map.keys().map(String::len).max().unwrap_or(0);
        Ok(map
            .iter()
            .map(|(name, dependents)| {
                format!("{name:<width$}  <- {}", dependents.join(", "))
            })
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// A resource's web UI link.
    pub fn url(&self, name: &str, url: &str) -> anyhow::Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::json!({ "name": name, "url": url }).to_string());
        }
        Ok(url.to_string())
    }

    /// Result of a manual trigger.
    pub fn triggered(&self, name: &str) -> anyhow::Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::json!({ "triggered": name }).to_string());
        }
        Ok(format!("Triggered {name}"))
    }

    fn connection(
        &self,
        state: ConnectionState,
        next_retry_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> String {
        let state_text = if self.colorize {
            color::apply_connection(state)
        } else {
            state.to_string()
        };
        match next_retry_at {
            Some(at) => format!(
                "{state_text} {}",
                self.muted(&format!("(next retry in {})", format_until(at, now)))
            ),
            None => state_text,
        }
    }

    fn counts(&self, counts: &AggregateCounts) -> String {
        let errors = format!("{} error", counts.error);
        format!(
            "{} in progress, {} ok, {} warning, {}",
            counts.in_progress,
            counts.success,
            counts.warning,
            if self.colorize && counts.error > 0 {
                color::apply_error(&errors)
            } else {
                errors
            }
        )
    }

    fn failure_line(&self, failure: &FailureEntry, now: DateTime<Utc>) -> String {
        let summary = failure.error.lines().next().unwrap_or_default();
        format!(
            "{}  {}  {}",
            failure.name,
            self.muted(&format!("{} ago", format_since(failure.failed_at, now))),
            summary
        )
    }

    fn section<T>(&self, out: &mut Vec<String>, items: &[T], line: impl Fn(&T) -> String) {
        if items.is_empty() {
            out.push(format!("  {}", self.muted("(none)")));
        }
        for item in items {
            out.push(format!("  {}", line(item)));
        }
    }

    fn header(&self, text: &str) -> String {
        if self.colorize {
            color::apply_header(text)
        } else {
            text.to_string()
        }
    }

    fn muted(&self, text: &str) -> String {
        if self.colorize {
            color::apply_muted(text)
        } else {
            text.to_string()
        }
    }
}

fn joined<T>(items: &[T], item: impl Fn(&T) -> String) -> String {
    if items.is_empty() {
        return "none".to_string();
    }
    items.iter().map(item).collect::<Vec<_>>().join(", ")
}

fn build_detail(build: &InProgressEntry, now: DateTime<Utc>) -> String {
    let elapsed = format_since(build.started_at, now);
    match build.dependents {
        0 => elapsed,
        1 => format!("{elapsed}, 1 dependent"),
        n => format!("{elapsed}, {n} dependents"),
    }
}

fn waiting_detail(pending: &PendingEntry) -> Option<String> {
    match (pending.waiting_on.is_empty(), &pending.reason) {
        (false, _) => Some(format!("waiting on {}", pending.waiting_on.join(", "))),
        (true, Some(reason)) => Some(reason.clone()),
        (true, None) => None,
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
