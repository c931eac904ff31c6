// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor tests.
//!
//! Every test runs on a paused tokio clock against the fake adapter, so
//! backoff, grace and refresh timings are exact.

mod dependencies;
mod lifecycle;
mod reaper;
mod retry;

use super::*;
use chrono::{DateTime, Utc};
use tb_adapters::{FakeTiltAdapter, FakeWatch, TiltCall};
use tb_core::{AggregateCounts, EventKind, FakeClock};

/// One resource with a build running.
const SVC_A: &str = r#"{"metadata":{"name":"svc-a"},"status":{"currentBuild":{"startTime":"2024-01-01T00:00:00Z"}}}"#;

/// The same resource as the tool pretty-prints it.
const SVC_A_PRETTY: &str = r#"{
  "metadata": {
    "name": "svc-a"
  },
  "status": {
    "currentBuild": {
      "startTime": "2024-01-01T00:00:00Z"
    }
  }
}
"#;

/// Engine dump in which `b` depends on `svc-a`.
const SVC_A_HAS_DEPENDENT: &str =
    r#"{"ManifestTargets":{"t1":{"Manifest":{"Name":"b","ResourceDependencies":["svc-a"]}}}}"#;

struct Harness {
    fake: FakeTiltAdapter,
    clock: FakeClock,
    handle: SupervisorHandle,
    events: mpsc::UnboundedReceiver<Event>,
}

fn harness() -> Harness {
    let fake = FakeTiltAdapter::new();
    let clock = FakeClock::new();
    let (handle, events) = Supervisor::spawn(fake.clone(), clock.clone(), SupervisorConfig::default());
    Harness {
        fake,
        clock,
        handle,
        events,
    }
}

fn counts(in_progress: usize, success: usize, warning: usize, error: usize) -> AggregateCounts {
    AggregateCounts {
        in_progress,
        success,
        warning,
        error,
    }
}

impl Harness {
    async fn next_event(&mut self) -> Event {
        tokio::time::timeout(Duration::from_secs(600), self.events.recv())
            .await
            .expect("timed out waiting for an event")
            .expect("event stream closed")
    }

    /// Skip events until the connection enters `state`; returns its retry time.
    async fn wait_for_connection(&mut self, state: ConnectionState) -> Option<DateTime<Utc>> {
        loop {
            if let Event::ConnectionChanged {
                state: seen,
                next_retry_at,
            } = self.next_event().await
            {
                if seen == state {
                    return next_retry_at;
                }
            }
        }
    }

    async fn wait_for_kind(&mut self, kind: EventKind) -> Event {
        loop {
            let event = self.next_event().await;
            if event.kind() == kind {
                return event;
            }
        }
    }

    /// Start and connect on a fresh watch that has emitted `SVC_A`.
    async fn connect(&mut self) -> FakeWatch {
        let mut watch = self.fake.push_watch();
        self.handle.start();
        watch.write_stdout(SVC_A).await.unwrap();
        watch.write_stdout("\n").await.unwrap();
        self.wait_for_connection(ConnectionState::Connected).await;
        self.wait_for_kind(EventKind::InProgress).await;
        watch
    }

    /// Let spawned tasks run without crossing any timer deadline of note.
    async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    /// Events already delivered and not yet consumed.
    fn drain(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    /// Seconds between the fake wall clock and a scheduled retry.
    fn retry_in_secs(&self, next_retry_at: Option<DateTime<Utc>>) -> i64 {
        (next_retry_at.expect("retry scheduled") - self.clock.utc_now()).num_seconds()
    }

    fn dump_count(&self) -> usize {
        self.fake
            .calls()
            .iter()
            .filter(|c| **c == TiltCall::DumpEngine)
            .count()
    }
}

/// Assert `since` was `expected` ago, allowing for timer-wheel rounding.
#[track_caller]
fn assert_elapsed(since: Instant, expected: Duration) {
    let elapsed = since.elapsed();
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_millis(10),
        "expected ~{expected:?} to have elapsed, got {elapsed:?}"
    );
}
