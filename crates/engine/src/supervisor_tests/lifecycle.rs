// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Start, decode, stop and shutdown.

use super::*;
use tb_core::test_support::ts;
use tb_core::InProgressEntry;

#[tokio::test(start_paused = true)]
async fn first_object_connects_and_publishes_views() {
    let mut h = harness();
    let mut watch = h.fake.push_watch();

    h.handle.start();
    assert_eq!(
        h.next_event().await,
        Event::ConnectionChanged {
            state: ConnectionState::Connecting,
            next_retry_at: None,
        }
    );

    watch.write_stdout(SVC_A_PRETTY).await.unwrap();

    assert_eq!(
        h.next_event().await,
        Event::ConnectionChanged {
            state: ConnectionState::Connected,
            next_retry_at: None,
        }
    );
    assert_eq!(
        h.next_event().await,
        Event::CountsChanged {
            counts: counts(1, 0, 0, 0),
        }
    );
    let expected = vec![InProgressEntry {
        name: "svc-a".to_string(),
        started_at: ts("2024-01-01T00:00:00Z"),
        dependents: 0,
    }];
    assert_eq!(
        h.next_event().await,
        Event::InProgressChanged {
            builds: expected.clone(),
        }
    );

    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.connection, ConnectionState::Connected);
    assert_eq!(snapshot.in_progress, expected);
    assert_eq!(h.fake.calls()[0], TiltCall::SpawnWatch);
}

#[tokio::test(start_paused = true)]
async fn undecodable_objects_are_skipped_without_reconnecting() {
    let mut h = harness();
    let mut watch = h.fake.push_watch();
    h.handle.start();

    watch.write_stdout("not json at all\n").await.unwrap();
    watch.write_stdout("{\"metadata\": 42}\n").await.unwrap();
    watch.write_stdout(SVC_A_PRETTY).await.unwrap();

    h.wait_for_connection(ConnectionState::Connected).await;
    h.wait_for_kind(EventKind::InProgress).await;

    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.counts, counts(1, 0, 0, 0));
    assert_eq!(h.fake.spawn_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn updates_are_applied_in_stream_order() {
    let mut h = harness();
    let mut watch = h.connect().await;

    watch
        .write_stdout(r#"{"metadata":{"name":"svc-a"},"status":{"buildHistory":[{"error":"boom","finishTime":"2024-01-01T00:01:00Z"}]}}"#)
        .await
        .unwrap();
    watch
        .write_stdout("\n{\"metadata\":{\"name\":\"svc-a\"},\"status\":{}}\n")
        .await
        .unwrap();

    assert_eq!(
        h.wait_for_kind(EventKind::Counts).await,
        Event::CountsChanged {
            counts: counts(0, 0, 0, 1),
        }
    );
    assert_eq!(
        h.wait_for_kind(EventKind::Counts).await,
        Event::CountsChanged {
            counts: counts(0, 1, 0, 0),
        }
    );
    assert!(h.handle.snapshot().await.unwrap().failures.is_empty());
}

#[tokio::test(start_paused = true)]
async fn stop_kills_the_child_and_is_idempotent() {
    let mut h = harness();
    let watch = h.connect().await;

    h.handle.stop();
    assert_eq!(
        h.next_event().await,
        Event::ConnectionChanged {
            state: ConnectionState::Disconnected,
            next_retry_at: None,
        }
    );
    h.settle().await;
    assert!(watch.is_killed());

    h.handle.stop();
    tokio::time::sleep(Duration::from_secs(120)).await;

    assert!(h.drain().is_empty());
    assert_eq!(h.fake.spawn_count(), 1);
    // Resource state is left as it was
    assert_eq!(h.handle.snapshot().await.unwrap().counts, counts(1, 0, 0, 0));
}

#[tokio::test(start_paused = true)]
async fn stop_before_start_emits_nothing() {
    let mut h = harness();
    h.handle.stop();
    h.settle().await;
    assert!(h.drain().is_empty());
    assert!(h.fake.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn start_replaces_the_running_session() {
    let mut h = harness();
    let mut first = h.connect().await;
    let mut second = h.fake.push_watch();

    h.handle.start();
    h.wait_for_connection(ConnectionState::Connecting).await;
    h.settle().await;
    assert!(first.is_killed());

    // Output from the replaced session is ignored
    let _ = first
        .write_stdout("{\"metadata\":{\"name\":\"svc-b\"}}\n")
        .await;
    second.write_stdout(SVC_A).await.unwrap();
    second.write_stdout("\n").await.unwrap();
    h.wait_for_connection(ConnectionState::Connected).await;

    h.settle().await;
    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.counts.total(), 1);
    assert_eq!(h.fake.spawn_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn trigger_runs_one_shot_and_only_logs_failures() {
    let mut h = harness();
    h.fake.fail_trigger("db", "no such resource");

    h.handle.trigger("api");
    h.handle.trigger("db");
    h.settle().await;

    assert_eq!(
        h.fake.calls(),
        vec![
            TiltCall::Trigger("api".to_string()),
            TiltCall::Trigger("db".to_string()),
        ]
    );
    assert!(h.drain().is_empty());
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_watch_and_exits() {
    let mut h = harness();
    let watch = h.connect().await;
    let observer = h.handle.clone();

    h.handle.clone().shutdown().await;
    h.settle().await;

    assert!(watch.is_killed());
    assert!(observer.snapshot().await.is_none());
    assert_eq!(
        h.wait_for_connection(ConnectionState::Disconnected).await,
        None
    );
}
