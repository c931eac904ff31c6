// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stale state clearing after a disconnect.

use super::*;

#[tokio::test(start_paused = true)]
async fn state_is_cleared_when_grace_period_elapses() {
    let mut h = harness();
    let mut watch = h.connect().await;

    watch.finish(Some(1));
    h.wait_for_connection(ConnectionState::Disconnected).await;
    let disconnected_at = Instant::now();

    // Retries keep failing in the meantime; the first deadline stands
    assert_eq!(
        h.wait_for_kind(EventKind::Counts).await,
        Event::CountsChanged {
            counts: counts(0, 0, 0, 0),
        }
    );
    assert_elapsed(disconnected_at, Duration::from_secs(5));
    assert_eq!(
        h.next_event().await,
        Event::InProgressChanged { builds: vec![] }
    );
    assert!(h.fake.spawn_count() >= 3);

    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.counts.total(), 0);
    assert!(snapshot.in_progress.is_empty());
}

#[tokio::test(start_paused = true)]
async fn reconnect_within_grace_period_keeps_state() {
    let mut h = harness();
    let mut first = h.connect().await;
    let mut second = h.fake.push_watch();
    let before = h.handle.snapshot().await.unwrap();

    first.finish(Some(1));
    h.wait_for_connection(ConnectionState::Disconnected).await;
    let disconnected_at = Instant::now();

    tokio::time::sleep_until(disconnected_at + Duration::from_secs(2)).await;
    second.write_stdout(SVC_A).await.unwrap();
    second.write_stdout("\n").await.unwrap();
    h.wait_for_connection(ConnectionState::Connected).await;

    tokio::time::sleep(Duration::from_secs(10)).await;
    let views: Vec<EventKind> = h
        .drain()
        .iter()
        .map(Event::kind)
        .filter(|k| *k != EventKind::Connection)
        .collect();
    assert!(views.is_empty(), "unexpected view changes: {views:?}");

    let after = h.handle.snapshot().await.unwrap();
    assert_eq!(after.counts, before.counts);
    assert_eq!(after.in_progress, before.in_progress);
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_pending_clear() {
    let mut h = harness();
    let mut watch = h.connect().await;

    watch.finish(Some(1));
    h.wait_for_connection(ConnectionState::Disconnected).await;
    h.handle.stop();

    tokio::time::sleep(Duration::from_secs(30)).await;
    let kinds: Vec<EventKind> = h.drain().iter().map(Event::kind).collect();
    assert_eq!(kinds, vec![EventKind::Connection]);
    assert_eq!(h.handle.snapshot().await.unwrap().counts, counts(1, 0, 0, 0));
}
