// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dependency graph refresh.

use super::*;

async fn wait_for_dependents(h: &mut Harness, expected: usize) {
    loop {
        if let Event::InProgressChanged { builds } = h.wait_for_kind(EventKind::InProgress).await {
            if builds.first().map(|b| b.dependents) == Some(expected) {
                return;
            }
        }
    }
}

#[tokio::test(start_paused = true)]
async fn connecting_fetches_the_graph_and_annotates_builds() {
    let mut h = harness();
    h.fake.set_engine_dump(Some(SVC_A_HAS_DEPENDENT));

    let _watch = h.connect().await;
    wait_for_dependents(&mut h, 1).await;

    assert_eq!(h.dump_count(), 1);
    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.in_progress[0].dependents, 1);
}

#[tokio::test(start_paused = true)]
async fn graph_refreshes_periodically_while_connected() {
    let mut h = harness();
    h.fake.set_engine_dump(Some("{}"));
    let _watch = h.connect().await;

    tokio::time::sleep(Duration::from_secs(65)).await;
    assert_eq!(h.dump_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn refresh_stops_once_disconnected() {
    let mut h = harness();
    h.fake.set_engine_dump(Some("{}"));
    let mut watch = h.connect().await;
    h.settle().await;

    watch.finish(Some(1));
    h.wait_for_connection(ConnectionState::Disconnected).await;

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(h.dump_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_refresh_keeps_previous_graph() {
    let mut h = harness();
    h.fake.set_engine_dump(Some(SVC_A_HAS_DEPENDENT));
    let _watch = h.connect().await;
    wait_for_dependents(&mut h, 1).await;

    h.fake.set_engine_dump(Some("not json"));
    tokio::time::sleep(Duration::from_secs(31)).await;
    h.fake.set_engine_dump(None);
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert_eq!(h.dump_count(), 3);
    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.in_progress[0].dependents, 1);
}
