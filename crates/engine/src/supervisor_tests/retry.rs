// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Disconnects, backoff and the safety net.

use super::*;

#[tokio::test(start_paused = true)]
async fn exit_while_connected_disconnects_and_schedules_retry() {
    let mut h = harness();
    let mut watch = h.connect().await;
    let _next = h.fake.push_watch();

    watch.write_stderr("connection refused\n").await.unwrap();
    watch.finish(Some(1));

    let next_retry_at = h.wait_for_connection(ConnectionState::Disconnected).await;
    let disconnected_at = Instant::now();
    assert_eq!(h.retry_in_secs(next_retry_at), 1);

    h.wait_for_connection(ConnectionState::Connecting).await;
    assert_elapsed(disconnected_at, Duration::from_secs(1));
    assert_eq!(h.fake.spawn_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn backoff_doubles_until_capped_without_a_decode() {
    let mut h = harness();
    h.handle.start();

    let mut delays = Vec::new();
    let mut first_failure = None;
    for _ in 0..8 {
        let next_retry_at = h.wait_for_connection(ConnectionState::Disconnected).await;
        first_failure.get_or_insert_with(Instant::now);
        delays.push(h.retry_in_secs(next_retry_at));
    }

    assert_eq!(delays, vec![1, 2, 4, 8, 16, 30, 30, 30]);
    assert_elapsed(
        first_failure.unwrap(),
        Duration::from_secs(1 + 2 + 4 + 8 + 16 + 30 + 30),
    );
}

#[tokio::test(start_paused = true)]
async fn process_start_alone_does_not_reset_backoff() {
    let mut h = harness();
    h.fake
        .push_watch_error(AdapterError::SpawnFailed("boom".to_string()));
    let mut silent = h.fake.push_watch();
    silent.finish(Some(1));

    h.handle.start();
    let mut delays = Vec::new();
    for _ in 0..3 {
        let next_retry_at = h.wait_for_connection(ConnectionState::Disconnected).await;
        delays.push(h.retry_in_secs(next_retry_at));
    }
    assert_eq!(delays, vec![1, 2, 4]);
}

#[tokio::test(start_paused = true)]
async fn successful_decode_resets_backoff() {
    let mut h = harness();
    for _ in 0..3 {
        h.fake
            .push_watch_error(AdapterError::SpawnFailed("boom".to_string()));
    }
    let mut watch = h.fake.push_watch();

    h.handle.start();
    for expected in [1, 2, 4] {
        let next_retry_at = h.wait_for_connection(ConnectionState::Disconnected).await;
        assert_eq!(h.retry_in_secs(next_retry_at), expected);
    }

    watch.write_stdout(SVC_A).await.unwrap();
    watch.write_stdout("\n").await.unwrap();
    h.wait_for_connection(ConnectionState::Connected).await;
    watch.finish(Some(1));

    let next_retry_at = h.wait_for_connection(ConnectionState::Disconnected).await;
    assert_eq!(h.retry_in_secs(next_retry_at), 1);
}

#[tokio::test(start_paused = true)]
async fn missing_executable_reports_server_unreachable() {
    let mut h = harness();
    h.fake
        .push_watch_error(AdapterError::NotFound("/usr/local/bin/tilt".to_string()));

    h.handle.start();
    let next_retry_at = h
        .wait_for_connection(ConnectionState::ServerUnreachable)
        .await;
    assert_eq!(h.retry_in_secs(next_retry_at), 1);

    // The next attempt fails differently and is reported as such
    let next_retry_at = h.wait_for_connection(ConnectionState::Disconnected).await;
    assert_eq!(h.retry_in_secs(next_retry_at), 2);
}

#[tokio::test(start_paused = true)]
async fn reconnect_now_resets_backoff_and_skips_pending_retry() {
    let mut h = harness();
    h.handle.start();
    for _ in 0..3 {
        h.wait_for_connection(ConnectionState::Disconnected).await;
    }

    let requested_at = Instant::now();
    h.handle.reconnect_now();
    h.wait_for_connection(ConnectionState::Connecting).await;
    assert!(requested_at.elapsed() < Duration::from_millis(10));

    let next_retry_at = h.wait_for_connection(ConnectionState::Disconnected).await;
    assert_eq!(h.retry_in_secs(next_retry_at), 1);
    assert_eq!(h.fake.spawn_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn child_exit_without_eof_is_force_closed() {
    let mut h = harness();
    let mut watch = h.connect().await;

    let exited_at = Instant::now();
    watch.exit(Some(1));

    h.wait_for_connection(ConnectionState::Disconnected).await;
    assert_elapsed(exited_at, Duration::from_secs(2));
    // Stdout was never closed by the child
    assert!(watch.write_stdout("{}\n").await.is_err());
}

#[tokio::test(start_paused = true)]
async fn eof_without_exit_kills_the_child() {
    let mut h = harness();
    let mut watch = h.connect().await;

    watch.close_stdout();
    h.wait_for_connection(ConnectionState::Disconnected).await;
    assert!(watch.is_killed());
}

#[tokio::test(start_paused = true)]
async fn objects_flushed_before_exit_are_applied() {
    let mut h = harness();
    let mut watch = h.connect().await;

    watch
        .write_stdout("{\"metadata\":{\"name\":\"svc-b\"},\"status\":{}}\n")
        .await
        .unwrap();
    watch.finish(Some(0));

    h.wait_for_connection(ConnectionState::Disconnected).await;
    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.counts, counts(1, 1, 0, 0));
}
