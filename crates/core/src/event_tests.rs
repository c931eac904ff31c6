// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn counts(error: usize) -> Event {
    Event::CountsChanged {
        counts: AggregateCounts {
            error,
            ..AggregateCounts::default()
        },
    }
}

#[test]
fn serializes_with_type_tag() {
    let event = Event::ConnectionChanged {
        state: ConnectionState::ServerUnreachable,
        next_retry_at: None,
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"type": "connection:changed", "state": "server_unreachable"})
    );

    let back: Event = serde_json::from_value(json).unwrap();
    assert_eq!(back, event);
}

#[test]
fn counts_event_shape() {
    let json = serde_json::to_value(counts(2)).unwrap();
    assert_eq!(json["type"], "counts:changed");
    assert_eq!(json["counts"]["error"], 2);
    assert_eq!(json["counts"]["success"], 0);
}

#[test]
fn latest_per_kind_keeps_newest() {
    let events = vec![
        counts(1),
        Event::PendingChanged { pending: vec![] },
        counts(3),
        Event::ConnectionChanged {
            state: ConnectionState::Connected,
            next_retry_at: None,
        },
    ];

    let latest = latest_per_kind(events);

    assert_eq!(latest.len(), 3);
    assert_eq!(latest[0], counts(3));
    assert_eq!(latest[1].kind(), EventKind::Connection);
    assert_eq!(latest[2].kind(), EventKind::Pending);
}

#[test]
fn log_summary_names_the_view() {
    assert_eq!(
        counts(1).log_summary(),
        "counts:changed in_progress=0 success=0 warning=0 error=1"
    );
    assert_eq!(
        Event::FailuresChanged { failures: vec![] }.log_summary(),
        "failures:changed count=0"
    );
}
