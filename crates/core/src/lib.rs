// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tb-core: data model and pure rules for the Tilt status bar

pub mod clock;
pub mod connection;
pub mod event;
pub mod resource;
pub mod status;
pub mod time_fmt;
pub mod view;
pub mod web;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use connection::ConnectionState;
pub use event::{latest_per_kind, Event, EventKind};
pub use resource::{
    BuildRecord, CurrentBuild, ResourceMetadata, ResourceRecord, ResourceStatus, Waiting,
    WaitingOn,
};
pub use status::{classify, StatusCategory};
pub use time_fmt::{format_duration, format_elapsed, format_since, format_until};
pub use view::{
    AggregateCounts, DependentsMap, FailureEntry, InProgressEntry, PendingEntry, StatusSnapshot,
    MAX_FAILURES, MAX_IN_PROGRESS, MAX_PENDING,
};
pub use web::{WebUrl, WebUrlError};
