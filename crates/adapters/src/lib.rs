// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the orchestration CLI and its output streams

mod env;
pub mod framer;
pub mod subprocess;
pub mod tilt;
pub mod traced;

pub use framer::{ObjectFramer, ObjectReader, StreamEnd};
pub use tilt::{
    AdapterError, PipeReader, TiltAdapter, TiltCli, WatchChild, WatchProcess, DEFAULT_TILT_PATH,
};
pub use traced::TracedTilt;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use tilt::{FakeTiltAdapter, FakeWatch, TiltCall};
