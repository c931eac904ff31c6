// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Watch supervisor, aggregate state store and dependency graph

mod backoff;
pub mod deps;
mod error;
pub mod store;
mod supervisor;

pub use backoff::Backoff;
pub use deps::{fetch_dependents, parse_dependents};
pub use error::DependencyError;
pub use store::StateStore;
pub use supervisor::{Supervisor, SupervisorConfig, SupervisorHandle};
