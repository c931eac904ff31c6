// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subcommand implementations.
//!
//! Each command is generic over the adapter and clock so tests drive it
//! with the fakes on a paused runtime.

pub mod deps;
pub mod status;
pub mod trigger;
pub mod url;
pub mod watch;
