// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::IsTerminal;

use tb_core::ConnectionState;

pub mod codes {
    /// Section headers: pastel cyan / steel blue
    pub const HEADER: u8 = 74;
    /// Muted / secondary text: darker grey
    pub const MUTED: u8 = 240;

    #[cfg(test)]
    pub const HEADER_START: &str = "\x1b[38;5;74m";
    #[cfg(test)]
    pub const RESET: &str = "\x1b[0m";
}

/// Determine if color output should be enabled.
///
/// Priority: `NO_COLOR=1` disables → `COLOR=1` forces → TTY check.
pub fn should_colorize() -> bool {
    if crate::env::no_color() {
        return false;
    }
    if crate::env::force_color() {
        return true;
    }
    std::io::stdout().is_terminal()
}

fn fg256(code: u8) -> String {
    format!("\x1b[38;5;{code}m")
}

const RESET: &str = "\x1b[0m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";

/// Apply header color unconditionally (caller decides whether to use this).
pub(crate) fn apply_header(text: &str) -> String {
    format!("{}{}{}", fg256(codes::HEADER), text, RESET)
}

/// Apply muted color unconditionally (caller decides whether to use this).
pub(crate) fn apply_muted(text: &str) -> String {
    format!("{}{}{}", fg256(codes::MUTED), text, RESET)
}

/// Green when connected, yellow while connecting, red otherwise.
pub(crate) fn apply_connection(state: ConnectionState) -> String {
    let code = match state {
        ConnectionState::Connected => GREEN,
        ConnectionState::Connecting => YELLOW,
        ConnectionState::Disconnected | ConnectionState::ServerUnreachable => RED,
    };
    format!("{code}{state}{RESET}")
}

pub(crate) fn apply_error(text: &str) -> String {
    format!("{RED}{text}{RESET}")
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
