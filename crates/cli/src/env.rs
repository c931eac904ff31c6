// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI crate.

use std::path::PathBuf;

use crate::config::ConfigError;

// --- State directory ---

/// Resolve state directory: TILTBAR_STATE_DIR > XDG_STATE_HOME/tiltbar > ~/.local/state/tiltbar
pub fn state_dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = non_empty("TILTBAR_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = non_empty("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("tiltbar"));
    }
    let home = std::env::var("HOME").map_err(|_| ConfigError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/tiltbar"))
}

// --- Configuration ---

/// Config file location: TILTBAR_CONFIG > <config_dir>/tiltbar/config.toml
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = non_empty("TILTBAR_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("tiltbar").join("config.toml"))
}

pub fn tilt_path() -> Option<PathBuf> {
    non_empty("TILTBAR_TILT_PATH").map(PathBuf::from)
}

pub fn web_url() -> Option<String> {
    non_empty("TILTBAR_WEB_URL")
}

// --- Color ---

pub fn no_color() -> bool {
    std::env::var("NO_COLOR").is_ok_and(|v| v == "1")
}

pub fn force_color() -> bool {
    std::env::var("COLOR").is_ok_and(|v| v == "1")
}

fn non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
