//! CLI help output specs
//!
//! Verify help text lists every command.

use crate::prelude::*;

#[test]
fn help_shows_usage_and_commands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("Usage:")
        .stdout_has("watch")
        .stdout_has("status")
        .stdout_has("trigger")
        .stdout_has("deps")
        .stdout_has("url");
}

#[test]
fn status_help_shows_timing_flags() {
    cli()
        .args(&["status", "--help"])
        .passes()
        .stdout_has("--settle-ms")
        .stdout_has("--timeout-ms");
}

#[test]
fn version_flag_prints_version() {
    cli().args(&["--version"]).passes().stdout_has("tiltbar");
}

#[test]
fn unknown_command_fails() {
    cli()
        .args(&["frobnicate"])
        .fails()
        .stderr_has("unrecognized subcommand");
}
