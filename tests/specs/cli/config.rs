//! Configuration specs
//!
//! Verify the config file, environment and flags are layered in order.

use crate::prelude::*;

#[test]
fn malformed_config_file_is_reported() {
    let tilt = FakeTilt::new();
    tilt.config("port = \"high\"\n");

    tilt.tiltbar()
        .args(&["url", "api"])
        .fails()
        .stderr_has("Error: invalid config")
        .stderr_has("config.toml");
}

#[test]
fn unknown_config_key_is_reported() {
    let tilt = FakeTilt::new();
    tilt.config("colour = true\n");

    tilt.tiltbar()
        .args(&["url", "api"])
        .fails()
        .stderr_has("unknown field");
}

#[test]
fn config_file_sets_web_url() {
    let tilt = FakeTilt::new();
    tilt.config("web_url = \"http://tilt.internal:10351/\"\n");

    tilt.tiltbar()
        .args(&["url", "api"])
        .passes()
        .stdout_eq("http://tilt.internal:10351/r/api/overview\n");
}

#[test]
fn env_overrides_config_file() {
    let tilt = FakeTilt::new();
    tilt.config("web_url = \"http://from-file/\"\n");

    tilt.tiltbar()
        .env("TILTBAR_WEB_URL", "http://from-env/")
        .args(&["url", "api"])
        .passes()
        .stdout_eq("http://from-env/r/api/overview\n");
}

#[test]
fn flag_overrides_env() {
    let tilt = FakeTilt::new();

    tilt.tiltbar()
        .env("TILTBAR_WEB_URL", "http://from-env/")
        .args(&["url", "api", "--web-url", "http://from-flag/"])
        .passes()
        .stdout_eq("http://from-flag/r/api/overview\n");
}

#[test]
fn config_file_sets_tilt_path() {
    let tilt = FakeTilt::new();
    tilt.config(&format!(
        "tilt_path = \"{}\"\n",
        tilt.executable().display()
    ));

    cli()
        .env("TILTBAR_CONFIG", tilt.config_path())
        .env("TILTBAR_STATE_DIR", tilt.state_path())
        .args(&["trigger", "api"])
        .passes();
    assert_eq!(tilt.calls(), "trigger api\n");
}

#[test]
fn logs_are_written_to_the_state_dir() {
    let tilt = FakeTilt::new();
    tilt.engine("{}");

    tilt.tiltbar().env("RUST_LOG", "debug").args(&["deps"]).passes();
    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || tilt.log().contains("tilt.dump")),
        "log: {}",
        tilt.log()
    );
}
