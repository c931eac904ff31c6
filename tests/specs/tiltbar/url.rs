//! `tiltbar url` specs

use crate::prelude::*;

#[test]
fn default_base_is_local_web_ui() {
    FakeTilt::new()
        .tiltbar()
        .args(&["url", "api"])
        .passes()
        .stdout_eq("http://localhost:10350/r/api/overview\n");
}

#[test]
fn names_are_encoded_as_one_segment() {
    FakeTilt::new()
        .tiltbar()
        .args(&["url", "a/b"])
        .passes()
        .stdout_eq("http://localhost:10350/r/a%2Fb/overview\n");
}

#[test]
fn json_output_includes_name() {
    let run = FakeTilt::new()
        .tiltbar()
        .args(&["url", "api", "-o", "json"])
        .passes();
    let value = run.json();
    assert_eq!(value["name"], "api");
    assert_eq!(value["url"], "http://localhost:10350/r/api/overview");
}

#[test]
fn invalid_web_url_is_rejected() {
    FakeTilt::new()
        .tiltbar()
        .args(&["url", "api", "--web-url", "nope"])
        .fails()
        .stderr_has("invalid web url 'nope'");
}
