//! `tiltbar deps` specs

use crate::prelude::*;

#[test]
fn lists_dependents_per_resource() {
    let tilt = FakeTilt::new();
    tilt.engine(ENGINE_DB_DEPENDENTS);

    tilt.tiltbar()
        .args(&["deps"])
        .passes()
        .stdout_eq("db  <- api, web\n");
}

#[test]
fn json_output_is_the_map() {
    let tilt = FakeTilt::new();
    tilt.engine(ENGINE_DB_DEPENDENTS);

    let run = tilt.tiltbar().args(&["deps", "-o", "json"]).passes();
    assert_eq!(run.json(), serde_json::json!({ "db": ["api", "web"] }));
}

#[test]
fn empty_graph() {
    let tilt = FakeTilt::new();
    tilt.engine("{}");

    tilt.tiltbar()
        .args(&["deps"])
        .passes()
        .stdout_eq("no dependencies\n");
}

#[test]
fn unparseable_dump_fails() {
    let tilt = FakeTilt::new();
    tilt.engine("not json");

    tilt.tiltbar()
        .args(&["deps"])
        .fails()
        .stderr_has("failed to read the dependency graph");
}
