// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tiltbar url <name>`: a resource's page in the web UI.

use tb_core::WebUrl;

pub fn url(web_url: &WebUrl, name: &str) -> String {
    web_url.resource(name).to_string()
}

#[cfg(test)]
#[path = "url_tests.rs"]
mod tests;
