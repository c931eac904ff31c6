// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Links into the orchestration tool's web UI.

use thiserror::Error;
use url::Url;

/// Default local web UI address.
pub const DEFAULT_WEB_URL: &str = "http://localhost:10350/";

#[derive(Debug, Error)]
pub enum WebUrlError {
    #[error("invalid web url '{url}': {source}")]
    Parse {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("web url '{0}' cannot be used as a base")]
    NotABase(String),
}

/// Base address of the web UI, used to derive per-resource links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebUrl {
    base: Url,
}

impl WebUrl {
    pub fn parse(url: &str) -> Result<Self, WebUrlError> {
        let base = Url::parse(url).map_err(|source| WebUrlError::Parse {
            url: url.to_string(),
            source,
        })?;
        if base.cannot_be_a_base() {
            return Err(WebUrlError::NotABase(url.to_string()));
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Overview page for one resource: `<base>/r/<name>/overview`.
    ///
    /// The name is percent-encoded as a single path segment.
    pub fn resource(&self, name: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["r", name, "overview"]);
        }
        url
    }
}

#[cfg(test)]
#[path = "web_tests.rs"]
mod tests;
