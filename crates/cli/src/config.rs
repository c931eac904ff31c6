// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Layered configuration: defaults < config file < environment < flags.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tb_adapters::{TiltCli, DEFAULT_TILT_PATH};
use tb_core::web::DEFAULT_WEB_URL;
use tb_core::{WebUrl, WebUrlError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    WebUrl(#[from] WebUrlError),
    #[error("could not determine state directory (set TILTBAR_STATE_DIR or HOME)")]
    NoStateDir,
}

/// Keys accepted in `config.toml`. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub tilt_path: Option<PathBuf>,
    pub web_url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl FileConfig {
    /// Read a config file; a missing file yields the empty config.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fields set in `other` replace ours.
    fn overlay(self, other: FileConfig) -> Self {
        Self {
            tilt_path: other.tilt_path.or(self.tilt_path),
            web_url: other.web_url.or(self.web_url),
            host: other.host.or(self.host),
            port: other.port.or(self.port),
        }
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub tilt_path: PathBuf,
    pub web_url: WebUrl,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl Config {
    /// Resolve from the config file, `TILTBAR_*` variables and `flags`.
    pub fn load(flags: FileConfig) -> Result<Self, ConfigError> {
        let file = match crate::env::config_path() {
            Some(path) => FileConfig::read(&path)?,
            None => FileConfig::default(),
        };
        let env = FileConfig {
            tilt_path: crate::env::tilt_path(),
            web_url: crate::env::web_url(),
            ..FileConfig::default()
        };
        Self::resolve([file, env, flags])
    }

    /// Merge layers in order; later layers win.
    pub fn resolve(layers: impl IntoIterator<Item = FileConfig>) -> Result<Self, ConfigError> {
        let merged = layers
            .into_iter()
            .fold(FileConfig::default(), FileConfig::overlay);
        let web_url = WebUrl::parse(merged.web_url.as_deref().unwrap_or(DEFAULT_WEB_URL))?;
        Ok(Self {
            tilt_path: merged
                .tilt_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TILT_PATH)),
            web_url,
            host: merged.host,
            port: merged.port,
        })
    }

    /// Orchestration CLI adapter for these settings.
    pub fn tilt(&self) -> TiltCli {
        let mut cli = TiltCli::new(self.tilt_path.clone());
        if let Some(host) = &self.host {
            cli = cli.with_host(host.clone());
        }
        if let Some(port) = self.port {
            cli = cli.with_port(port);
        }
        cli
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
