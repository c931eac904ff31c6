// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reverse dependency graph built from the engine dump.
//!
//! The dump lists every manifest target with the resources it declares as
//! dependencies. Inverting those edges gives, for each resource, the
//! resources waiting on it.

use crate::error::DependencyError;
use serde::Deserialize;
use std::collections::BTreeMap;
use tb_adapters::TiltAdapter;
use tb_core::DependentsMap;

#[derive(Debug, Default, Deserialize)]
struct EngineDump {
    #[serde(rename = "ManifestTargets", default)]
    manifest_targets: Option<BTreeMap<String, ManifestTarget>>,
}

#[derive(Debug, Default, Deserialize)]
struct ManifestTarget {
    #[serde(rename = "Manifest", default)]
    manifest: Option<Manifest>,
}

#[derive(Debug, Default, Deserialize)]
struct Manifest {
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(rename = "ResourceDependencies", default)]
    resource_dependencies: Option<Vec<String>>,
}

/// Parse an engine dump into a dependents map.
///
/// Each dependents list is sorted and deduplicated. Resources nobody
/// depends on have no entry.
pub fn parse_dependents(json: &str) -> Result<DependentsMap, DependencyError> {
    let dump: EngineDump = serde_json::from_str(json)?;

    let mut dependents = DependentsMap::new();
    for target in dump.manifest_targets.unwrap_or_default().into_values() {
        let Some(manifest) = target.manifest else {
            continue;
        };
        let Some(name) = manifest.name.filter(|n| !n.is_empty()) else {
            continue;
        };
        for dependency in manifest.resource_dependencies.unwrap_or_default() {
            dependents
                .entry(dependency)
                .or_insert_with(Vec::new)
                .push(name.clone());
        }
    }

    for names in dependents.values_mut() {
        names.sort();
        names.dedup();
    }
    Ok(dependents)
}

/// Fetch the engine dump and parse it.
pub async fn fetch_dependents<T: TiltAdapter>(adapter: &T) -> Result<DependentsMap, DependencyError> {
    let dump = adapter.dump_engine().await?;
    parse_dependents(&dump)
}

#[cfg(test)]
#[path = "deps_tests.rs"]
mod tests;
