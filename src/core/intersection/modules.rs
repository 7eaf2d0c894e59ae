// ─── Module Intersection ───
// Libraries that are safe to compile against for every contributing edge.

use std::collections::HashMap;

use tracing::warn;

use crate::core::maven::{lower_version, MavenArtifact, ModuleId};

/// Keep every `(group, artifact)` present in all `classpaths`, in the order
/// of the first one. Version conflicts reduce pairwise to the lower version.
pub fn intersect_modules(classpaths: &[Vec<MavenArtifact>]) -> Vec<MavenArtifact> {
    let mut rest = classpaths.iter();
    let Some(first) = rest.next() else {
        return Vec::new();
    };

    let mut acc: Vec<MavenArtifact> = Vec::with_capacity(first.len());
    for artifact in first {
        if !acc.iter().any(|a| a.module() == artifact.module()) {
            acc.push(artifact.clone());
        }
    }

    for next in rest {
        acc = intersect_pair(&acc, next);
    }
    acc
}

fn intersect_pair(left: &[MavenArtifact], right: &[MavenArtifact]) -> Vec<MavenArtifact> {
    let mut by_module: HashMap<ModuleId, &MavenArtifact> = HashMap::with_capacity(right.len());
    for artifact in right {
        by_module.entry(artifact.module()).or_insert(artifact);
    }

    left.iter()
        .filter_map(|artifact| {
            let other = by_module.get(&artifact.module())?;
            if other.version == artifact.version {
                return Some(artifact.clone());
            }
            let chosen = lower_version(&artifact.version, &other.version);
            warn!(
                "{} declared as {} and {}, compiling against {}",
                artifact.module(),
                artifact.version,
                other.version,
                chosen
            );
            Some(artifact.with_version(chosen))
        })
        .collect()
}
