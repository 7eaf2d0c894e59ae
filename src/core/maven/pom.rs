use serde::Serialize;

use super::artifact::MavenArtifact;
use crate::core::error::{GraphError, GraphResult};

/// Minimal POM model with the fields a published mod variant needs.
#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PomDocument {
    pub model_version: String,
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "PomDependencies::is_empty")]
    pub dependencies: PomDependencies,
}

#[derive(Debug, Serialize, Default)]
pub struct PomDependencies {
    #[serde(rename = "dependency")]
    pub items: Vec<PomDependency>,
}

impl PomDependencies {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PomDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    pub scope: String,
}

impl PomDependency {
    pub fn from_artifact(artifact: &MavenArtifact, scope: &str) -> Self {
        Self {
            group_id: artifact.group_id.clone(),
            artifact_id: artifact.artifact_id.clone(),
            version: artifact.version.clone(),
            classifier: artifact.classifier.clone(),
            scope: scope.to_string(),
        }
    }
}

impl PomDocument {
    pub fn new(group_id: &str, artifact_id: &str, version: &str) -> Self {
        Self {
            model_version: "4.0.0".to_string(),
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            version: version.to_string(),
            ..Self::default()
        }
    }

    /// Add a dependency unless the same module is already listed.
    ///
    /// A `compile` entry wins over a `runtime` entry for the same module.
    pub fn add_dependency(&mut self, dep: PomDependency) {
        let existing = self.dependencies.items.iter_mut().find(|d| {
            d.group_id == dep.group_id
                && d.artifact_id == dep.artifact_id
                && d.classifier == dep.classifier
        });

        match existing {
            Some(found) => {
                if dep.scope == "compile" {
                    found.scope = dep.scope;
                }
            }
            None => self.dependencies.items.push(dep),
        }
    }

    /// Serialize into a POM XML string.
    pub fn to_xml(&self) -> GraphResult<String> {
        let body = quick_xml::se::to_string_with_root("project", self)
            .map_err(|e| GraphError::Pom(e.to_string()))?;
        Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", body))
    }
}
