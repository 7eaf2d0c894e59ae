// ─── Publishing ───
// Capabilities, classifier artifacts and the POM of a target's publication.

use serde::Serialize;
use std::fmt;

use crate::core::attributes::AttributeContainer;
use crate::core::compilation::{BucketKind, CompilationId, CompilationSlot};
use crate::core::error::{GraphError, GraphResult};
use crate::core::graph::Project;
use crate::core::maven::{PomDependency, PomDocument};
use crate::core::target::TargetId;

/// `group:name:version` a published variant provides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    pub group: String,
    pub name: String,
    pub version: String,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedArtifact {
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedVariant {
    pub name: String,
    pub capability: Capability,
    pub attributes: AttributeContainer,
    pub artifacts: Vec<PublishedArtifact>,
}

#[derive(Debug)]
pub struct Publication {
    pub target: String,
    pub variants: Vec<PublishedVariant>,
    pub pom: PomDocument,
}

impl Project {
    /// `<artifactId>-<target>` for main, `<artifactId>-<target>-<slot>` otherwise.
    pub fn capability(&self, id: CompilationId) -> Capability {
        let compilation = self.compilation(id);
        let owner = self.owner(id);
        let name = match compilation.slot() {
            CompilationSlot::Main => format!("{}-{}", self.artifact_id(), owner.name()),
            slot => format!("{}-{}-{}", self.artifact_id(), owner.name(), slot),
        };
        Capability {
            group: self.group().to_string(),
            name,
            version: self.version().to_string(),
        }
    }

    /// The jar plus the sources / javadoc jars the compilation opted into.
    pub fn published_artifacts(&self, id: CompilationId) -> Vec<PublishedArtifact> {
        let compilation = self.compilation(id);
        let base = self.capability(id);
        let file = |classifier: Option<&str>| PublishedArtifact {
            file_name: match classifier {
                Some(c) => format!("{}-{}-{}.jar", base.name, base.version, c),
                None => format!("{}-{}.jar", base.name, base.version),
            },
            classifier: classifier.map(str::to_string),
        };

        let mut artifacts = vec![file(None)];
        if compilation.publishes_sources() {
            artifacts.push(file(Some("sources")));
        }
        if compilation.publishes_javadoc() {
            artifacts.push(file(Some("javadoc")));
        }
        artifacts
    }

    /// Variants and POM for `target`. Needs a sealed project for final attributes.
    pub fn publication(&self, target: TargetId) -> GraphResult<Publication> {
        let owner = self.target(target);
        let mut variants = Vec::new();
        for slot in CompilationSlot::ALL {
            let Some(id) = owner.compilation(slot) else {
                continue;
            };
            let compilation = self.compilation(id);
            if compilation.is_test() {
                continue;
            }
            let attributes = compilation.finalized_attributes().cloned().ok_or_else(|| {
                GraphError::Other(format!(
                    "cannot publish {} before the project is sealed",
                    compilation.name()
                ))
            })?;
            variants.push(PublishedVariant {
                name: compilation.name().to_string(),
                capability: self.capability(id),
                attributes,
                artifacts: self.published_artifacts(id),
            });
        }

        Ok(Publication {
            target: owner.name().to_string(),
            variants,
            pom: self.pom(owner.main())?,
        })
    }

    fn pom(&self, main: CompilationId) -> GraphResult<PomDocument> {
        let capability = self.capability(main);
        let mut pom = PomDocument::new(&capability.group, &capability.name, &capability.version);
        pom.name = Some(capability.name.clone());

        // Included sources ship inside this jar, so their dependencies are ours.
        for (idx, member) in self.source_closure(main).into_iter().enumerate() {
            let buckets = self.compilation(member).buckets();
            for kind in BucketKind::ALL {
                let scope = match kind.plain() {
                    BucketKind::Api => "compile",
                    BucketKind::Implementation | BucketKind::RuntimeOnly => "runtime",
                    _ => continue,
                };
                if idx > 0 && scope == "compile" && !kind.is_exported() {
                    continue;
                }
                for artifact in buckets.artifacts(kind) {
                    pom.add_dependency(PomDependency::from_artifact(artifact, scope));
                }
            }
        }

        for dep in self.compilation(main).classpath_dependencies() {
            let linked = self.capability(*dep);
            pom.add_dependency(PomDependency {
                group_id: linked.group,
                artifact_id: linked.name,
                version: linked.version,
                classifier: None,
                scope: "runtime".into(),
            });
        }
        Ok(pom)
    }
}
