// ─── Project Report ───
// Serializable snapshot of the linked graph.

use serde::Serialize;

use super::project::{Project, ProjectPhase};
use crate::core::attributes::AttributeContainer;
use crate::core::compilation::CompilationId;
use crate::core::target::TargetState;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReport {
    pub group: String,
    pub artifact_id: String,
    pub version: String,
    pub phase: ProjectPhase,
    pub targets: Vec<TargetReport>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetReport {
    pub name: String,
    pub kind: &'static str,
    pub state: TargetState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minecraft_version: Option<String>,
    pub depends_on: Vec<String>,
    pub compilations: Vec<CompilationReport>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationReport {
    pub name: String,
    pub source_dependencies: Vec<String>,
    pub classpath_dependencies: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub weak_links: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<AttributeContainer>,
}

impl Project {
    pub fn report(&self) -> ProjectReport {
        let names = |ids: &[CompilationId]| -> Vec<String> {
            ids.iter()
                .map(|id| self.compilation(*id).name().to_string())
                .collect()
        };

        let targets = self
            .targets()
            .map(|target| TargetReport {
                name: target.name().to_string(),
                kind: target.kind().type_name(),
                state: target.state(),
                minecraft_version: target.minecraft_version().map(str::to_string),
                depends_on: target
                    .depends_on()
                    .iter()
                    .map(|t| self.target(*t).name().to_string())
                    .collect(),
                compilations: self
                    .compilations()
                    .filter(|c| c.target() == target.id())
                    .map(|c| CompilationReport {
                        name: c.name().to_string(),
                        source_dependencies: names(c.source_dependencies()),
                        classpath_dependencies: names(c.classpath_dependencies()),
                        weak_links: names(c.weak_links()),
                        attributes: c.finalized_attributes().cloned(),
                    })
                    .collect(),
            })
            .collect();

        ProjectReport {
            group: self.group().to_string(),
            artifact_id: self.artifact_id().to_string(),
            version: self.version().to_string(),
            phase: self.phase(),
            targets,
        }
    }
}
