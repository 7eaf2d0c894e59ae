// ─── Project Settings ───
// JSON description of a project, loaded from disk and turned into a
// configured (not yet evaluated) `Project`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::attributes::Distribution;
use crate::core::compilation::{BucketKind, CompilationSlot, DependencyBuckets};
use crate::core::error::{GraphError, GraphResult};
use crate::core::graph::Project;
use crate::core::maven::MavenArtifact;
use crate::core::provider::{MinecraftArtifact, StaticMinecraftProvider};
use crate::core::target::LoaderKind;

const CACHE_DIR_NAME: &str = "multiloader";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    #[default]
    Common,
    Fabric,
    Forge,
    NeoForge,
    Quilt,
}

impl TargetType {
    pub fn loader(self) -> Option<LoaderKind> {
        match self {
            TargetType::Common => None,
            TargetType::Fabric => Some(LoaderKind::Fabric),
            TargetType::Forge => Some(LoaderKind::Forge),
            TargetType::NeoForge => Some(LoaderKind::NeoForge),
            TargetType::Quilt => Some(LoaderKind::Quilt),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BucketSettings {
    pub api: Vec<String>,
    pub implementation: Vec<String>,
    pub runtime_only: Vec<String>,
    pub compile_only: Vec<String>,
    pub annotation_processor: Vec<String>,
    pub mod_api: Vec<String>,
    pub mod_implementation: Vec<String>,
    pub mod_runtime_only: Vec<String>,
    pub mod_compile_only: Vec<String>,
}

impl BucketSettings {
    fn entries(&self) -> [(BucketKind, &[String]); 9] {
        [
            (BucketKind::Api, self.api.as_slice()),
            (BucketKind::Implementation, self.implementation.as_slice()),
            (BucketKind::RuntimeOnly, self.runtime_only.as_slice()),
            (BucketKind::CompileOnly, self.compile_only.as_slice()),
            (BucketKind::AnnotationProcessor, self.annotation_processor.as_slice()),
            (BucketKind::ModApi, self.mod_api.as_slice()),
            (BucketKind::ModImplementation, self.mod_implementation.as_slice()),
            (BucketKind::ModRuntimeOnly, self.mod_runtime_only.as_slice()),
            (BucketKind::ModCompileOnly, self.mod_compile_only.as_slice()),
        ]
    }

    fn apply(&self, buckets: &mut DependencyBuckets) -> GraphResult<()> {
        for (kind, coords) in self.entries() {
            for coord in coords {
                buckets.add(kind, coord)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationSettings {
    pub slot: CompilationSlot,
    #[serde(default)]
    pub dependencies: BucketSettings,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub mixins: Vec<PathBuf>,
    #[serde(default)]
    pub sources_jar: bool,
    #[serde(default)]
    pub javadoc_jar: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSettings {
    pub name: String,
    #[serde(default)]
    pub kind: TargetType,
    pub minecraft_version: Option<String>,
    pub loader_version: Option<String>,
    #[serde(default)]
    pub include_client: bool,
    #[serde(default)]
    pub access_files: Vec<PathBuf>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub compilations: Vec<CompilationSettings>,
}

/// A pre-downloaded Minecraft jar and the libraries it ships with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinecraftSettings {
    pub version: String,
    pub distribution: Distribution,
    pub jar: PathBuf,
    #[serde(default)]
    pub libraries: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    pub group: String,
    pub artifact_id: String,
    pub version: String,
    pub stub_dir: Option<PathBuf>,
    #[serde(default)]
    pub minecraft: Vec<MinecraftSettings>,
    #[serde(default)]
    pub targets: Vec<TargetSettings>,
}

impl ProjectSettings {
    pub fn load(path: &Path) -> GraphResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| GraphError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> GraphResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Where stub API jars go unless `stubDir` says otherwise.
    pub fn stub_dir(&self) -> PathBuf {
        self.stub_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(CACHE_DIR_NAME)
                .join("stubs")
        })
    }

    /// Provider serving the jars listed under `minecraft`.
    pub fn minecraft_provider(&self) -> GraphResult<StaticMinecraftProvider> {
        let mut provider = StaticMinecraftProvider::new();
        for entry in &self.minecraft {
            let libraries = entry
                .libraries
                .iter()
                .map(|coord| MavenArtifact::parse(coord))
                .collect::<GraphResult<Vec<_>>>()?;
            provider.register(MinecraftArtifact {
                version: entry.version.clone(),
                distribution: entry.distribution,
                jar: entry.jar.clone(),
                libraries,
            });
        }
        Ok(provider)
    }

    /// Build the configured project. Targets are declared first so
    /// `dependsOn` may reference targets listed later in the file.
    pub fn into_project(&self) -> GraphResult<Project> {
        let mut project = Project::new(&self.group, &self.artifact_id, &self.version);

        for settings in &self.targets {
            let id = match settings.kind.loader() {
                Some(loader) => project.edge(&settings.name, loader)?,
                None => project.common(&settings.name)?,
            };

            // Edge-only fields on a common target surface as `RestrictedProperty`.
            let target = project.target_mut(id)?;
            if let Some(version) = &settings.minecraft_version {
                target.set_minecraft_version(version)?;
            }
            if let Some(version) = &settings.loader_version {
                target.set_loader_version(version)?;
            }
            if settings.include_client {
                target.set_include_client(true)?;
            }
            for file in &settings.access_files {
                target.add_access_file(file.clone())?;
            }
        }

        for settings in &self.targets {
            let dependent = project.require(&settings.name)?;
            for name in &settings.depends_on {
                let dependency = project.require(name)?;
                project.depends_on(dependent, dependency)?;
            }
        }

        for settings in &self.targets {
            let target = project.require(&settings.name)?;
            for compilation in &settings.compilations {
                project.configure(target, compilation.slot, |c| {
                    c.dependencies(|buckets| compilation.dependencies.apply(buckets))?;
                    c.metadata(|m| m.extend(compilation.metadata.clone()));
                    for mixin in &compilation.mixins {
                        c.add_mixin(mixin.clone());
                    }
                    if compilation.sources_jar {
                        c.with_sources_jar();
                    }
                    if compilation.javadoc_jar {
                        c.with_javadoc_jar();
                    }
                    Ok(())
                })?;
            }
        }

        debug!(
            "Configured project {} with {} targets",
            self.artifact_id,
            self.targets.len()
        );
        Ok(project)
    }
}
