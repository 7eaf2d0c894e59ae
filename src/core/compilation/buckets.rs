use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::error::GraphResult;
use crate::core::maven::MavenArtifact;

/// The dependency buckets of a compilation.
///
/// `Mod*` buckets mirror the plain ones but their artifacts go through the
/// loader-aware remap pipeline before landing on a classpath.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BucketKind {
    Api,
    Implementation,
    RuntimeOnly,
    CompileOnly,
    AnnotationProcessor,
    ModApi,
    ModImplementation,
    ModRuntimeOnly,
    ModCompileOnly,
}

impl BucketKind {
    pub const ALL: [BucketKind; 9] = [
        BucketKind::Api,
        BucketKind::Implementation,
        BucketKind::RuntimeOnly,
        BucketKind::CompileOnly,
        BucketKind::AnnotationProcessor,
        BucketKind::ModApi,
        BucketKind::ModImplementation,
        BucketKind::ModRuntimeOnly,
        BucketKind::ModCompileOnly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BucketKind::Api => "api",
            BucketKind::Implementation => "implementation",
            BucketKind::RuntimeOnly => "runtimeOnly",
            BucketKind::CompileOnly => "compileOnly",
            BucketKind::AnnotationProcessor => "annotationProcessor",
            BucketKind::ModApi => "modApi",
            BucketKind::ModImplementation => "modImplementation",
            BucketKind::ModRuntimeOnly => "modRuntimeOnly",
            BucketKind::ModCompileOnly => "modCompileOnly",
        }
    }

    pub fn is_mod(&self) -> bool {
        matches!(
            self,
            BucketKind::ModApi
                | BucketKind::ModImplementation
                | BucketKind::ModRuntimeOnly
                | BucketKind::ModCompileOnly
        )
    }

    /// The plain bucket a mod bucket mirrors.
    pub fn plain(&self) -> BucketKind {
        match self {
            BucketKind::ModApi => BucketKind::Api,
            BucketKind::ModImplementation => BucketKind::Implementation,
            BucketKind::ModRuntimeOnly => BucketKind::RuntimeOnly,
            BucketKind::ModCompileOnly => BucketKind::CompileOnly,
            other => *other,
        }
    }

    pub fn on_compile_classpath(&self) -> bool {
        matches!(
            self.plain(),
            BucketKind::Api | BucketKind::Implementation | BucketKind::CompileOnly
        )
    }

    pub fn on_runtime_classpath(&self) -> bool {
        matches!(
            self.plain(),
            BucketKind::Api | BucketKind::Implementation | BucketKind::RuntimeOnly
        )
    }

    /// Re-exposed to compilations that statically include this one.
    pub fn is_exported(&self) -> bool {
        matches!(
            self,
            BucketKind::Api | BucketKind::ModApi | BucketKind::AnnotationProcessor
        )
    }
}

/// Ordered, de-duplicated dependency declarations of one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DependencySet {
    items: Vec<MavenArtifact>,
}

impl DependencySet {
    /// Returns `false` when the declaration was already present.
    pub fn insert(&mut self, artifact: MavenArtifact) -> bool {
        if self.items.contains(&artifact) {
            return false;
        }
        self.items.push(artifact);
        true
    }

    pub fn contains(&self, artifact: &MavenArtifact) -> bool {
        self.items.contains(artifact)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MavenArtifact> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// All buckets of one compilation.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct DependencyBuckets {
    buckets: BTreeMap<BucketKind, DependencySet>,
}

impl DependencyBuckets {
    /// Artifacts declared in `kind`, empty if the bucket was never touched.
    pub fn artifacts(&self, kind: BucketKind) -> impl Iterator<Item = &MavenArtifact> {
        self.buckets.get(&kind).into_iter().flat_map(|set| set.iter())
    }

    pub fn add_artifact(&mut self, kind: BucketKind, artifact: MavenArtifact) -> bool {
        self.buckets.entry(kind).or_default().insert(artifact)
    }

    pub fn add(&mut self, kind: BucketKind, coord: &str) -> GraphResult<bool> {
        let artifact = MavenArtifact::parse(coord)?;
        Ok(self.add_artifact(kind, artifact))
    }

    pub fn api(&mut self, coord: &str) -> GraphResult<bool> {
        self.add(BucketKind::Api, coord)
    }

    pub fn implementation(&mut self, coord: &str) -> GraphResult<bool> {
        self.add(BucketKind::Implementation, coord)
    }

    pub fn runtime_only(&mut self, coord: &str) -> GraphResult<bool> {
        self.add(BucketKind::RuntimeOnly, coord)
    }

    pub fn compile_only(&mut self, coord: &str) -> GraphResult<bool> {
        self.add(BucketKind::CompileOnly, coord)
    }

    pub fn annotation_processor(&mut self, coord: &str) -> GraphResult<bool> {
        self.add(BucketKind::AnnotationProcessor, coord)
    }

    pub fn mod_api(&mut self, coord: &str) -> GraphResult<bool> {
        self.add(BucketKind::ModApi, coord)
    }

    pub fn mod_implementation(&mut self, coord: &str) -> GraphResult<bool> {
        self.add(BucketKind::ModImplementation, coord)
    }

    pub fn mod_runtime_only(&mut self, coord: &str) -> GraphResult<bool> {
        self.add(BucketKind::ModRuntimeOnly, coord)
    }

    pub fn mod_compile_only(&mut self, coord: &str) -> GraphResult<bool> {
        self.add(BucketKind::ModCompileOnly, coord)
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(DependencySet::is_empty)
    }
}
