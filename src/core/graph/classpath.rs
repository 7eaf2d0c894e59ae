// ─── Classpath Queries ───
// What each compilation is compiled and run against once the graph is linked.

use serde::Serialize;

use super::project::Project;
use crate::core::attributes::Distribution;
use crate::core::compilation::{BucketKind, CompilationId};
use crate::core::error::{GraphError, GraphResult};
use crate::core::intersection::intersect_modules;
use crate::core::maven::MavenArtifact;
use crate::core::provider::{MinecraftProvider, Namespace, TransformRequest};

/// One entry of a compile or runtime classpath.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ClasspathEntry {
    /// Compiled output of another compilation.
    Output { compilation: CompilationId },
    /// A module dependency; mod dependencies carry the namespace they get remapped to.
    Module {
        artifact: MavenArtifact,
        remap: Option<Namespace>,
    },
    Minecraft {
        version: String,
        distribution: Distribution,
    },
    /// Generated API surface shared by several Minecraft versions.
    StubApi { compilation: CompilationId },
}

#[derive(Clone, Copy)]
enum Scope {
    Compile,
    Runtime,
}

impl Scope {
    fn includes(self, kind: BucketKind, own: bool) -> bool {
        match self {
            Scope::Compile => kind.on_compile_classpath() && (own || kind.is_exported()),
            Scope::Runtime => kind.on_runtime_classpath(),
        }
    }
}

impl Project {
    /// `id` followed by everything it compiles jointly with, depth first.
    pub fn source_closure(&self, id: CompilationId) -> Vec<CompilationId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if out.contains(&next) {
                continue;
            }
            out.push(next);
            for dep in self.compilations[next.0].source_dependencies().iter().rev() {
                stack.push(*dep);
            }
        }
        out
    }

    /// Compilations whose source closure contains `id`.
    pub fn source_dependents(&self, id: CompilationId) -> Vec<CompilationId> {
        self.compilations
            .iter()
            .map(|c| c.id)
            .filter(|c| *c != id && self.source_closure(*c).contains(&id))
            .collect()
    }

    /// Edge compilations `id` is compiled into.
    pub fn edge_source_dependents(&self, id: CompilationId) -> Vec<CompilationId> {
        self.source_dependents(id)
            .into_iter()
            .filter(|c| !self.owner(*c).is_common())
            .collect()
    }

    /// Distinct Minecraft versions of the edges `id` is compiled into, sorted.
    pub fn linked_minecraft_versions(&self, id: CompilationId) -> Vec<String> {
        let mut versions: Vec<String> = self
            .edge_source_dependents(id)
            .iter()
            .filter_map(|c| self.owner(*c).minecraft_version().map(str::to_string))
            .collect();
        versions.sort();
        versions.dedup();
        versions
    }

    pub fn compile_classpath(
        &self,
        id: CompilationId,
        provider: &dyn MinecraftProvider,
    ) -> GraphResult<Vec<ClasspathEntry>> {
        self.classpath(id, provider, Scope::Compile)
    }

    pub fn runtime_classpath(
        &self,
        id: CompilationId,
        provider: &dyn MinecraftProvider,
    ) -> GraphResult<Vec<ClasspathEntry>> {
        self.classpath(id, provider, Scope::Runtime)
    }

    /// Annotation processors of `id` and everything it compiles jointly with.
    pub fn annotation_processors(&self, id: CompilationId) -> Vec<MavenArtifact> {
        let mut out: Vec<MavenArtifact> = Vec::new();
        for member in self.source_closure(id) {
            for artifact in self.compilations[member.0]
                .buckets()
                .artifacts(BucketKind::AnnotationProcessor)
            {
                if !out.contains(artifact) {
                    out.push(artifact.clone());
                }
            }
        }
        out
    }

    fn classpath(
        &self,
        id: CompilationId,
        provider: &dyn MinecraftProvider,
        scope: Scope,
    ) -> GraphResult<Vec<ClasspathEntry>> {
        let namespace = Namespace::for_loader(self.owner(id).loader());
        let mut entries = Vec::new();
        self.push_minecraft(id, provider, &mut entries)?;

        for (idx, member) in self.source_closure(id).into_iter().enumerate() {
            self.push_buckets(member, scope, idx == 0, namespace, &mut entries);
        }

        for dep in self.compilations[id.0].classpath_dependencies() {
            push_unique(&mut entries, ClasspathEntry::Output { compilation: *dep });
            for member in self.source_closure(*dep) {
                self.push_buckets(member, scope, false, namespace, &mut entries);
            }
        }
        Ok(entries)
    }

    fn push_buckets(
        &self,
        member: CompilationId,
        scope: Scope,
        own: bool,
        namespace: Namespace,
        entries: &mut Vec<ClasspathEntry>,
    ) {
        let buckets = self.compilations[member.0].buckets();
        for kind in BucketKind::ALL {
            if kind == BucketKind::AnnotationProcessor || !scope.includes(kind, own) {
                continue;
            }
            for artifact in buckets.artifacts(kind) {
                let remap = kind.is_mod().then_some(namespace);
                push_unique(
                    entries,
                    ClasspathEntry::Module {
                        artifact: artifact.clone(),
                        remap,
                    },
                );
            }
        }
    }

    fn push_minecraft(
        &self,
        id: CompilationId,
        provider: &dyn MinecraftProvider,
        entries: &mut Vec<ClasspathEntry>,
    ) -> GraphResult<()> {
        let owner = self.owner(id);
        let distribution = self.distribution_of(id);

        if !owner.is_common() {
            let version = owner
                .minecraft_version()
                .ok_or_else(|| GraphError::MissingMinecraftVersion(owner.name().to_string()))?;
            let minecraft = provider.minecraft(version, distribution)?;
            entries.push(ClasspathEntry::Minecraft {
                version: minecraft.version,
                distribution,
            });
            push_libraries(entries, minecraft.libraries);
            return Ok(());
        }

        let versions = self.linked_minecraft_versions(id);
        match versions.as_slice() {
            [] => {}
            [single] => {
                let minecraft = provider.minecraft(single, distribution)?;
                entries.push(ClasspathEntry::Minecraft {
                    version: minecraft.version,
                    distribution,
                });
                push_libraries(entries, minecraft.libraries);
            }
            several => {
                entries.push(ClasspathEntry::StubApi { compilation: id });
                let mut libraries = Vec::with_capacity(several.len());
                for version in several {
                    libraries.push(provider.minecraft(version, distribution)?.libraries);
                }
                push_libraries(entries, intersect_modules(&libraries));
            }
        }
        Ok(())
    }

    /// Mod dependencies of `id` (and its joint sources) that need transforming
    /// into the owning loader's namespace.
    pub fn transform_requests(&self, id: CompilationId) -> Vec<TransformRequest> {
        let owner = self.owner(id);
        let namespace = Namespace::for_loader(owner.loader());
        let closure = self.source_closure(id);

        let mut aux_files = owner.kind().access_files().to_vec();
        for member in &closure {
            for mixin in self.compilations[member.0].mixins() {
                if !aux_files.contains(mixin) {
                    aux_files.push(mixin.clone());
                }
            }
        }

        let mut requests: Vec<TransformRequest> = Vec::new();
        for member in &closure {
            let buckets = self.compilations[member.0].buckets();
            for kind in BucketKind::ALL.into_iter().filter(BucketKind::is_mod) {
                for artifact in buckets.artifacts(kind) {
                    if requests.iter().any(|r| &r.artifact == artifact) {
                        continue;
                    }
                    requests.push(TransformRequest {
                        artifact: artifact.clone(),
                        bucket: kind,
                        namespace,
                        aux_files: aux_files.clone(),
                    });
                }
            }
        }
        requests
    }
}

fn push_unique(entries: &mut Vec<ClasspathEntry>, entry: ClasspathEntry) {
    if !entries.contains(&entry) {
        entries.push(entry);
    }
}

fn push_libraries(entries: &mut Vec<ClasspathEntry>, libraries: Vec<MavenArtifact>) {
    for artifact in libraries {
        push_unique(entries, ClasspathEntry::Module { artifact, remap: None });
    }
}
