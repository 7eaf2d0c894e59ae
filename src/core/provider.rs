// ─── External Collaborators ───
// Interfaces for the parts of the pipeline the build model does not
// implement itself: fetching Minecraft, and the remap / access-widening /
// mixin transform chain applied to mod dependencies.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use tracing::debug;

use crate::core::attributes::Distribution;
use crate::core::compilation::BucketKind;
use crate::core::error::{GraphError, GraphResult};
use crate::core::maven::MavenArtifact;
use crate::core::target::LoaderKind;

// ── Minecraft ───────────────────────────────────────────

/// A resolved Minecraft distribution plus the libraries it ships with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinecraftArtifact {
    pub version: String,
    pub distribution: Distribution,
    pub jar: PathBuf,
    pub libraries: Vec<MavenArtifact>,
}

/// Supplies Minecraft jars. Implementations own downloading and caching.
pub trait MinecraftProvider {
    fn minecraft(&self, version: &str, distribution: Distribution) -> GraphResult<MinecraftArtifact>;
}

/// In-memory provider for pre-resolved jars.
#[derive(Debug, Default)]
pub struct StaticMinecraftProvider {
    artifacts: HashMap<(String, Distribution), MinecraftArtifact>,
}

impl StaticMinecraftProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, artifact: MinecraftArtifact) -> &mut Self {
        self.artifacts
            .insert((artifact.version.clone(), artifact.distribution), artifact);
        self
    }
}

impl MinecraftProvider for StaticMinecraftProvider {
    fn minecraft(&self, version: &str, distribution: Distribution) -> GraphResult<MinecraftArtifact> {
        let lookup = |d: Distribution| self.artifacts.get(&(version.to_string(), d));
        // A joined request can be served by the client jar, which carries both sides.
        let found = match distribution {
            Distribution::Joined => lookup(Distribution::Joined).or_else(|| lookup(Distribution::Client)),
            other => lookup(other),
        };
        found.cloned().ok_or_else(|| GraphError::MinecraftUnavailable {
            version: version.to_string(),
            distribution: distribution.to_string(),
        })
    }
}

// ── Namespaces ──────────────────────────────────────────

/// Mapping namespace a jar's names are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Official,
    Intermediary,
    Srg,
    Mojang,
    Named,
}

impl Namespace {
    /// Runtime namespace of a loader. Loader-agnostic code stays in `named`.
    pub fn for_loader(loader: Option<LoaderKind>) -> Self {
        match loader {
            Some(LoaderKind::Fabric) | Some(LoaderKind::Quilt) => Namespace::Intermediary,
            Some(LoaderKind::Forge) => Namespace::Srg,
            Some(LoaderKind::NeoForge) => Namespace::Mojang,
            None => Namespace::Named,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Official => "official",
            Namespace::Intermediary => "intermediary",
            Namespace::Srg => "srg",
            Namespace::Mojang => "mojang",
            Namespace::Named => "named",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Transforms ──────────────────────────────────────────

/// How far an artifact has gone through the transform pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TransformState {
    Raw,
    Remapped,
    AccessWidened,
    MixinProcessed,
}

impl fmt::Display for TransformState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransformState::Raw => "raw",
            TransformState::Remapped => "remapped",
            TransformState::AccessWidened => "accessWidened",
            TransformState::MixinProcessed => "mixinProcessed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    pub path: PathBuf,
    pub namespace: Namespace,
    pub state: TransformState,
}

/// One pure step of the transform pipeline.
pub trait ArtifactTransform {
    /// State of every artifact this step returns.
    fn produces(&self) -> TransformState;

    fn apply(&self, input: &ArtifactRef, aux_files: &[PathBuf]) -> GraphResult<ArtifactRef>;
}

/// Ordered transform steps; a request runs every step needed to reach a state.
#[derive(Default)]
pub struct TransformChain {
    steps: Vec<Box<dyn ArtifactTransform>>,
}

impl TransformChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: impl ArtifactTransform + 'static) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn request(
        &self,
        input: &ArtifactRef,
        state: TransformState,
        aux_files: &[PathBuf],
    ) -> GraphResult<ArtifactRef> {
        let mut current = input.clone();
        for step in &self.steps {
            if current.state >= state {
                break;
            }
            if step.produces() > current.state && step.produces() <= state {
                debug!("Transforming {:?} to {}", current.path, step.produces());
                current = step.apply(&current, aux_files)?;
            }
        }
        if current.state < state {
            return Err(GraphError::UnreachableTransformState(state.to_string()));
        }
        Ok(current)
    }
}

/// A mod dependency that must go through the transform chain before use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformRequest {
    pub artifact: MavenArtifact,
    pub bucket: BucketKind,
    pub namespace: Namespace,
    pub aux_files: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Step(TransformState, &'static str);

    impl ArtifactTransform for Step {
        fn produces(&self) -> TransformState {
            self.0
        }

        fn apply(&self, input: &ArtifactRef, aux_files: &[PathBuf]) -> GraphResult<ArtifactRef> {
            let mut path = input.path.clone().into_os_string();
            path.push(format!("+{}{}", self.1, aux_files.len()));
            Ok(ArtifactRef {
                path: PathBuf::from(path),
                namespace: input.namespace,
                state: self.0,
            })
        }
    }

    fn raw() -> ArtifactRef {
        ArtifactRef {
            path: PathBuf::from("mod.jar"),
            namespace: Namespace::Intermediary,
            state: TransformState::Raw,
        }
    }

    #[test]
    fn namespaces_follow_loader() {
        assert_eq!(Namespace::for_loader(Some(LoaderKind::Quilt)), Namespace::Intermediary);
        assert_eq!(Namespace::for_loader(Some(LoaderKind::Forge)), Namespace::Srg);
        assert_eq!(Namespace::for_loader(Some(LoaderKind::NeoForge)), Namespace::Mojang);
        assert_eq!(Namespace::for_loader(None), Namespace::Named);
    }

    #[test]
    fn chain_runs_only_needed_steps() {
        let mut chain = TransformChain::new();
        chain
            .push(Step(TransformState::Remapped, "remap"))
            .push(Step(TransformState::AccessWidened, "aw"))
            .push(Step(TransformState::MixinProcessed, "mixin"));

        let aux = vec![PathBuf::from("mod.accesswidener")];
        let out = chain.request(&raw(), TransformState::AccessWidened, &aux).unwrap();
        assert_eq!(out.state, TransformState::AccessWidened);
        assert_eq!(out.path, PathBuf::from("mod.jar+remap1+aw1"));

        let same = chain.request(&out, TransformState::Remapped, &aux).unwrap();
        assert_eq!(same, out);
    }

    #[test]
    fn missing_step_is_reported() {
        let mut chain = TransformChain::new();
        chain.push(Step(TransformState::Remapped, "remap"));
        let err = chain.request(&raw(), TransformState::MixinProcessed, &[]).unwrap_err();
        assert!(matches!(err, GraphError::UnreachableTransformState(_)));
    }

    #[test]
    fn joined_falls_back_to_client_jar() {
        let mut provider = StaticMinecraftProvider::new();
        provider.register(MinecraftArtifact {
            version: "1.20.1".into(),
            distribution: Distribution::Client,
            jar: PathBuf::from("client.jar"),
            libraries: vec![],
        });
        let mc = provider.minecraft("1.20.1", Distribution::Joined).unwrap();
        assert_eq!(mc.jar, PathBuf::from("client.jar"));
        assert!(provider.minecraft("1.20.1", Distribution::Common).is_err());
    }
}
