use serde::Serialize;
use std::path::PathBuf;

use super::kind::{ClientMode, LoaderKind, TargetKind};
use crate::core::compilation::{CompilationId, CompilationSlot};
use crate::core::error::{GraphError, GraphResult};
use crate::core::lazy::LazyHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TargetId(pub(crate) usize);

impl TargetId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Configuration lifecycle of a target. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetState {
    Declared,
    DependenciesRegistered,
    CompilationsMaterialized,
    Linked,
    Sealed,
}

/// A common or edge target owning a main compilation and lazily created
/// client / data / test compilations.
#[derive(Debug)]
pub struct Target {
    pub(crate) id: TargetId,
    pub(crate) name: String,
    pub(crate) kind: TargetKind,
    pub(crate) main: CompilationId,
    pub(crate) client: LazyHandle<CompilationId>,
    pub(crate) data: LazyHandle<CompilationId>,
    pub(crate) test: LazyHandle<CompilationId>,
    pub(crate) depends_on: Vec<TargetId>,
    pub(crate) dependents: Vec<TargetId>,
    pub(crate) state: TargetState,
}

impl Target {
    pub(crate) fn new(id: TargetId, name: String, kind: TargetKind, main: CompilationId) -> Self {
        Self {
            id,
            name,
            kind,
            main,
            client: LazyHandle::new(),
            data: LazyHandle::new(),
            test: LazyHandle::new(),
            depends_on: Vec::new(),
            dependents: Vec::new(),
            state: TargetState::Declared,
        }
    }

    pub fn id(&self) -> TargetId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &TargetKind {
        &self.kind
    }

    pub fn is_common(&self) -> bool {
        self.kind.is_common()
    }

    pub fn loader(&self) -> Option<LoaderKind> {
        self.kind.loader()
    }

    pub fn client_mode(&self) -> ClientMode {
        self.kind.client_mode()
    }

    pub fn minecraft_version(&self) -> Option<&str> {
        self.kind
            .platform()
            .and_then(|p| p.minecraft_version.as_deref())
    }

    pub fn loader_version(&self) -> Option<&str> {
        self.kind.platform().and_then(|p| p.loader_version.as_deref())
    }

    pub fn depends_on(&self) -> &[TargetId] {
        &self.depends_on
    }

    pub fn dependents(&self) -> &[TargetId] {
        &self.dependents
    }

    pub fn state(&self) -> TargetState {
        self.state
    }

    pub fn main(&self) -> CompilationId {
        self.main
    }

    /// The compilation in `slot`, if it exists. Never creates one.
    pub fn compilation(&self, slot: CompilationSlot) -> Option<CompilationId> {
        match slot {
            CompilationSlot::Main => Some(self.main),
            other => self.handle(other).and_then(|h| h.get().copied()),
        }
    }

    pub(crate) fn handle(&self, slot: CompilationSlot) -> Option<&LazyHandle<CompilationId>> {
        match slot {
            CompilationSlot::Main => None,
            CompilationSlot::Client => Some(&self.client),
            CompilationSlot::Data => Some(&self.data),
            CompilationSlot::Test => Some(&self.test),
        }
    }

    pub(crate) fn handle_mut(
        &mut self,
        slot: CompilationSlot,
    ) -> Option<&mut LazyHandle<CompilationId>> {
        match slot {
            CompilationSlot::Main => None,
            CompilationSlot::Client => Some(&mut self.client),
            CompilationSlot::Data => Some(&mut self.data),
            CompilationSlot::Test => Some(&mut self.test),
        }
    }

    /// Whether `slot` may ever hold a compilation for this target.
    pub fn supports(&self, slot: CompilationSlot) -> bool {
        match slot {
            CompilationSlot::Client => self.client_mode() == ClientMode::Split,
            _ => true,
        }
    }

    pub(crate) fn advance(&mut self, state: TargetState) {
        if state > self.state {
            self.state = state;
        }
    }

    // ── Edge settings ───────────────────────────────────

    pub fn set_minecraft_version(&mut self, version: &str) -> GraphResult<()> {
        let name = self.name.clone();
        let platform = self.kind.platform_mut().ok_or_else(|| GraphError::RestrictedProperty {
            property: "minecraftVersion".into(),
            reason: format!("common target '{}' derives it from its dependents", name),
        })?;
        platform.minecraft_version = Some(version.to_string());
        Ok(())
    }

    pub fn set_loader_version(&mut self, version: &str) -> GraphResult<()> {
        let name = self.name.clone();
        let platform = self.kind.platform_mut().ok_or_else(|| GraphError::RestrictedProperty {
            property: "loaderVersion".into(),
            reason: format!("common target '{}' has no loader", name),
        })?;
        platform.loader_version = Some(version.to_string());
        Ok(())
    }

    /// Fold client code into `main` (Fabric/Quilt only).
    pub fn set_include_client(&mut self, include: bool) -> GraphResult<()> {
        let restricted = |reason: String| GraphError::RestrictedProperty {
            property: "includeClient".into(),
            reason,
        };
        let Some(loader) = self.loader() else {
            return Err(restricted(format!(
                "common target '{}' always splits client code",
                self.name
            )));
        };
        if !loader.supports_client_split() {
            return Err(restricted(format!("{} target '{}' cannot split client code", loader, self.name)));
        }
        if self.client.is_configured() {
            return Err(restricted(format!(
                "target '{}' already has a client compilation",
                self.name
            )));
        }
        if let TargetKind::Fabric(s) | TargetKind::Quilt(s) = &mut self.kind {
            s.include_client = include;
        }
        Ok(())
    }

    /// Register an access widener (Fabric/Quilt) or access transformer (Forge/NeoForge).
    pub fn add_access_file(&mut self, path: PathBuf) -> GraphResult<()> {
        let files = match &mut self.kind {
            TargetKind::Fabric(s) | TargetKind::Quilt(s) => &mut s.access_wideners,
            TargetKind::Forge(s) | TargetKind::NeoForge(s) => &mut s.access_transformers,
            TargetKind::Common => {
                return Err(GraphError::RestrictedProperty {
                    property: "accessFiles".into(),
                    reason: format!("common target '{}' is not remapped", self.name),
                })
            }
        };
        if !files.contains(&path) {
            files.push(path);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(kind: TargetKind) -> Target {
        Target::new(TargetId(0), "t".into(), kind, CompilationId(0))
    }

    #[test]
    fn common_targets_reject_edge_settings() {
        let mut common = target(TargetKind::Common);
        assert!(common.set_minecraft_version("1.20.1").is_err());
        assert!(common.set_loader_version("0.15.0").is_err());
        assert!(common.add_access_file("a.accesswidener".into()).is_err());
        assert!(matches!(
            common.set_include_client(true),
            Err(GraphError::RestrictedProperty { .. })
        ));
        assert!(common.minecraft_version().is_none());
    }

    #[test]
    fn include_client_locked_once_client_exists() {
        let mut fabric = target(TargetKind::edge(LoaderKind::Fabric));
        fabric.set_include_client(true).unwrap();
        assert!(!fabric.supports(CompilationSlot::Client));
        fabric.set_include_client(false).unwrap();

        fabric.client.configure(|| CompilationId(1));
        assert!(fabric.set_include_client(true).is_err());
    }

    #[test]
    fn forge_never_splits_client() {
        let mut forge = target(TargetKind::edge(LoaderKind::Forge));
        assert!(!forge.supports(CompilationSlot::Client));
        assert!(forge.set_include_client(false).is_err());
    }

    #[test]
    fn state_only_moves_forward() {
        let mut t = target(TargetKind::Common);
        t.advance(TargetState::Linked);
        t.advance(TargetState::DependenciesRegistered);
        assert_eq!(t.state(), TargetState::Linked);
    }

    #[test]
    fn compilation_lookup_never_constructs() {
        let t = target(TargetKind::Common);
        assert_eq!(t.compilation(CompilationSlot::Main), Some(CompilationId(0)));
        assert_eq!(t.compilation(CompilationSlot::Data), None);
        assert!(!t.data.is_configured());
    }
}
