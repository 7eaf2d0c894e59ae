// ─── Project ───
// Arena owning every target and compilation, plus the user-facing
// declaration calls. Cross-target mutation only goes through the link
// operations below.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use serde::Serialize;
use tracing::debug;

use super::topology;
use crate::core::compilation::{Compilation, CompilationId, CompilationSlot};
use crate::core::error::{GraphError, GraphResult};
use crate::core::target::{LoaderKind, Target, TargetId, TargetKind, TargetState};

/// Kind of edge between two compilations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// Joint compilation of sources.
    Source,
    /// Compiled output on the classpath.
    Classpath,
    /// Back-reference only.
    Weak,
}

/// Deferred wiring produced by lazy-compilation listeners.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Wiring {
    /// Once `target`'s `slot` exists, link `from` to it.
    Watch {
        from: CompilationId,
        target: TargetId,
        slot: CompilationSlot,
        link: LinkKind,
    },
    Link {
        from: CompilationId,
        to: CompilationId,
        link: LinkKind,
    },
}

pub(crate) type WiringQueue = Rc<RefCell<VecDeque<Wiring>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectPhase {
    Configuring,
    Linked,
    Sealed,
}

/// The whole build model of one mod project.
pub struct Project {
    group: String,
    artifact_id: String,
    version: String,
    pub(crate) targets: Vec<Target>,
    pub(crate) compilations: Vec<Compilation>,
    names: HashMap<String, TargetId>,
    pub(crate) queue: WiringQueue,
    pub(crate) phase: ProjectPhase,
}

impl Project {
    pub fn new(group: &str, artifact_id: &str, version: &str) -> Self {
        Self {
            group: group.to_string(),
            artifact_id: artifact_id.to_string(),
            version: version.to_string(),
            targets: Vec::new(),
            compilations: Vec::new(),
            names: HashMap::new(),
            queue: Rc::new(RefCell::new(VecDeque::new())),
            phase: ProjectPhase::Configuring,
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn phase(&self) -> ProjectPhase {
        self.phase
    }

    /// Capabilities are derived from the artifact id, so it is frozen as soon
    /// as the first target exists.
    pub fn set_artifact_id(&mut self, artifact_id: &str) -> GraphResult<()> {
        self.ensure_configurable("artifactId")?;
        if !self.targets.is_empty() {
            return Err(GraphError::RestrictedProperty {
                property: "artifactId".into(),
                reason: format!(
                    "{} target(s) already derive capabilities from '{}'",
                    self.targets.len(),
                    self.artifact_id
                ),
            });
        }
        self.artifact_id = artifact_id.to_string();
        Ok(())
    }

    pub fn set_version(&mut self, version: &str) -> GraphResult<()> {
        self.ensure_configurable("version")?;
        self.version = version.to_string();
        Ok(())
    }

    pub(crate) fn ensure_configurable(&self, what: &str) -> GraphResult<()> {
        if self.phase == ProjectPhase::Sealed {
            return Err(GraphError::Sealed(what.to_string()));
        }
        Ok(())
    }

    fn ensure_declarable(&self, what: &str) -> GraphResult<()> {
        if self.phase >= ProjectPhase::Linked {
            return Err(GraphError::Sealed(format!("{} (targets already linked)", what)));
        }
        Ok(())
    }

    // ── Targets ─────────────────────────────────────────

    pub fn common(&mut self, name: &str) -> GraphResult<TargetId> {
        self.declare(name, TargetKind::Common)
    }

    pub fn edge(&mut self, name: &str, loader: LoaderKind) -> GraphResult<TargetId> {
        self.declare(name, TargetKind::edge(loader))
    }

    pub fn fabric(&mut self, name: &str) -> GraphResult<TargetId> {
        self.edge(name, LoaderKind::Fabric)
    }

    pub fn forge(&mut self, name: &str) -> GraphResult<TargetId> {
        self.edge(name, LoaderKind::Forge)
    }

    pub fn neoforge(&mut self, name: &str) -> GraphResult<TargetId> {
        self.edge(name, LoaderKind::NeoForge)
    }

    pub fn quilt(&mut self, name: &str) -> GraphResult<TargetId> {
        self.edge(name, LoaderKind::Quilt)
    }

    fn declare(&mut self, name: &str, kind: TargetKind) -> GraphResult<TargetId> {
        self.ensure_declarable(&format!("target '{}'", name))?;
        if name.trim().is_empty() {
            return Err(GraphError::Other("target name cannot be empty".into()));
        }
        if self.names.contains_key(name) {
            return Err(GraphError::DuplicateTarget(name.to_string()));
        }

        let id = TargetId(self.targets.len());
        let main = self.allocate(id, name, CompilationSlot::Main);
        debug!("Declared {} target '{}'", kind.type_name(), name);
        self.targets.push(Target::new(id, name.to_string(), kind, main));
        self.names.insert(name.to_string(), id);
        Ok(id)
    }

    fn allocate(&mut self, target: TargetId, target_name: &str, slot: CompilationSlot) -> CompilationId {
        let id = CompilationId(self.compilations.len());
        self.compilations
            .push(Compilation::new(id, target, target_name, slot));
        id
    }

    pub fn find(&self, name: &str) -> Option<TargetId> {
        self.names.get(name).copied()
    }

    pub fn require(&self, name: &str) -> GraphResult<TargetId> {
        self.find(name)
            .ok_or_else(|| GraphError::UnknownTarget(name.to_string()))
    }

    pub fn target(&self, id: TargetId) -> &Target {
        &self.targets[id.0]
    }

    /// Edge settings shape the wiring, so they are frozen once linked.
    pub fn target_mut(&mut self, id: TargetId) -> GraphResult<&mut Target> {
        let what = format!("settings of '{}'", self.targets[id.0].name);
        self.ensure_declarable(&what)?;
        Ok(&mut self.targets[id.0])
    }

    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter()
    }

    /// Declare that `dependent` builds on the common target `dependency`.
    ///
    /// Rejects self-dependencies, dependencies on edge targets and anything
    /// that would close a cycle.
    pub fn depends_on(&mut self, dependent: TargetId, dependency: TargetId) -> GraphResult<()> {
        let dependent_name = self.targets[dependent.0].name.clone();
        let dependency_name = self.targets[dependency.0].name.clone();
        self.ensure_declarable(&format!("dependencies of '{}'", dependent_name))?;

        let invalid = |reason: &str| GraphError::InvalidDependency {
            dependent: dependent_name.clone(),
            dependency: dependency_name.clone(),
            reason: reason.to_string(),
        };

        if dependent == dependency {
            return Err(invalid("a target cannot depend on itself"));
        }
        if !self.targets[dependency.0].is_common() {
            return Err(invalid("only common targets can be depended on"));
        }
        if self.targets[dependent.0].depends_on.contains(&dependency) {
            return Ok(());
        }
        if let Some(cycle) = topology::cycle_through(self, dependent, dependency) {
            return Err(GraphError::DependencyCycle(cycle));
        }

        self.targets[dependent.0].depends_on.push(dependency);
        self.targets[dependency.0].dependents.push(dependent);
        self.targets[dependent.0].advance(TargetState::DependenciesRegistered);
        debug!("'{}' depends on '{}'", dependent_name, dependency_name);
        Ok(())
    }

    // ── Compilations ────────────────────────────────────

    pub fn main(&self, target: TargetId) -> CompilationId {
        self.targets[target.0].main
    }

    pub fn client(&mut self, target: TargetId) -> GraphResult<CompilationId> {
        self.materialize(target, CompilationSlot::Client)
    }

    pub fn data(&mut self, target: TargetId) -> GraphResult<CompilationId> {
        self.materialize(target, CompilationSlot::Data)
    }

    pub fn test(&mut self, target: TargetId) -> GraphResult<CompilationId> {
        self.materialize(target, CompilationSlot::Test)
    }

    /// Existing compilation in `slot`, without creating it.
    pub fn compilation_of(&self, target: TargetId, slot: CompilationSlot) -> Option<CompilationId> {
        self.targets[target.0].compilation(slot)
    }

    /// Create the compilation in `slot` if it does not exist yet, firing its
    /// pending listeners and draining the resulting wiring.
    pub fn materialize(&mut self, target: TargetId, slot: CompilationSlot) -> GraphResult<CompilationId> {
        if let Some(existing) = self.targets[target.0].compilation(slot) {
            return Ok(existing);
        }

        let name = self.targets[target.0].name.clone();
        self.ensure_configurable(&format!("{}:{}", name, slot))?;
        if !self.targets[target.0].supports(slot) {
            return Err(GraphError::ClientNotSupported(name));
        }

        let id = self.allocate(target, &name, slot);
        let owner = &mut self.targets[target.0];
        if let Some(handle) = owner.handle_mut(slot) {
            handle.configure(|| id);
        }
        owner.advance(TargetState::CompilationsMaterialized);
        debug!("Materialized compilation {}:{}", name, slot);

        self.drain()?;
        Ok(id)
    }

    /// Materialize `slot` and run `action` on it.
    pub fn configure(
        &mut self,
        target: TargetId,
        slot: CompilationSlot,
        action: impl FnOnce(&mut Compilation) -> GraphResult<()>,
    ) -> GraphResult<CompilationId> {
        let id = self.materialize(target, slot)?;
        action(&mut self.compilations[id.0])?;
        Ok(id)
    }

    /// Run `listener` once `slot` of `target` exists.
    ///
    /// Slots the target can never hold are rejected instead of left waiting.
    pub fn on_configured(
        &mut self,
        target: TargetId,
        slot: CompilationSlot,
        listener: impl FnOnce(CompilationId) + 'static,
    ) -> GraphResult<()> {
        let owner = &mut self.targets[target.0];
        if !owner.supports(slot) {
            return Err(GraphError::ClientNotSupported(owner.name.clone()));
        }
        let main = owner.main;
        match owner.handle_mut(slot) {
            Some(handle) => handle.on_configured(move |id| listener(*id)),
            None => listener(main),
        }
        Ok(())
    }

    pub fn compilation(&self, id: CompilationId) -> &Compilation {
        &self.compilations[id.0]
    }

    pub fn compilation_mut(&mut self, id: CompilationId) -> GraphResult<&mut Compilation> {
        self.ensure_configurable("compilation")?;
        Ok(&mut self.compilations[id.0])
    }

    pub fn compilations(&self) -> impl Iterator<Item = &Compilation> {
        self.compilations.iter()
    }

    pub fn owner(&self, id: CompilationId) -> &Target {
        &self.targets[self.compilations[id.0].target.0]
    }

    // ── Links ───────────────────────────────────────────

    /// Static link `from → to`. Returns `false` when the link already existed.
    pub fn add_source_dependency(&mut self, from: CompilationId, to: CompilationId) -> GraphResult<bool> {
        self.ensure_configurable("source dependencies")?;
        self.validate_static_link(from, to)?;
        let added = self.compilations[from.0].add_source_dependency(to);
        if added {
            debug!(
                "{} includes sources of {}",
                self.compilations[from.0].name(),
                self.compilations[to.0].name()
            );
        }
        Ok(added)
    }

    /// Dynamic link `from → to`. Returns `false` when the link already existed.
    pub fn add_classpath_dependency(&mut self, from: CompilationId, to: CompilationId) -> GraphResult<bool> {
        self.ensure_configurable("classpath dependencies")?;
        if from == to {
            return Err(self.incompatible(from, to, "a compilation cannot depend on itself"));
        }
        let added = self.compilations[from.0].add_classpath_dependency(to);
        if added {
            debug!(
                "{} has {} on its classpath",
                self.compilations[from.0].name(),
                self.compilations[to.0].name()
            );
        }
        Ok(added)
    }

    pub fn add_weak_link(&mut self, from: CompilationId, to: CompilationId) -> GraphResult<bool> {
        self.ensure_configurable("weak links")?;
        Ok(self.compilations[from.0].add_weak_link(to))
    }

    fn validate_static_link(&self, from: CompilationId, to: CompilationId) -> GraphResult<()> {
        if from == to {
            return Err(self.incompatible(from, to, "a compilation cannot include itself"));
        }
        let from_target = self.compilations[from.0].target;
        let to_target = self.compilations[to.0].target;
        if from_target != to_target && !self.targets[to_target.0].is_common() {
            return Err(self.incompatible(
                from,
                to,
                "only compilations of common targets can be included in another target",
            ));
        }
        if self.source_closure(to).contains(&from) {
            return Err(self.incompatible(from, to, "the link would close a source cycle"));
        }
        Ok(())
    }

    fn incompatible(&self, from: CompilationId, to: CompilationId, reason: &str) -> GraphError {
        GraphError::IncompatibleLink {
            from: self.compilations[from.0].name().to_string(),
            to: self.compilations[to.0].name().to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn project() -> Project {
        Project::new("com.example", "mymod", "1.0.0")
    }

    #[test]
    fn declaring_targets_creates_main_eagerly() {
        let mut p = project();
        let common = p.common("common").unwrap();
        let fabric = p.fabric("fabric").unwrap();

        assert_eq!(p.compilation(p.main(common)).name(), "common:main");
        assert_eq!(p.compilation(p.main(fabric)).name(), "fabric:main");
        assert_eq!(p.compilation_of(fabric, CompilationSlot::Client), None);
        assert_eq!(p.find("fabric"), Some(fabric));
        assert!(matches!(p.common("common"), Err(GraphError::DuplicateTarget(_))));
    }

    #[test]
    fn depends_on_keeps_both_directions_consistent() {
        let mut p = project();
        let common = p.common("common").unwrap();
        let forge = p.forge("forge").unwrap();
        p.depends_on(forge, common).unwrap();
        p.depends_on(forge, common).unwrap();

        assert_eq!(p.target(forge).depends_on(), &[common]);
        assert_eq!(p.target(common).dependents(), &[forge]);
        assert_eq!(p.target(forge).state(), TargetState::DependenciesRegistered);

        for t in p.targets() {
            for dep in t.depends_on() {
                assert!(p.target(*dep).dependents().contains(&t.id()));
            }
        }
    }

    #[test]
    fn edges_cannot_be_depended_on() {
        let mut p = project();
        let fabric = p.fabric("fabric").unwrap();
        let quilt = p.quilt("quilt").unwrap();
        let err = p.depends_on(quilt, fabric).unwrap_err();
        assert!(matches!(err, GraphError::InvalidDependency { .. }));
    }

    #[test]
    fn cycles_between_commons_are_rejected_eagerly() {
        let mut p = project();
        let a = p.common("a").unwrap();
        let b = p.common("b").unwrap();
        let c = p.common("c").unwrap();
        p.depends_on(a, b).unwrap();
        p.depends_on(b, c).unwrap();

        match p.depends_on(c, a).unwrap_err() {
            GraphError::DependencyCycle(chain) => {
                assert_eq!(chain, vec!["c", "a", "b", "c"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(p.depends_on(a, a).is_err());
        assert!(p.target(c).depends_on().is_empty());
    }

    #[test]
    fn artifact_id_is_restricted_once_targets_exist() {
        let mut p = project();
        p.set_artifact_id("renamed").unwrap();
        p.common("common").unwrap();
        let err = p.set_artifact_id("again").unwrap_err();
        assert!(matches!(err, GraphError::RestrictedProperty { .. }));
        assert_eq!(p.artifact_id(), "renamed");
    }

    #[test]
    fn forge_has_no_client_compilation() {
        let mut p = project();
        let forge = p.forge("forge").unwrap();
        assert!(matches!(p.client(forge), Err(GraphError::ClientNotSupported(_))));
    }

    #[test]
    fn materialize_is_idempotent_and_fires_listeners() {
        let mut p = project();
        let common = p.common("common").unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let log = seen.clone();
        p.on_configured(common, CompilationSlot::Data, move |id| log.borrow_mut().push(id))
            .unwrap();

        let first = p.data(common).unwrap();
        let second = p.data(common).unwrap();
        assert_eq!(first, second);
        assert_eq!(*seen.borrow(), vec![first]);
        assert_eq!(p.target(common).state(), TargetState::CompilationsMaterialized);
    }

    #[test]
    fn listeners_on_impossible_slots_are_rejected() {
        let mut p = project();
        let forge = p.forge("forge").unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let log = seen.clone();
        let err = p
            .on_configured(forge, CompilationSlot::Client, move |id| log.borrow_mut().push(id))
            .unwrap_err();
        assert!(matches!(err, GraphError::ClientNotSupported(_)));

        let log = seen.clone();
        p.on_configured(forge, CompilationSlot::Main, move |id| log.borrow_mut().push(id))
            .unwrap();
        assert_eq!(*seen.borrow(), vec![p.main(forge)]);
    }

    #[test]
    fn edge_settings_are_frozen_after_link() {
        let mut p = project();
        let common = p.common("common").unwrap();
        let fabric = p.fabric("fabric").unwrap();
        p.target_mut(fabric).unwrap().set_minecraft_version("1.20.1").unwrap();
        p.depends_on(fabric, common).unwrap();
        p.link().unwrap();

        let err = p.target_mut(fabric).unwrap_err();
        assert!(matches!(err, GraphError::Sealed(_)));
        assert_eq!(p.target(fabric).client_mode(), crate::core::target::ClientMode::Split);

        let common_client = p.client(common).unwrap();
        let fabric_client = p.client(fabric).unwrap();
        assert!(p.compilation(fabric_client).source_dependencies().contains(&common_client));
        assert!(!p.compilation(p.main(fabric)).source_dependencies().contains(&common_client));
    }

    #[test]
    fn source_links_are_idempotent() {
        let mut p = project();
        let common = p.common("common").unwrap();
        let fabric = p.fabric("fabric").unwrap();
        let (edge_main, common_main) = (p.main(fabric), p.main(common));

        assert!(p.add_source_dependency(edge_main, common_main).unwrap());
        let once = p.source_closure(edge_main);
        assert!(!p.add_source_dependency(edge_main, common_main).unwrap());
        assert_eq!(p.source_closure(edge_main), once);
        assert_eq!(p.compilation(edge_main).source_dependencies(), &[common_main]);
    }

    #[test]
    fn static_links_into_edges_fail_fast() {
        let mut p = project();
        let common = p.common("common").unwrap();
        let fabric = p.fabric("fabric").unwrap();
        let forge = p.forge("forge").unwrap();

        let err = p.add_source_dependency(p.main(forge), p.main(fabric)).unwrap_err();
        assert!(matches!(err, GraphError::IncompatibleLink { .. }));
        let err = p.add_source_dependency(p.main(common), p.main(fabric)).unwrap_err();
        assert!(matches!(err, GraphError::IncompatibleLink { .. }));
        let main = p.main(common);
        assert!(p.add_source_dependency(main, main).is_err());
    }
}
