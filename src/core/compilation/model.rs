use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;

use super::buckets::DependencyBuckets;
use crate::core::attributes::AttributeContainer;
use crate::core::error::GraphResult;
use crate::core::target::TargetId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CompilationId(pub(crate) usize);

impl CompilationId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Named position of a compilation inside its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilationSlot {
    Main,
    Client,
    Data,
    Test,
}

impl CompilationSlot {
    pub const ALL: [CompilationSlot; 4] = [
        CompilationSlot::Main,
        CompilationSlot::Client,
        CompilationSlot::Data,
        CompilationSlot::Test,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompilationSlot::Main => "main",
            CompilationSlot::Client => "client",
            CompilationSlot::Data => "data",
            CompilationSlot::Test => "test",
        }
    }
}

impl fmt::Display for CompilationSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute contribution replayed every time the attribute set is finalized.
pub type AttributeAction = Box<dyn Fn(&mut AttributeContainer)>;

/// One named unit of sources and dependency buckets inside a target.
pub struct Compilation {
    pub(crate) id: CompilationId,
    pub(crate) target: TargetId,
    pub(crate) slot: CompilationSlot,
    name: String,
    source_roots: Vec<PathBuf>,
    dependencies: DependencyBuckets,
    source_dependencies: Vec<CompilationId>,
    classpath_dependencies: Vec<CompilationId>,
    weak_links: Vec<CompilationId>,
    attribute_actions: Vec<AttributeAction>,
    finalized_attributes: Option<AttributeContainer>,
    javadoc_jar: bool,
    sources_jar: bool,
    mixins: Vec<PathBuf>,
    metadata: Map<String, Value>,
}

impl Compilation {
    pub(crate) fn new(
        id: CompilationId,
        target: TargetId,
        target_name: &str,
        slot: CompilationSlot,
    ) -> Self {
        let base = PathBuf::from("src").join(target_name).join(slot.as_str());
        Self {
            id,
            target,
            slot,
            name: format!("{}:{}", target_name, slot),
            source_roots: vec![base.join("java"), base.join("resources")],
            dependencies: DependencyBuckets::default(),
            source_dependencies: Vec::new(),
            classpath_dependencies: Vec::new(),
            weak_links: Vec::new(),
            attribute_actions: Vec::new(),
            finalized_attributes: None,
            javadoc_jar: false,
            sources_jar: false,
            mixins: Vec::new(),
            metadata: Map::new(),
        }
    }

    pub fn id(&self) -> CompilationId {
        self.id
    }

    pub fn target(&self) -> TargetId {
        self.target
    }

    pub fn slot(&self) -> CompilationSlot {
        self.slot
    }

    /// `<target>:<slot>`, e.g. `fabric:client`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_test(&self) -> bool {
        self.slot == CompilationSlot::Test
    }

    pub fn source_roots(&self) -> &[PathBuf] {
        &self.source_roots
    }

    // ── Dependencies ────────────────────────────────────

    pub fn dependencies(
        &mut self,
        configure: impl FnOnce(&mut DependencyBuckets) -> GraphResult<()>,
    ) -> GraphResult<()> {
        configure(&mut self.dependencies)
    }

    pub fn buckets(&self) -> &DependencyBuckets {
        &self.dependencies
    }

    /// Static link: `other` is compiled jointly with this compilation.
    /// Returns `false` if the link already existed.
    ///
    /// Callers outside the crate go through the validating
    /// `Project::add_source_dependency`:
    ///
    /// ```compile_fail
    /// let mut p = multiloader_lib::Project::new("com.example", "mymod", "1.0.0");
    /// let fabric = p.fabric("fabric").unwrap();
    /// let forge = p.forge("forge").unwrap();
    /// let (from, to) = (p.main(forge), p.main(fabric));
    /// p.compilation_mut(from).unwrap().add_source_dependency(to);
    /// ```
    pub(crate) fn add_source_dependency(&mut self, other: CompilationId) -> bool {
        push_unique(&mut self.source_dependencies, other)
    }

    /// Dynamic link: `other`'s output and buckets join this classpath.
    /// Returns `false` if the link already existed.
    pub(crate) fn add_classpath_dependency(&mut self, other: CompilationId) -> bool {
        push_unique(&mut self.classpath_dependencies, other)
    }

    /// Back-reference that forms no compile dependency.
    pub(crate) fn add_weak_link(&mut self, other: CompilationId) -> bool {
        push_unique(&mut self.weak_links, other)
    }

    pub fn source_dependencies(&self) -> &[CompilationId] {
        &self.source_dependencies
    }

    pub fn classpath_dependencies(&self) -> &[CompilationId] {
        &self.classpath_dependencies
    }

    pub fn weak_links(&self) -> &[CompilationId] {
        &self.weak_links
    }

    // ── Attributes ──────────────────────────────────────

    /// Queue an attribute contribution. Replayed over the computed base set
    /// whenever attributes are finalized.
    pub fn attributes(&mut self, action: impl Fn(&mut AttributeContainer) + 'static) {
        self.attribute_actions.push(Box::new(action));
    }

    pub(crate) fn finalize_attributes(&mut self, base: AttributeContainer) -> &AttributeContainer {
        let mut attrs = base;
        for action in &self.attribute_actions {
            action(&mut attrs);
        }
        self.finalized_attributes.insert(attrs)
    }

    pub fn finalized_attributes(&self) -> Option<&AttributeContainer> {
        self.finalized_attributes.as_ref()
    }

    // ── Publishing ──────────────────────────────────────

    pub fn with_javadoc_jar(&mut self) {
        self.javadoc_jar = true;
    }

    pub fn with_sources_jar(&mut self) {
        self.sources_jar = true;
    }

    pub fn publishes_javadoc(&self) -> bool {
        self.javadoc_jar
    }

    pub fn publishes_sources(&self) -> bool {
        self.sources_jar
    }

    // ── Loader inputs ───────────────────────────────────

    pub fn add_mixin(&mut self, config: PathBuf) {
        if !self.mixins.contains(&config) {
            self.mixins.push(config);
        }
    }

    pub fn mixins(&self) -> &[PathBuf] {
        &self.mixins
    }

    /// Mutate the metadata object handed to descriptor generators.
    pub fn metadata(&mut self, configure: impl FnOnce(&mut Map<String, Value>)) {
        configure(&mut self.metadata);
    }

    pub fn metadata_object(&self) -> &Map<String, Value> {
        &self.metadata
    }
}

impl fmt::Debug for Compilation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compilation")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("source_dependencies", &self.source_dependencies)
            .field("classpath_dependencies", &self.classpath_dependencies)
            .field("weak_links", &self.weak_links)
            .field("attribute_actions", &self.attribute_actions.len())
            .finish()
    }
}

fn push_unique(list: &mut Vec<CompilationId>, id: CompilationId) -> bool {
    if list.contains(&id) {
        return false;
    }
    list.push(id);
    true
}
