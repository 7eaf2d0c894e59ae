// ─── Attribute Finalization ───
// Computes every compilation's variant attributes once configuration is over
// and freezes the project.

use tracing::{debug, info};

use super::project::{Project, ProjectPhase};
use super::topology;
use crate::core::attributes::{select_variant, AttributeContainer, Candidate, Distribution};
use crate::core::compilation::{CompilationId, CompilationSlot};
use crate::core::error::{GraphError, GraphResult};
use crate::core::target::{ClientMode, TargetState};

impl Project {
    /// Link, then seal. The usual entry point once configuration is done.
    pub fn evaluate(&mut self) -> GraphResult<()> {
        self.link()?;
        self.seal()
    }

    /// Finalize attributes and reject any further mutation.
    pub fn seal(&mut self) -> GraphResult<()> {
        if self.phase == ProjectPhase::Sealed {
            return Ok(());
        }
        self.link()?;

        for target in &self.targets {
            if !target.is_common() && target.minecraft_version().is_none() {
                return Err(GraphError::MissingMinecraftVersion(target.name.clone()));
            }
        }

        for idx in 0..self.compilations.len() {
            let base = self.base_attributes(CompilationId(idx));
            let compilation = &mut self.compilations[idx];
            let name = compilation.name().to_string();
            let attrs = compilation.finalize_attributes(base);
            debug!("{} → {}", name, attrs);
        }

        self.phase = ProjectPhase::Sealed;
        for target in &mut self.targets {
            target.advance(TargetState::Sealed);
        }
        info!("Sealed project {}:{}", self.group(), self.artifact_id());
        Ok(())
    }

    /// Distribution attribute of a compilation.
    pub fn distribution_of(&self, id: CompilationId) -> Distribution {
        let owner = self.owner(id);
        match (self.compilations[id.0].slot(), owner.client_mode()) {
            (CompilationSlot::Client, _) => Distribution::Client,
            (_, ClientMode::Included) => Distribution::Joined,
            (_, ClientMode::Split) => Distribution::Common,
        }
    }

    /// Attributes derived from the graph, before user actions are replayed.
    ///
    /// Commons only carry `modLoader`, `commonType` and `minecraftVersion`
    /// when every transitive edge dependent agrees on the value.
    pub fn base_attributes(&self, id: CompilationId) -> AttributeContainer {
        let compilation = &self.compilations[id.0];
        let owner = self.owner(id);

        let mut attrs = AttributeContainer::new();
        attrs
            .distribution(self.distribution_of(id))
            .data(compilation.slot() == CompilationSlot::Data);

        match owner.loader() {
            Some(loader) => {
                attrs.mod_loader(loader.into());
                if let Some(version) = owner.minecraft_version() {
                    attrs.minecraft_version(version);
                }
            }
            None => {
                attrs.common_name(owner.name());
                let edges: Vec<_> = topology::transitive_dependents(self, owner.id)
                    .into_iter()
                    .map(|t| &self.targets[t.0])
                    .filter(|t| !t.is_common())
                    .collect();

                if let Some(loader) = single(edges.iter().map(|t| t.loader())) {
                    attrs.mod_loader(loader.into()).common_type(loader.as_str());
                }
                if let Some(version) = single(edges.iter().map(|t| t.minecraft_version())) {
                    attrs.minecraft_version(version);
                }
            }
        }
        attrs
    }

    /// Finalized attributes; `None` until the project is sealed.
    pub fn attributes(&self, id: CompilationId) -> Option<&AttributeContainer> {
        self.compilations[id.0].finalized_attributes()
    }

    /// Pick the compilation among `candidates` that best serves `request`.
    pub fn select_compilation(
        &self,
        request: &AttributeContainer,
        candidates: &[CompilationId],
    ) -> GraphResult<CompilationId> {
        let mut offered = Vec::with_capacity(candidates.len());
        for id in candidates {
            let compilation = &self.compilations[id.0];
            let attributes = compilation.finalized_attributes().ok_or_else(|| {
                GraphError::Other(format!(
                    "attributes of {} are not final until the project is sealed",
                    compilation.name()
                ))
            })?;
            offered.push(Candidate {
                name: compilation.name().to_string(),
                attributes,
            });
        }
        let idx = select_variant(request, &offered)?;
        Ok(candidates[idx])
    }

    /// Resolve `request` against every published compilation of the project.
    pub fn resolve_variant(&self, request: &AttributeContainer) -> GraphResult<CompilationId> {
        let candidates: Vec<CompilationId> = self
            .compilations
            .iter()
            .filter(|c| !c.is_test())
            .map(|c| c.id)
            .collect();
        self.select_compilation(request, &candidates)
    }
}

/// The one value every item agrees on. Empty input or any `None` yields `None`.
fn single<T: PartialEq>(mut values: impl Iterator<Item = Option<T>>) -> Option<T> {
    let first = values.next()??;
    for value in values {
        if value.as_ref() != Some(&first) {
            return None;
        }
    }
    Some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attributes::{AttributeKey, ModLoader};
    use crate::core::target::TargetId;

    fn with_edges(versions: [&str; 2]) -> (Project, TargetId) {
        let mut p = Project::new("com.example", "mymod", "1.0.0");
        let common = p.common("common").unwrap();
        let forge = p.forge("forge").unwrap();
        let neo = p.neoforge("neoforge").unwrap();
        p.target_mut(forge).unwrap().set_minecraft_version(versions[0]).unwrap();
        p.target_mut(neo).unwrap().set_minecraft_version(versions[1]).unwrap();
        p.depends_on(forge, common).unwrap();
        p.depends_on(neo, common).unwrap();
        p.evaluate().unwrap();
        (p, common)
    }

    #[test]
    fn divergent_versions_drop_minecraft_version() {
        let (p, common) = with_edges(["1.19.4", "1.21"]);
        let attrs = p.attributes(p.main(common)).unwrap();
        assert!(!attrs.contains(AttributeKey::MinecraftVersion));
        assert!(!attrs.contains(AttributeKey::ModLoader));
        assert!(!attrs.contains(AttributeKey::CommonType));
        assert_eq!(attrs.get_text(AttributeKey::CommonName), Some("common"));
    }

    #[test]
    fn agreeing_versions_keep_minecraft_version() {
        let (p, common) = with_edges(["1.20.1", "1.20.1"]);
        let attrs = p.attributes(p.main(common)).unwrap();
        assert_eq!(attrs.get_minecraft_version(), Some("1.20.1"));
    }

    #[test]
    fn single_loader_common_carries_loader_tags() {
        let mut p = Project::new("com.example", "mymod", "1.0.0");
        let fabric_common = p.common("fabric-common").unwrap();
        let a = p.fabric("fabric-1.20").unwrap();
        let b = p.fabric("fabric-1.21").unwrap();
        p.target_mut(a).unwrap().set_minecraft_version("1.20.1").unwrap();
        p.target_mut(b).unwrap().set_minecraft_version("1.21").unwrap();
        p.depends_on(a, fabric_common).unwrap();
        p.depends_on(b, fabric_common).unwrap();
        p.evaluate().unwrap();

        let attrs = p.attributes(p.main(fabric_common)).unwrap();
        assert_eq!(attrs.get_mod_loader(), Some(ModLoader::Fabric));
        assert_eq!(attrs.get_text(AttributeKey::CommonType), Some("fabric"));
        assert!(attrs.get_minecraft_version().is_none());
    }

    #[test]
    fn edge_attributes_and_user_actions() {
        let mut p = Project::new("com.example", "mymod", "1.0.0");
        let fabric = p.fabric("fabric").unwrap();
        p.target_mut(fabric).unwrap().set_minecraft_version("1.20.1").unwrap();
        let client = p.client(fabric).unwrap();
        let data = p
            .configure(fabric, CompilationSlot::Data, |c| {
                c.attributes(|attrs| {
                    attrs.common_name("datagen");
                });
                Ok(())
            })
            .unwrap();
        p.evaluate().unwrap();

        let main = p.attributes(p.main(fabric)).unwrap();
        assert_eq!(main.get_distribution(), Some(Distribution::Common));
        assert_eq!(main.get_mod_loader(), Some(ModLoader::Fabric));
        assert_eq!(main.get_data(), Some(false));
        assert_eq!(p.attributes(client).unwrap().get_distribution(), Some(Distribution::Client));
        let data_attrs = p.attributes(data).unwrap();
        assert_eq!(data_attrs.get_data(), Some(true));
        assert_eq!(data_attrs.get_text(AttributeKey::CommonName), Some("datagen"));
    }

    #[test]
    fn sealed_project_rejects_changes() {
        let (mut p, common) = with_edges(["1.20.1", "1.20.1"]);
        assert!(matches!(p.data(common), Err(GraphError::Sealed(_))));
        assert!(matches!(p.common("late"), Err(GraphError::Sealed(_))));
        assert!(p.target_mut(common).is_err());
        assert_eq!(p.target(common).state(), TargetState::Sealed);
    }

    #[test]
    fn edges_need_a_minecraft_version() {
        let mut p = Project::new("com.example", "mymod", "1.0.0");
        p.quilt("quilt").unwrap();
        assert!(matches!(p.evaluate(), Err(GraphError::MissingMinecraftVersion(_))));
    }

    #[test]
    fn client_request_resolves_to_joined_variant() {
        let mut p = Project::new("com.example", "mymod", "1.0.0");
        let fabric = p.fabric("fabric").unwrap();
        let forge = p.forge("forge").unwrap();
        p.target_mut(fabric).unwrap().set_minecraft_version("1.20.1").unwrap();
        p.target_mut(forge).unwrap().set_minecraft_version("1.20.1").unwrap();
        p.evaluate().unwrap();

        let candidates = [p.main(fabric), p.main(forge)];
        let mut request = AttributeContainer::new();
        request.distribution(Distribution::Client);
        assert_eq!(p.select_compilation(&request, &candidates).unwrap(), p.main(forge));

        let mut request = AttributeContainer::new();
        request.distribution(Distribution::Common);
        assert_eq!(p.select_compilation(&request, &candidates).unwrap(), p.main(fabric));
    }

    fn fabric_with_slots() -> (Project, TargetId) {
        let mut p = Project::new("com.example", "mymod", "1.0.0");
        let fabric = p.fabric("fabric").unwrap();
        p.target_mut(fabric).unwrap().set_minecraft_version("1.20.1").unwrap();
        p.client(fabric).unwrap();
        p.data(fabric).unwrap();
        p.test(fabric).unwrap();
        (p, fabric)
    }

    #[test]
    fn resolve_variant_waits_for_seal() {
        let (p, _) = fabric_with_slots();
        let request = AttributeContainer::new();
        assert!(matches!(p.resolve_variant(&request), Err(GraphError::Other(_))));
    }

    #[test]
    fn data_request_resolves_to_data_compilation() {
        let (mut p, fabric) = fabric_with_slots();
        p.evaluate().unwrap();
        let data = p.compilation_of(fabric, CompilationSlot::Data).unwrap();

        let mut request = AttributeContainer::new();
        request
            .distribution(Distribution::Common)
            .data(true)
            .mod_loader(ModLoader::Fabric);
        assert_eq!(p.resolve_variant(&request).unwrap(), data);

        let mut request = AttributeContainer::new();
        request.distribution(Distribution::Common).mod_loader(ModLoader::Fabric);
        assert_eq!(p.resolve_variant(&request).unwrap(), p.main(fabric));
    }

    #[test]
    fn resolve_variant_skips_tests_and_honours_distribution() {
        let (mut p, fabric) = fabric_with_slots();
        p.evaluate().unwrap();

        let mut request = AttributeContainer::new();
        request.distribution(Distribution::Client);
        let client = p.compilation_of(fabric, CompilationSlot::Client).unwrap();
        assert_eq!(p.resolve_variant(&request).unwrap(), client);

        let mut request = AttributeContainer::new();
        request.mod_loader(ModLoader::Forge);
        assert!(matches!(
            p.resolve_variant(&request),
            Err(GraphError::NoMatchingVariant(_))
        ));
    }
}
