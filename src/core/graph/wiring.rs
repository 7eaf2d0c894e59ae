// ─── Graph Wiring ───
// Applies the common → dependent link rules once configuration closes.
// Every rule that involves a lazy compilation is registered as a listener,
// so links appear whenever the compilation is materialized, before or after
// `link()` runs.

use tracing::{debug, info};

use super::project::{LinkKind, Project, ProjectPhase, Wiring};
use super::topology;
use crate::core::compilation::{CompilationId, CompilationSlot};
use crate::core::error::GraphResult;
use crate::core::target::{ClientMode, TargetId, TargetState};

impl Project {
    /// Wire every target to the transitive closure of its common dependencies.
    /// Calling it again is a no-op.
    pub fn link(&mut self) -> GraphResult<()> {
        if self.phase >= ProjectPhase::Linked {
            return Ok(());
        }

        // Dependencies first so stacked commons are wired before their users.
        let order = topology::dependency_order(self)?;
        for target in &order {
            self.wire_target(*target);
        }

        self.phase = ProjectPhase::Linked;
        for target in &mut self.targets {
            target.advance(TargetState::Linked);
        }
        self.drain()?;

        info!(
            "Linked {} targets ({} compilations)",
            self.targets.len(),
            self.compilations.len()
        );
        Ok(())
    }

    fn wire_target(&mut self, target: TargetId) {
        let owner = &self.targets[target.0];
        let main = owner.main;
        let split = owner.client_mode() == ClientMode::Split;
        let direct = owner.depends_on.clone();
        debug!("Wiring target '{}' ({} client)", owner.name, if split { "split" } else { "included" });

        // Inside the target.
        self.when_configured(target, CompilationSlot::Client, move |client| Wiring::Link {
            from: client,
            to: main,
            link: LinkKind::Source,
        });
        for slot in [CompilationSlot::Data, CompilationSlot::Test] {
            self.when_configured(target, slot, move |from| Wiring::Link {
                from,
                to: main,
                link: LinkKind::Classpath,
            });
        }
        if split {
            self.when_configured(target, CompilationSlot::Data, move |from| Wiring::Watch {
                from,
                target,
                slot: CompilationSlot::Client,
                link: LinkKind::Classpath,
            });
        }

        // Towards every common ancestor.
        for ancestor in topology::transitive_dependencies(self, target) {
            self.enqueue(Wiring::Link {
                from: main,
                to: self.targets[ancestor.0].main,
                link: LinkKind::Source,
            });
            for slot in [CompilationSlot::Data, CompilationSlot::Test] {
                self.watch_pair(target, slot, ancestor, slot, LinkKind::Source);
            }

            if split {
                self.watch_pair(target, CompilationSlot::Client, ancestor, CompilationSlot::Client, LinkKind::Source);
            } else {
                let link = if direct.contains(&ancestor) {
                    LinkKind::Source
                } else {
                    LinkKind::Weak
                };
                self.enqueue(Wiring::Watch {
                    from: main,
                    target: ancestor,
                    slot: CompilationSlot::Client,
                    link,
                });
            }
        }
    }

    /// Once `slot` of `target` exists, enqueue whatever `make` builds from it.
    fn when_configured(
        &mut self,
        target: TargetId,
        slot: CompilationSlot,
        make: impl FnOnce(CompilationId) -> Wiring + 'static,
    ) {
        let queue = self.queue.clone();
        if let Some(handle) = self.targets[target.0].handle_mut(slot) {
            handle.on_configured(move |id| queue.borrow_mut().push_back(make(*id)));
        }
    }

    /// Symmetric-lazy link between `slot` of `target` and `other_slot` of `other`.
    fn watch_pair(
        &mut self,
        target: TargetId,
        slot: CompilationSlot,
        other: TargetId,
        other_slot: CompilationSlot,
        link: LinkKind,
    ) {
        self.when_configured(target, slot, move |from| Wiring::Watch {
            from,
            target: other,
            slot: other_slot,
            link,
        });
    }

    fn enqueue(&self, wiring: Wiring) {
        self.queue.borrow_mut().push_back(wiring);
    }

    /// Apply queued wiring until nothing new appears.
    pub(crate) fn drain(&mut self) -> GraphResult<()> {
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(wiring) = next else {
                return Ok(());
            };

            match wiring {
                Wiring::Watch { from, target, slot: CompilationSlot::Main, link } => {
                    let to = self.targets[target.0].main;
                    self.enqueue(Wiring::Link { from, to, link });
                }
                Wiring::Watch { from, target, slot, link } => {
                    self.when_configured(target, slot, move |to| Wiring::Link { from, to, link });
                }
                Wiring::Link { from, to, link } => {
                    match link {
                        LinkKind::Source => self.add_source_dependency(from, to)?,
                        LinkKind::Classpath => self.add_classpath_dependency(from, to)?,
                        LinkKind::Weak => self.add_weak_link(from, to)?,
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::compilation::{CompilationId, CompilationSlot};
    use crate::core::graph::Project;
    use crate::core::target::TargetId;

    fn project() -> Project {
        Project::new("com.example", "mymod", "1.0.0")
    }

    /// Static links from `from` into compilations of `target`.
    fn sources_into(p: &Project, from: CompilationId, target: TargetId) -> Vec<CompilationId> {
        p.compilation(from)
            .source_dependencies()
            .iter()
            .copied()
            .filter(|c| p.compilation(*c).target() == target)
            .collect()
    }

    #[test]
    fn fabric_edge_with_bare_common() {
        let mut p = project();
        let common = p.common("common").unwrap();
        let edge = p.fabric("fabric").unwrap();
        p.depends_on(edge, common).unwrap();
        let client = p.client(edge).unwrap();
        let data = p.data(edge).unwrap();
        p.link().unwrap();

        assert_eq!(sources_into(&p, p.main(edge), common), vec![p.main(common)]);
        assert!(sources_into(&p, client, common).is_empty());
        assert!(sources_into(&p, data, common).is_empty());
        assert_eq!(p.compilation(client).source_dependencies(), &[p.main(edge)]);
        assert!(p.compilation(data).classpath_dependencies().contains(&p.main(edge)));
        assert!(p.compilation(data).classpath_dependencies().contains(&client));
    }

    #[test]
    fn data_link_appears_whichever_side_comes_first() {
        // common.data before the edge even exists
        let mut p = project();
        let common = p.common("common").unwrap();
        let common_data = p.data(common).unwrap();
        let edge = p.fabric("fabric").unwrap();
        p.depends_on(edge, common).unwrap();
        let edge_data = p.data(edge).unwrap();
        p.link().unwrap();
        assert_eq!(sources_into(&p, edge_data, common), vec![common_data]);

        // edge.data first, common.data only after linking
        let mut p = project();
        let common = p.common("common").unwrap();
        let edge = p.fabric("fabric").unwrap();
        p.depends_on(edge, common).unwrap();
        let edge_data = p.data(edge).unwrap();
        p.link().unwrap();
        assert!(sources_into(&p, edge_data, common).is_empty());
        let common_data = p.data(common).unwrap();
        assert_eq!(sources_into(&p, edge_data, common), vec![common_data]);

        // common.data after the edge, edge.data after linking
        let mut p = project();
        let common = p.common("common").unwrap();
        let edge = p.fabric("fabric").unwrap();
        p.depends_on(edge, common).unwrap();
        let common_data = p.data(common).unwrap();
        p.link().unwrap();
        let edge_data = p.data(edge).unwrap();
        assert_eq!(sources_into(&p, edge_data, common), vec![common_data]);
    }

    #[test]
    fn missing_test_on_common_is_not_an_error() {
        let mut p = project();
        let common = p.common("common").unwrap();
        let edge = p.neoforge("neoforge").unwrap();
        p.depends_on(edge, common).unwrap();
        let test = p.test(edge).unwrap();

        assert!(p.link().is_ok());
        assert!(sources_into(&p, test, common).is_empty());
        assert_eq!(p.compilation_of(common, CompilationSlot::Test), None);
    }

    #[test]
    fn stacked_commons_are_wired_transitively() {
        let mut p = project();
        let root = p.common("root").unwrap();
        let mid = p.common("mid").unwrap();
        let edge = p.fabric("fabric").unwrap();
        p.depends_on(mid, root).unwrap();
        p.depends_on(edge, mid).unwrap();
        let root_client = p.client(root).unwrap();
        let mid_client = p.client(mid).unwrap();
        let edge_client = p.client(edge).unwrap();
        p.link().unwrap();

        let edge_main = p.main(edge);
        assert!(p.compilation(edge_main).source_dependencies().contains(&p.main(mid)));
        assert!(p.compilation(edge_main).source_dependencies().contains(&p.main(root)));
        assert!(p.compilation(p.main(mid)).source_dependencies().contains(&p.main(root)));
        assert!(p.compilation(edge_client).source_dependencies().contains(&mid_client));
        assert!(p.compilation(edge_client).source_dependencies().contains(&root_client));
        assert!(p.compilation(mid_client).source_dependencies().contains(&root_client));
    }

    #[test]
    fn included_client_links_direct_common_client_and_weakly_links_ancestors() {
        let mut p = project();
        let root = p.common("root").unwrap();
        let mid = p.common("mid").unwrap();
        let forge = p.forge("forge").unwrap();
        p.depends_on(mid, root).unwrap();
        p.depends_on(forge, mid).unwrap();
        p.link().unwrap();

        let root_client = p.client(root).unwrap();
        let mid_client = p.client(mid).unwrap();
        let main = p.compilation(p.main(forge));
        assert!(main.source_dependencies().contains(&mid_client));
        assert!(!main.source_dependencies().contains(&root_client));
        assert_eq!(main.weak_links(), &[root_client]);
    }

    #[test]
    fn fabric_can_include_client_in_main() {
        let mut p = project();
        let common = p.common("common").unwrap();
        let edge = p.fabric("fabric").unwrap();
        p.target_mut(edge).unwrap().set_include_client(true).unwrap();
        p.depends_on(edge, common).unwrap();
        let common_client = p.client(common).unwrap();
        p.link().unwrap();

        assert!(p.client(edge).is_err());
        assert!(p.compilation(p.main(edge)).source_dependencies().contains(&common_client));
    }

    #[test]
    fn relinking_does_not_duplicate_links() {
        let mut p = project();
        let common = p.common("common").unwrap();
        let edge = p.quilt("quilt").unwrap();
        p.depends_on(edge, common).unwrap();
        p.link().unwrap();
        let before = p.compilation(p.main(edge)).source_dependencies().to_vec();
        p.link().unwrap();
        let main = p.main(edge);
        let common_main = p.main(common);
        p.add_source_dependency(main, common_main).unwrap();
        assert_eq!(p.compilation(main).source_dependencies(), before.as_slice());
    }
}
