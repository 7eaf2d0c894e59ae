// ─── Target Topology ───
// Transitive queries over `depends_on` and petgraph-backed cycle checks.

use petgraph::algo::{has_path_connecting, toposort};
use petgraph::graph::{DiGraph, NodeIndex};

use super::project::Project;
use crate::core::error::{GraphError, GraphResult};
use crate::core::target::TargetId;

/// Edges point from dependent to dependency. Node `i` is target `i`.
fn target_graph(project: &Project) -> DiGraph<TargetId, ()> {
    let mut graph = DiGraph::with_capacity(project.targets.len(), 0);
    for target in &project.targets {
        graph.add_node(target.id);
    }
    for target in &project.targets {
        for dep in &target.depends_on {
            graph.add_edge(NodeIndex::new(target.id.0), NodeIndex::new(dep.0), ());
        }
    }
    graph
}

/// The chain of names `dependent -> dependency -> ... -> dependent` that adding
/// `dependent -> dependency` would close, if any.
pub(crate) fn cycle_through(
    project: &Project,
    dependent: TargetId,
    dependency: TargetId,
) -> Option<Vec<String>> {
    let graph = target_graph(project);
    let reaches = has_path_connecting(
        &graph,
        NodeIndex::new(dependency.0),
        NodeIndex::new(dependent.0),
        None,
    );
    if !reaches {
        return None;
    }

    let mut chain = vec![project.targets[dependent.0].name.clone()];
    let mut path = Vec::new();
    if find_path(project, dependency, dependent, &mut path) {
        chain.extend(path.iter().map(|t| project.targets[t.0].name.clone()));
    }
    Some(chain)
}

fn find_path(project: &Project, from: TargetId, to: TargetId, path: &mut Vec<TargetId>) -> bool {
    path.push(from);
    if from == to {
        return true;
    }
    for next in &project.targets[from.0].depends_on {
        if find_path(project, *next, to, path) {
            return true;
        }
    }
    path.pop();
    false
}

/// Targets ordered so every dependency comes before its dependents.
pub(crate) fn dependency_order(project: &Project) -> GraphResult<Vec<TargetId>> {
    let graph = target_graph(project);
    let mut order = toposort(&graph, None).map_err(|cycle| {
        let name = project.targets[cycle.node_id().index()].name.clone();
        GraphError::DependencyCycle(vec![name.clone(), name])
    })?;
    order.reverse();
    Ok(order.into_iter().map(|idx| graph[idx]).collect())
}

/// Every common target reachable through `depends_on`, nearest first.
pub(crate) fn transitive_dependencies(project: &Project, target: TargetId) -> Vec<TargetId> {
    collect(project, target, |t| project.targets[t.0].depends_on.as_slice())
}

/// Every target that transitively depends on `target`.
pub(crate) fn transitive_dependents(project: &Project, target: TargetId) -> Vec<TargetId> {
    collect(project, target, |t| project.targets[t.0].dependents.as_slice())
}

fn collect<'a>(
    project: &'a Project,
    start: TargetId,
    next: impl Fn(TargetId) -> &'a [TargetId],
) -> Vec<TargetId> {
    let mut seen = vec![false; project.targets.len()];
    seen[start.0] = true;
    let mut out = Vec::new();
    let mut frontier = vec![start];
    // Breadth-first so direct neighbours are listed before further ancestors.
    while !frontier.is_empty() {
        let mut following = Vec::new();
        for t in frontier {
            for n in next(t) {
                if !seen[n.0] {
                    seen[n.0] = true;
                    out.push(*n);
                    following.push(*n);
                }
            }
        }
        frontier = following;
    }
    out
}
