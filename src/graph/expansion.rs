//! Expansion of declared dependencies into resource-level edges.
//!
//! Runs once the tree is frozen, so composites expand to everything attached
//! beneath them by then, however late it was attached.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use super::DependencyGraph;
use crate::core::Result;
use crate::tree::logical_id::unit_of;
use crate::tree::{NodeId, NodeRole, Tree};

/// The final edge sets of a frozen tree.
#[derive(Debug, Default)]
pub(crate) struct Expanded {
    /// Prerequisite resources per resource, explicit first, then implicit.
    pub(crate) edges: BTreeMap<NodeId, Vec<NodeId>>,
    /// Stack-level edges lifted from cross-stack dependencies.
    pub(crate) stack_edges: BTreeSet<(NodeId, NodeId)>,
}

impl Expanded {
    /// A graph over every resource of the tree.
    pub(crate) fn resource_graph(&self) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for (&node, prerequisites) in &self.edges {
            graph.ensure_node(node);
            for &p in prerequisites {
                graph.add_dependency(node, p);
            }
        }
        graph
    }

    /// A graph over stacks.
    pub(crate) fn stack_graph(&self, tree: &Tree) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for stack in tree.stacks() {
            graph.ensure_node(stack);
        }
        for &(from, to) in &self.stack_edges {
            graph.add_dependency(from, to);
        }
        graph
    }
}

/// Compute the deduplicated prerequisite list of every resource.
pub(crate) fn expand(tree: &Tree) -> Result<Expanded> {
    let mut expanded = Expanded::default();

    for resource in tree.resources_beneath(tree.root())? {
        let unit = unit_of(tree, resource);
        let mut prerequisites: Vec<NodeId> = Vec::new();

        let mut push = |p: NodeId, explicit: bool, out: &mut Vec<NodeId>| {
            if p == resource {
                return;
            }
            let p_unit = unit_of(tree, p);
            if p_unit != unit {
                // only explicit edges between two stacks order anything
                if explicit && unit != tree.root() && p_unit != tree.root() {
                    expanded.stack_edges.insert((unit, p_unit));
                }
            } else if !out.contains(&p) {
                out.push(p);
            }
        };

        for declared in declared_dependencies(tree, resource)? {
            for p in expand_prerequisite(tree, declared)? {
                push(p, true, &mut prerequisites);
            }
        }

        let node = tree.node(resource)?;
        for value in node.properties().values() {
            for target in value.references() {
                if tree.node(target).is_ok_and(|t| t.is_resource()) {
                    push(target, false, &mut prerequisites);
                }
            }
        }

        expanded.edges.insert(resource, prerequisites);
    }

    debug!(
        "expanded dependencies: {} resources, {} edges, {} stack edges",
        expanded.edges.len(),
        expanded.edges.values().map(Vec::len).sum::<usize>(),
        expanded.stack_edges.len()
    );
    Ok(expanded)
}

/// Explicit dependencies that apply to `resource`: its own, in call order,
/// then those declared on each enclosing scope, innermost first.
fn declared_dependencies(tree: &Tree, resource: NodeId) -> Result<Vec<NodeId>> {
    let mut declared = Vec::new();
    let mut current = Some(resource);
    while let Some(id) = current {
        let node = tree.node(id)?;
        declared.extend_from_slice(node.dependencies());
        current = node.parent();
    }
    Ok(declared)
}

/// The resources a dependency on `target` stands for.
///
/// A resource stands for itself. A composite stands for its dependency roots
/// when it has any, else for every resource beneath it in tree order.
pub(crate) fn expand_prerequisite(tree: &Tree, target: NodeId) -> Result<Vec<NodeId>> {
    let node = tree.node(target)?;
    let resources = match node.role() {
        NodeRole::Resource { .. } => vec![target],
        NodeRole::Stack | NodeRole::Construct => match &node.dependency_roots {
            Some(roots) => {
                let mut out = Vec::new();
                for &root in roots {
                    for r in expand_prerequisite(tree, root)? {
                        if !out.contains(&r) {
                            out.push(r);
                        }
                    }
                }
                out
            }
            None => tree.resources_beneath(target)?,
        },
        NodeRole::App | NodeRole::Parameter(_) | NodeRole::Import(_) => Vec::new(),
    };

    if resources.is_empty() && !matches!(node.role(), NodeRole::Resource { .. }) {
        warn!("dependency on {} expands to no resources", tree.path(target)?);
    }
    Ok(resources)
}
