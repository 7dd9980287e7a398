//! Directed graph over tree nodes with cycle detection and ordering.
//!
//! Used twice during freezing: once over the resources of the tree (edges from
//! `DependsOn` lists) and once over stacks (edges lifted from cross-stack
//! dependencies). Both need the same two answers: is there a cycle, and if
//! not, in which order can the nodes be realized.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Reversed;
use std::collections::HashMap;

use crate::core::{Result, SynthError};
use crate::tree::{NodeId, Tree};

/// Color states for cycle detection using DFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Node has not been visited.
    White,
    /// Node is currently being visited (in the DFS stack).
    Gray,
    /// Node has been fully visited.
    Black,
}

/// Dependency graph between tree nodes.
///
/// An edge `from → to` means `from` depends on `to`: `to` must be realized
/// first. Nodes and edges keep their insertion order, so every traversal is
/// deterministic for a given sequence of calls.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// The underlying directed graph.
    graph: DiGraph<NodeId, ()>,
    /// Map from tree nodes to their graph indices.
    node_map: HashMap<NodeId, NodeIndex>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the graph if it doesn't already exist.
    pub fn ensure_node(&mut self, node: NodeId) -> NodeIndex {
        if let Some(&index) = self.node_map.get(&node) {
            index
        } else {
            let index = self.graph.add_node(node);
            self.node_map.insert(node, index);
            index
        }
    }

    /// Record that `from` depends on `to`.
    pub fn add_dependency(&mut self, from: NodeId, to: NodeId) {
        let from_idx = self.ensure_node(from);
        let to_idx = self.ensure_node(to);

        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, ());
        }
    }

    /// Detect cycles using DFS with colors.
    ///
    /// # Errors
    ///
    /// [`SynthError::Cycle`] naming the node paths along the first cycle
    /// found, e.g. `/prod/a → /prod/b → /prod/a`.
    pub fn detect_cycles(&self, tree: &Tree) -> Result<()> {
        let mut colors: HashMap<NodeIndex, Color> =
            self.graph.node_indices().map(|n| (n, Color::White)).collect();
        let mut path: Vec<NodeIndex> = Vec::new();

        for node in self.graph.node_indices() {
            if matches!(colors.get(&node), Some(Color::White))
                && let Some(cycle) = self.dfs_visit(node, &mut colors, &mut path)
            {
                let rendered = cycle
                    .iter()
                    .map(|&idx| {
                        let id = self.graph[idx];
                        tree.path(id).map_or_else(|_| id.to_string(), |p| p.to_string())
                    })
                    .collect::<Vec<_>>()
                    .join(" → ");
                return Err(SynthError::Cycle { cycle: rendered });
            }
        }

        Ok(())
    }

    /// Returns `Some(cycle)` if a cycle is reachable from `node`.
    fn dfs_visit(
        &self,
        node: NodeIndex,
        colors: &mut HashMap<NodeIndex, Color>,
        path: &mut Vec<NodeIndex>,
    ) -> Option<Vec<NodeIndex>> {
        colors.insert(node, Color::Gray);
        path.push(node);

        // neighbors() yields the most recent edge first
        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors(node).collect();
        neighbors.reverse();

        for neighbor in neighbors {
            match colors.get(&neighbor) {
                Some(Color::Gray) => {
                    let start = path.iter().position(|&n| n == neighbor)?;
                    let mut cycle = path[start..].to_vec();
                    cycle.push(neighbor);
                    return Some(cycle);
                }
                Some(Color::White) => {
                    if let Some(cycle) = self.dfs_visit(neighbor, colors, path) {
                        return Some(cycle);
                    }
                }
                _ => {}
            }
        }

        path.pop();
        colors.insert(node, Color::Black);
        None
    }

    /// Nodes ordered so that every node comes after its dependencies.
    pub fn topological_order(&self, tree: &Tree) -> Result<Vec<NodeId>> {
        self.detect_cycles(tree)?;

        // walking the reversed graph puts prerequisites first and keeps unrelated
        // nodes in insertion order
        match toposort(Reversed(&self.graph), None) {
            Ok(indices) => Ok(indices.into_iter().map(|idx| self.graph[idx]).collect()),
            Err(cycle) => {
                let id = self.graph[cycle.node_id()];
                Err(SynthError::Cycle {
                    cycle: tree.path(id).map_or_else(|_| id.to_string(), |p| p.to_string()),
                })
            }
        }
    }

    /// Direct dependencies of `node`, in insertion order.
    #[cfg(test)]
    pub fn direct_deps(&self, node: NodeId) -> Vec<NodeId> {
        let Some(&idx) = self.node_map.get(&node) else {
            return Vec::new();
        };
        let mut deps: Vec<NodeId> = self.graph.neighbors(idx).map(|n| self.graph[n]).collect();
        deps.reverse();
        deps
    }

    /// Check if the graph is empty.
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Get the total number of nodes in the graph.
    #[cfg(test)]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the total number of edges in the graph.
    #[cfg(test)]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
