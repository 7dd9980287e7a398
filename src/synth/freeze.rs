//! The build → synthesis transition.

use tracing::debug;

use super::FrozenTree;
use crate::core::Result;
use crate::fingerprint;
use crate::graph::expansion;
use crate::tree::Tree;
use crate::tree::logical_id;

impl Tree {
    /// End the build phase.
    ///
    /// Freezing assigns logical IDs, expands declared and token-implied
    /// dependencies, checks both the resource and the stack graph for cycles,
    /// and computes content fingerprints. Any failure aborts and the tree is
    /// dropped with it: there is no partially frozen state.
    ///
    /// # Errors
    ///
    /// [`SynthError::Cycle`](crate::core::SynthError::Cycle),
    /// [`SynthError::CyclicToken`](crate::core::SynthError::CyclicToken),
    /// [`SynthError::DuplicateLogicalId`](crate::core::SynthError::DuplicateLogicalId),
    /// and any resolution error raised while hashing significant inputs.
    pub fn freeze(self) -> Result<FrozenTree> {
        debug!("freezing tree with {} nodes", self.node_count());

        let mut ids = logical_id::assign(&self)?;
        let expanded = expansion::expand(&self)?;

        let resource_order = expanded.resource_graph().topological_order(&self)?;
        let stack_order = expanded.stack_graph(&self).topological_order(&self)?;
        debug!(
            "dependency graph is acyclic: {} resources, {} stacks",
            resource_order.len(),
            stack_order.len()
        );

        fingerprint::apply(&self, &mut ids, &expanded, &resource_order)?;
        ids.check_unique(&self)?;

        Ok(FrozenTree {
            tree: self,
            ids,
            edges: expanded.edges,
            stack_order,
        })
    }
}
