//! Dependency graph.
//!
//! Resources are ordered by two kinds of edges:
//!
//! - **Explicit** edges declared with [`Tree::add_dependency`]. Either side
//!   may be a composite: a composite prerequisite stands for its dependency
//!   roots (see [`Tree::set_dependency_roots`]) or for every resource beneath
//!   it; a composite dependent passes the edge on to every resource beneath it.
//! - **Implicit** edges from reference tokens embedded in a resource's
//!   properties.
//!
//! Both are expanded only when the tree is frozen, so a dependency on a
//! composite covers resources attached after the call. The resulting list per
//! resource is deduplicated, excludes self edges, and lists explicit edges
//! first in call order, then implicit ones in property order. Edges between
//! stacks are lifted to stack-level ordering and never appear in `DependsOn`.

mod dependency_graph;
pub(crate) mod expansion;

pub use dependency_graph::DependencyGraph;

use tracing::trace;

use crate::core::{Result, SynthError};
use crate::tree::{NodeId, NodeRole, Tree};

impl Tree {
    /// Declare that `dependent` must be realized after `prerequisite`.
    ///
    /// Repeating a declaration has no effect.
    ///
    /// # Errors
    ///
    /// [`SynthError::InvalidOperation`] if either side is the root, a
    /// parameter or an import stand-in. Imports live in another synthesis
    /// unit and cannot be ordered locally.
    pub fn add_dependency(&mut self, dependent: NodeId, prerequisite: NodeId) -> Result<()> {
        self.require_orderable(dependent)?;
        self.require_orderable(prerequisite)?;

        let node = self.node_mut(dependent)?;
        if !node.dependencies.contains(&prerequisite) {
            node.dependencies.push(prerequisite);
            trace!("dependency {} -> {}", dependent, prerequisite);
        }
        Ok(())
    }

    /// Restrict what a dependency on `composite` expands to.
    ///
    /// Each root must lie beneath `composite`. Roots that are composites
    /// themselves expand in turn.
    pub fn set_dependency_roots(
        &mut self,
        composite: NodeId,
        roots: impl IntoIterator<Item = NodeId>,
    ) -> Result<()> {
        let composite_node = self.node(composite)?;
        if !matches!(composite_node.role(), NodeRole::Stack | NodeRole::Construct) {
            return Err(SynthError::InvalidOperation {
                path: self.path(composite)?.to_string(),
                reason: format!(
                    "dependency roots apply to composites, not a {}",
                    composite_node.role().name()
                ),
            });
        }

        let roots: Vec<NodeId> = roots.into_iter().collect();
        for &root in &roots {
            self.require_orderable(root)?;
            let beneath = root != composite && self.path_from(composite, root).is_ok();
            if !beneath {
                return Err(SynthError::InvalidOperation {
                    path: self.path(root)?.to_string(),
                    reason: format!("not beneath {}", self.path(composite)?),
                });
            }
        }

        self.node_mut(composite)?.dependency_roots = Some(roots);
        Ok(())
    }

    fn require_orderable(&self, node: NodeId) -> Result<()> {
        let n = self.node(node)?;
        let reason = match n.role() {
            NodeRole::App => "the root cannot take part in ordering",
            NodeRole::Parameter(_) => "parameters cannot take part in ordering",
            NodeRole::Import(_) => {
                "import stand-ins belong to another synthesis unit and cannot be ordered locally"
            }
            NodeRole::Stack | NodeRole::Construct | NodeRole::Resource { .. } => return Ok(()),
        };
        Err(SynthError::InvalidOperation {
            path: self.path(node)?.to_string(),
            reason: reason.to_string(),
        })
    }
}
