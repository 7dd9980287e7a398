//! The context tokens resolve against.

use crate::core::{Result, SynthError};
use crate::tree::logical_id::{LogicalIds, unit_of};
use crate::tree::{NodeId, Tree};

/// Everything a token may consult while resolving.
///
/// The context is read-only: it borrows the frozen tree and its logical-ID
/// table, and names the stack whose template is being produced. Tokens that
/// encode differently depending on where they are consumed (references to
/// import stand-ins, cross-stack references) look at [`consumer`](Self::consumer).
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    tree: &'a Tree,
    ids: &'a LogicalIds,
    consumer: Option<NodeId>,
    max_depth: usize,
}

impl<'a> ResolveContext<'a> {
    pub(crate) fn new(tree: &'a Tree, ids: &'a LogicalIds, consumer: Option<NodeId>) -> Self {
        Self {
            tree,
            ids,
            consumer,
            max_depth: tree.config().max_token_depth,
        }
    }

    /// The tree being synthesized.
    pub fn tree(&self) -> &'a Tree {
        self.tree
    }

    /// The consuming stack, `None` for free-standing resolution.
    pub fn consumer(&self) -> Option<NodeId> {
        self.consumer
    }

    /// Bound on nested token resolution.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// The final logical ID of a resource or parameter.
    ///
    /// # Errors
    ///
    /// - [`SynthError::CyclicToken`] if the node's identity depends on a
    ///   fingerprint that is still being computed
    /// - [`SynthError::InvalidReference`] if the node has no logical ID
    pub fn logical_id(&self, node: NodeId) -> Result<&'a str> {
        if self.ids.is_pending(node) {
            return Err(SynthError::CyclicToken {
                token: format!("logical ID of {}", self.tree.path(node)?),
            });
        }
        self.ids.get(node).ok_or_else(|| SynthError::InvalidReference {
            path: self.tree.path(node).map(|p| p.to_string()).unwrap_or_default(),
            reason: "the node has no logical ID".to_string(),
        })
    }

    /// Fail unless `target` can be referenced directly from the consuming
    /// stack. Free-standing resolution accepts any target.
    pub fn check_same_unit(&self, target: NodeId) -> Result<()> {
        let Some(consumer) = self.consumer else {
            return Ok(());
        };
        let unit = unit_of(self.tree, target);
        if unit == consumer {
            return Ok(());
        }
        Err(SynthError::UnresolvedScope {
            path: self.tree.path(target)?.to_string(),
            reason: format!(
                "defined in '{}' but referenced from '{}'; export it and import the export instead",
                self.tree.path(unit)?,
                self.tree.path(consumer)?
            ),
        })
    }
}
