//! The construct tree.
//!
//! Application code builds a [`Tree`] of nodes, each attached to an explicit
//! parent scope. There is no ambient "current scope": every creation call
//! names its parent. The tree is mutable only while it is being built;
//! [`Tree::freeze`] consumes it and hands back a read-only
//! [`FrozenTree`](crate::synth::FrozenTree) for synthesis, so build and
//! synthesis can never interleave.
//!
//! # Structure
//!
//! ```text
//! /                      App (root)
//! └── prod               Stack        one template per stack
//!     └── api            Construct    pure scope
//!         ├── Resource   Resource     emitted, kind "Api"
//!         └── r1         Resource
//! ```
//!
//! Children are kept ordered by local id. Traversals therefore depend only on
//! the final shape of the tree, not on the order of attach calls.
//!
//! # Examples
//!
//! ```rust
//! use construct_synth::tree::Tree;
//!
//! let mut tree = Tree::new();
//! let stack = tree.add_stack("prod")?;
//! let api = tree.add_construct(stack, "api")?;
//! let r1 = tree.add_resource(api, "r1", "My::Resource")?;
//!
//! assert_eq!(tree.path(r1)?.to_string(), "/prod/api/r1");
//! assert_eq!(tree.path_from(api, r1)?.to_string(), "/r1");
//! assert!(tree.add_construct(api, "r1").is_err());
//! # Ok::<(), construct_synth::core::SynthError>(())
//! ```

pub mod identifier;
pub(crate) mod logical_id;
mod node;
mod path;

pub(crate) use node::FingerprintSpec;
pub use node::{Node, NodeId, NodeRole, ParameterSpec, RemovalPolicy};
pub use path::Path;

use indexmap::IndexMap;
use std::collections::BTreeMap;
use tracing::trace;

use crate::config::SynthConfig;
use crate::core::{ResourceSpec, Result, SynthError};
use crate::export::Output;
use crate::token::Value;

/// Arena of nodes rooted at an app node.
#[derive(Debug, Clone)]
pub struct Tree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) config: SynthConfig,
    /// Outputs registered per stack, in registration order.
    pub(crate) outputs: BTreeMap<NodeId, IndexMap<String, Output>>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// An empty tree with default settings.
    pub fn new() -> Self {
        Self::with_config(SynthConfig::default())
    }

    /// An empty tree with the given settings.
    pub fn with_config(config: SynthConfig) -> Self {
        Self {
            nodes: vec![Node::new("", None, NodeRole::App)],
            config,
            outputs: BTreeMap::new(),
        }
    }

    /// The settings this tree synthesizes with.
    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// The root node.
    pub const fn root(&self) -> NodeId {
        NodeId::from_raw(0)
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.index()).ok_or(SynthError::UnknownNode { id: id.index() })
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id.index()).ok_or(SynthError::UnknownNode { id: id.index() })
    }

    /// Attach a new node under `parent`.
    ///
    /// # Errors
    ///
    /// - [`SynthError::InvalidIdentifier`] if `id` breaks the identifier rules
    /// - [`SynthError::DuplicateSibling`] if `parent` already has a child `id`
    /// - [`SynthError::InvalidOperation`] if `parent` cannot contain children
    ///   or `role` cannot live under it
    ///
    /// A failed attach leaves the tree unchanged.
    pub fn attach(&mut self, parent: NodeId, id: &str, role: NodeRole) -> Result<NodeId> {
        identifier::validate_local_id(id)?;

        let parent_node = self.node(parent)?;
        if !parent_node.role.is_scope() {
            return Err(SynthError::InvalidOperation {
                path: self.path(parent)?.to_string(),
                reason: format!("a {} cannot contain children", parent_node.role.name()),
            });
        }
        match role {
            NodeRole::App => {
                return Err(SynthError::InvalidOperation {
                    path: self.path(parent)?.child(id).to_string(),
                    reason: "a tree has exactly one app root".to_string(),
                });
            }
            NodeRole::Stack if parent != self.root() => {
                return Err(SynthError::InvalidOperation {
                    path: self.path(parent)?.child(id).to_string(),
                    reason: "stacks must be attached directly to the root".to_string(),
                });
            }
            _ => {}
        }
        if parent_node.children.contains_key(id) {
            return Err(SynthError::DuplicateSibling {
                parent: self.path(parent)?.to_string(),
                id: id.to_string(),
            });
        }

        let node_id = NodeId::from_raw(self.nodes.len());
        trace!("attach {} '{}' under {}", role.name(), id, parent);
        self.nodes.push(Node::new(id, Some(parent), role));
        self.node_mut(parent)?.children.insert(id.to_string(), node_id);
        Ok(node_id)
    }

    /// Attach a stack (synthesis unit) under the root.
    pub fn add_stack(&mut self, id: &str) -> Result<NodeId> {
        self.attach(self.root(), id, NodeRole::Stack)
    }

    /// Attach a pure scope.
    pub fn add_construct(&mut self, parent: NodeId, id: &str) -> Result<NodeId> {
        self.attach(parent, id, NodeRole::Construct)
    }

    /// Attach a resource of the given kind with no properties.
    pub fn add_resource(
        &mut self,
        parent: NodeId,
        id: &str,
        resource_type: impl Into<String>,
    ) -> Result<NodeId> {
        self.attach(
            parent,
            id,
            NodeRole::Resource {
                resource_type: resource_type.into(),
            },
        )
    }

    /// Attach a resource described by a [`ResourceSpec`].
    ///
    /// Non-empty significant inputs turn on fingerprinting for the node.
    pub fn add_resource_from(
        &mut self,
        parent: NodeId,
        id: &str,
        spec: &impl ResourceSpec,
    ) -> Result<NodeId> {
        let node_id = self.add_resource(parent, id, spec.resource_type())?;
        let significant = spec.significant_inputs();
        let node = self.node_mut(node_id)?;
        node.properties = spec.encode();
        if !significant.is_empty() {
            node.fingerprint = Some(FingerprintSpec {
                inputs: significant,
                include_prerequisites: false,
            });
        }
        Ok(node_id)
    }

    /// Attach a template parameter.
    pub fn add_parameter(&mut self, parent: NodeId, id: &str, spec: ParameterSpec) -> Result<NodeId> {
        self.attach(parent, id, NodeRole::Parameter(spec))
    }

    /// Set a property on a resource. Setting an existing key replaces the
    /// value in place, keeping its position.
    pub fn set_property(
        &mut self,
        node: NodeId,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<()> {
        self.require_resource(node, "properties")?;
        self.node_mut(node)?.properties.insert(key.into(), value.into());
        Ok(())
    }

    /// Set the removal policy of a resource.
    pub fn set_removal_policy(&mut self, node: NodeId, policy: RemovalPolicy) -> Result<()> {
        self.require_resource(node, "a removal policy")?;
        self.node_mut(node)?.removal_policy = Some(policy);
        Ok(())
    }

    /// Replace the computed logical ID of a resource or parameter.
    ///
    /// The override must be alphanumeric. A fingerprint suffix, if the node
    /// has one, is still appended, and the result must stay within
    /// [`MAX_LOGICAL_ID_LENGTH`](crate::constants::MAX_LOGICAL_ID_LENGTH).
    pub fn override_logical_id(&mut self, node: NodeId, logical_id: &str) -> Result<()> {
        identifier::validate_logical_id(logical_id)?;
        let target = self.node(node)?;
        if !matches!(target.role, NodeRole::Resource { .. } | NodeRole::Parameter(_)) {
            return Err(SynthError::InvalidOperation {
                path: self.path(node)?.to_string(),
                reason: format!("a {} has no logical ID", target.role.name()),
            });
        }
        if target.is_fingerprinted() {
            identifier::validate_suffixed_logical_id(logical_id, self.config.fingerprint_length)?;
        }
        self.node_mut(node)?.logical_id_override = Some(logical_id.to_string());
        Ok(())
    }

    /// The path of a node from the root.
    pub fn path(&self, node: NodeId) -> Result<Path> {
        let mut segments = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            let n = self.node(id)?;
            if n.parent.is_some() {
                segments.push(n.local_id.clone());
            }
            current = n.parent;
        }
        segments.reverse();
        Ok(Path::from_segments(segments))
    }

    /// The path of `node` relative to `ancestor`.
    ///
    /// # Errors
    ///
    /// [`SynthError::InvalidOperation`] if `node` is not `ancestor` or beneath it.
    pub fn path_from(&self, ancestor: NodeId, node: NodeId) -> Result<Path> {
        let mut segments = Vec::new();
        let mut current = node;
        while current != ancestor {
            let n = self.node(current)?;
            segments.push(n.local_id.clone());
            current = n.parent.ok_or_else(|| SynthError::InvalidOperation {
                path: self.path(node).map(|p| p.to_string()).unwrap_or_default(),
                reason: format!("not beneath {ancestor}"),
            })?;
        }
        segments.reverse();
        Ok(Path::from_segments(segments))
    }

    /// The nearest stack at or above `node`.
    pub fn stack_of(&self, node: NodeId) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            let n = self.node(id).ok()?;
            if n.role == NodeRole::Stack {
                return Some(id);
            }
            current = n.parent;
        }
        None
    }

    /// The child of `parent` with the given local id.
    pub fn find_child(&self, parent: NodeId, id: &str) -> Option<NodeId> {
        self.node(parent).ok()?.children.get(id).copied()
    }

    /// All stacks, ordered by name.
    pub fn stacks(&self) -> Vec<NodeId> {
        self.nodes[0]
            .children()
            .filter(|id| self.nodes[id.index()].role == NodeRole::Stack)
            .collect()
    }

    /// `node` and everything beneath it, depth first, children by local id.
    pub fn subtree(&self, node: NodeId) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let n = self.node(id)?;
            out.push(id);
            // reversed so the smallest id is visited first
            stack.extend(n.children.values().rev().copied());
        }
        Ok(out)
    }

    /// Resources at or beneath `node`, in subtree order.
    pub fn resources_beneath(&self, node: NodeId) -> Result<Vec<NodeId>> {
        Ok(self
            .subtree(node)?
            .into_iter()
            .filter(|id| self.nodes[id.index()].is_resource())
            .collect())
    }

    fn require_resource(&self, node: NodeId, what: &str) -> Result<()> {
        let n = self.node(node)?;
        if n.is_resource() {
            Ok(())
        } else {
            Err(SynthError::InvalidOperation {
                path: self.path(node)?.to_string(),
                reason: format!("only resources carry {what}, not a {}", n.role.name()),
            })
        }
    }
}
