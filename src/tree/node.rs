//! Node records stored in the tree arena.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::token::Value;

/// Handle to a node of a [`Tree`](super::Tree).
///
/// Handles are plain indices into the tree that issued them. Passing a handle
/// to another tree fails with [`SynthError::UnknownNode`](crate::core::SynthError::UnknownNode)
/// when out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Wrap a raw arena index.
    pub const fn from_raw(index: usize) -> Self {
        Self(index)
    }

    /// The raw arena index.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node contributes to the synthesized document.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeRole {
    /// The root of the tree
    App,
    /// A synthesis unit, emitted as its own template
    Stack,
    /// A pure scope grouping other nodes
    Construct,
    /// A resource entry of the given kind
    Resource {
        /// The kind tag emitted as `Type`
        resource_type: String,
    },
    /// A template parameter
    Parameter(ParameterSpec),
    /// Stand-in for the named export of another stack
    Import(String),
}

impl NodeRole {
    /// Short name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Stack => "stack",
            Self::Construct => "construct",
            Self::Resource { .. } => "resource",
            Self::Parameter(_) => "parameter",
            Self::Import(_) => "import",
        }
    }

    /// Returns `true` for nodes that can contain resources.
    pub fn is_scope(&self) -> bool {
        matches!(self, Self::App | Self::Stack | Self::Construct)
    }
}

/// Declaration of a template parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    /// Parameter type, e.g. `String` or `Number`
    pub parameter_type: String,
    /// Default value
    pub default: Option<Value>,
    /// Human-readable description
    pub description: Option<String>,
    /// Mask the value in consoles and logs
    pub no_echo: bool,
}

impl ParameterSpec {
    /// A parameter of the given type with no default.
    pub fn new(parameter_type: impl Into<String>) -> Self {
        Self {
            parameter_type: parameter_type.into(),
            default: None,
            description: None,
            no_echo: false,
        }
    }

    /// Set the default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// What happens to a resource when it is removed or replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RemovalPolicy {
    /// Delete the physical resource
    Delete,
    /// Keep the physical resource, orphaned
    Retain,
    /// Snapshot, then delete
    Snapshot,
}

/// Significant inputs recorded for content fingerprinting.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct FingerprintSpec {
    /// Explicit inputs; order matters.
    pub(crate) inputs: Vec<Value>,
    /// Fold the canonical form of every prerequisite resource in, as a set.
    pub(crate) include_prerequisites: bool,
}

/// One element of the construct tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) local_id: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: BTreeMap<String, NodeId>,
    pub(crate) role: NodeRole,
    pub(crate) properties: IndexMap<String, Value>,
    pub(crate) dependencies: Vec<NodeId>,
    pub(crate) removal_policy: Option<RemovalPolicy>,
    pub(crate) logical_id_override: Option<String>,
    pub(crate) fingerprint: Option<FingerprintSpec>,
    pub(crate) dependency_roots: Option<Vec<NodeId>>,
}

impl Node {
    pub(crate) fn new(local_id: impl Into<String>, parent: Option<NodeId>, role: NodeRole) -> Self {
        Self {
            local_id: local_id.into(),
            parent,
            children: BTreeMap::new(),
            role,
            properties: IndexMap::new(),
            dependencies: Vec::new(),
            removal_policy: None,
            logical_id_override: None,
            fingerprint: None,
            dependency_roots: None,
        }
    }

    /// The id of this node within its parent.
    pub fn local_id(&self) -> &str {
        &self.local_id
    }

    /// The parent scope, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The node's role.
    pub fn role(&self) -> &NodeRole {
        &self.role
    }

    /// The kind tag of a resource node.
    pub fn resource_type(&self) -> Option<&str> {
        match &self.role {
            NodeRole::Resource { resource_type } => Some(resource_type),
            _ => None,
        }
    }

    /// Returns `true` for resource nodes.
    pub fn is_resource(&self) -> bool {
        matches!(self.role, NodeRole::Resource { .. })
    }

    /// Properties in insertion order.
    pub fn properties(&self) -> &IndexMap<String, Value> {
        &self.properties
    }

    /// Explicit dependencies in call order.
    pub fn dependencies(&self) -> &[NodeId] {
        &self.dependencies
    }

    /// Children ordered by local id.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.values().copied()
    }

    /// The removal policy, if any.
    pub fn removal_policy(&self) -> Option<RemovalPolicy> {
        self.removal_policy
    }

    /// Returns `true` if this node's logical ID carries a fingerprint suffix.
    pub fn is_fingerprinted(&self) -> bool {
        self.fingerprint.is_some()
    }
}
