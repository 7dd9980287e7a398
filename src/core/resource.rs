//! Resource capability interface
//!
//! The engine knows nothing about concrete cloud resources. A collaborator
//! that defines a resource kind implements [`ResourceSpec`] and hands it to
//! [`Tree::add_resource_from`](crate::tree::Tree::add_resource_from), which
//! records the kind tag, the encoded properties and the significant inputs
//! used for content fingerprinting.
//!
//! # Examples
//!
//! ```rust
//! use construct_synth::core::ResourceSpec;
//! use construct_synth::token::Value;
//! use indexmap::IndexMap;
//!
//! struct Queue {
//!     fifo: bool,
//! }
//!
//! impl ResourceSpec for Queue {
//!     fn resource_type(&self) -> &str {
//!         "AWS::SQS::Queue"
//!     }
//!
//!     fn encode(&self) -> IndexMap<String, Value> {
//!         let mut props = IndexMap::new();
//!         props.insert("FifoQueue".to_string(), Value::from(self.fifo));
//!         props
//!     }
//! }
//! ```

use indexmap::IndexMap;

use crate::token::Value;

/// Capability interface implemented once per resource kind.
///
/// This replaces a hierarchy of resource classes: a node stays a generic
/// [`Node`](crate::tree::Node) and the per-kind behaviour is supplied here.
pub trait ResourceSpec {
    /// The kind tag emitted as the resource's `Type`.
    fn resource_type(&self) -> &str;

    /// The property bag of the resource. Values may embed tokens.
    fn encode(&self) -> IndexMap<String, Value>;

    /// Inputs whose change must give the resource a new identity.
    ///
    /// Returning a non-empty list enables fingerprinting for the node. The
    /// order of the list is significant.
    fn significant_inputs(&self) -> Vec<Value> {
        Vec::new()
    }
}

/// A resource kind described entirely by data.
///
/// Handy for one-off resources and tests where writing a dedicated
/// [`ResourceSpec`] implementation would be noise.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawResource {
    /// The kind tag
    pub resource_type: String,
    /// Properties in insertion order
    pub properties: IndexMap<String, Value>,
}

impl RawResource {
    /// Create a raw resource of the given kind with no properties.
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            properties: IndexMap::new(),
        }
    }

    /// Add a property, builder style.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

impl ResourceSpec for RawResource {
    fn resource_type(&self) -> &str {
        &self.resource_type
    }

    fn encode(&self) -> IndexMap<String, Value> {
        self.properties.clone()
    }
}
