//! Template synthesis.
//!
//! Synthesis is a two-phase discipline enforced by the type system: a
//! [`Tree`] is built, then consumed by [`Tree::freeze`] into a
//! [`FrozenTree`]. A frozen tree has no mutating methods, so logical IDs and
//! fingerprints computed while freezing can never be invalidated by a later
//! attach or export.
//!
//! # Process
//!
//! 1. **Logical IDs**: assigned per stack from node paths
//! 2. **Dependencies**: explicit and token-implied edges expanded to
//!    resources, cross-stack edges lifted to stack ordering
//! 3. **Cycle check**: over resources and over stacks
//! 4. **Fingerprints**: appended to the IDs of fingerprinted resources
//! 5. **Emission**: one [`Template`] per stack, every value resolved in the
//!    context of that stack
//!
//! Every step is deterministic: the same tree shape always yields the same
//! document, regardless of the order in which nodes were attached.
//!
//! # Examples
//!
//! ```rust
//! use construct_synth::tree::{RemovalPolicy, Tree};
//! use construct_synth::token::Token;
//! use serde_json::json;
//!
//! let mut tree = Tree::new();
//! let stack = tree.add_stack("prod")?;
//! let bucket = tree.add_resource(stack, "Bucket", "Bucket")?;
//! tree.set_removal_policy(bucket, RemovalPolicy::Retain)?;
//! let queue = tree.add_resource(stack, "Queue", "Queue")?;
//! tree.set_property(queue, "DeadLetterTarget", Token::get_att(bucket, "Arn"))?;
//!
//! let template = tree.freeze()?.synthesize(stack)?;
//! assert_eq!(
//!     serde_json::to_value(&template).unwrap(),
//!     json!({
//!         "Resources": {
//!             "Bucket": {
//!                 "Type": "Bucket",
//!                 "DeletionPolicy": "Retain",
//!                 "UpdateReplacePolicy": "Retain"
//!             },
//!             "Queue": {
//!                 "Type": "Queue",
//!                 "Properties": {"DeadLetterTarget": {"Fn::GetAtt": ["Bucket", "Arn"]}},
//!                 "DependsOn": ["Bucket"]
//!             }
//!         }
//!     })
//! );
//! # Ok::<(), construct_synth::core::SynthError>(())
//! ```

mod freeze;
mod template;

pub use template::{
    Assembly, ExportDefinition, OutputDefinition, ParameterDefinition, ResourceDefinition,
    Template,
};

use indexmap::IndexMap;
use std::collections::BTreeMap;
use tracing::debug;

use crate::core::{Result, SynthError};
use crate::resolver::{ResolveContext, resolve};
use crate::token::Value;
use crate::tree::logical_id::LogicalIds;
use crate::tree::{NodeId, NodeRole, Tree};

/// A tree whose build phase is over.
#[derive(Debug)]
pub struct FrozenTree {
    tree: Tree,
    ids: LogicalIds,
    edges: BTreeMap<NodeId, Vec<NodeId>>,
    stack_order: Vec<NodeId>,
}

impl FrozenTree {
    /// Read access to the tree.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The final logical ID of a resource or parameter.
    pub fn logical_id(&self, node: NodeId) -> Result<&str> {
        self.context(None).logical_id(node)
    }

    /// Prerequisite resources of `node`: explicit edges first in call order,
    /// then implicit edges in property order. Empty for non-resources.
    pub fn dependencies_of(&self, node: NodeId) -> &[NodeId] {
        self.edges.get(&node).map(Vec::as_slice).unwrap_or_default()
    }

    /// Stacks ordered so that every stack comes after the stacks it depends on.
    pub fn stacks_in_order(&self) -> &[NodeId] {
        &self.stack_order
    }

    /// Resolve a free-standing value.
    ///
    /// With `consumer` set, the value is resolved as if it appeared in that
    /// stack's template; with `None`, imports cannot be resolved.
    pub fn resolve(&self, value: &Value, consumer: Option<NodeId>) -> Result<serde_json::Value> {
        if let Some(stack) = consumer {
            self.require_stack(stack)?;
        }
        resolve(value, &self.context(consumer))
    }

    /// Produce the template of one stack.
    pub fn synthesize(&self, stack: NodeId) -> Result<Template> {
        self.require_stack(stack)?;
        let ctx = self.context(Some(stack));
        let mut template = Template::default();

        for node in self.tree.subtree(stack)? {
            let n = self.tree.node(node)?;
            match n.role() {
                NodeRole::Resource { resource_type } => {
                    let mut properties = IndexMap::with_capacity(n.properties().len());
                    for (key, value) in n.properties() {
                        properties.insert(key.clone(), resolve(value, &ctx)?);
                    }
                    let depends_on = self
                        .dependencies_of(node)
                        .iter()
                        .map(|&p| ctx.logical_id(p).map(str::to_string))
                        .collect::<Result<Vec<_>>>()?;

                    template.resources.insert(
                        ctx.logical_id(node)?.to_string(),
                        ResourceDefinition {
                            resource_type: resource_type.clone(),
                            properties,
                            depends_on,
                            deletion_policy: n.removal_policy(),
                            update_replace_policy: n.removal_policy(),
                        },
                    );
                }
                NodeRole::Parameter(spec) => {
                    let default = spec.default.as_ref().map(|d| resolve(d, &ctx)).transpose()?;
                    template.parameters.insert(
                        ctx.logical_id(node)?.to_string(),
                        ParameterDefinition {
                            parameter_type: spec.parameter_type.clone(),
                            default,
                            description: spec.description.clone(),
                            no_echo: spec.no_echo,
                        },
                    );
                }
                NodeRole::App | NodeRole::Stack | NodeRole::Construct | NodeRole::Import(_) => {}
            }
        }

        for (name, output) in self.tree.outputs_of(stack) {
            template.outputs.insert(
                name.to_string(),
                OutputDefinition {
                    value: resolve(output.value(), &ctx)?,
                    description: output.description().map(str::to_string),
                    export: output.export_name().map(|name| ExportDefinition {
                        name: name.to_string(),
                    }),
                },
            );
        }

        debug!(
            "synthesized {}: {} resources, {} parameters, {} outputs",
            self.tree.path(stack)?,
            template.resources.len(),
            template.parameters.len(),
            template.outputs.len()
        );
        Ok(template)
    }

    /// Produce the templates of every stack, in stack dependency order.
    pub fn synthesize_all(&self) -> Result<Assembly> {
        let mut assembly = Assembly::default();
        for &stack in &self.stack_order {
            let name = self.tree.node(stack)?.local_id().to_string();
            assembly.templates.insert(name, self.synthesize(stack)?);
        }
        Ok(assembly)
    }

    fn context(&self, consumer: Option<NodeId>) -> ResolveContext<'_> {
        ResolveContext::new(&self.tree, &self.ids, consumer)
    }

    fn require_stack(&self, node: NodeId) -> Result<()> {
        let n = self.tree.node(node)?;
        if *n.role() == NodeRole::Stack {
            return Ok(());
        }
        Err(SynthError::InvalidOperation {
            path: self.tree.path(node)?.to_string(),
            reason: format!("templates are produced for stacks, not a {}", n.role().name()),
        })
    }
}
