//! Cross-stack exports, imports and outputs.
//!
//! A stack publishes a value for other stacks by exporting it: the value is
//! emitted in the stack's `Outputs` section under an export name. Another
//! stack consumes it through an import stand-in, a node whose references
//! resolve to `{"Fn::ImportValue": name}`.
//!
//! Export names are derived from the exporting node's path plus a segment,
//! in the hashed form of the logical-ID algorithm. The name depends only on
//! the path, so it is known as soon as the node is attached, and exporting
//! the same node twice yields the same name and a single output.
//!
//! # Examples
//!
//! ```rust
//! use construct_synth::tree::Tree;
//! use construct_synth::token::{Token, Value};
//! use serde_json::json;
//!
//! let mut tree = Tree::new();
//! let producer = tree.add_stack("producer")?;
//! let api = tree.add_resource(producer, "api", "RestApi")?;
//! let record = tree.export(api)?;
//! assert_eq!(tree.export(api)?, record);
//!
//! let consumer = tree.add_stack("consumer")?;
//! let imported = tree.import(consumer, record.name())?;
//! let user = tree.add_resource(consumer, "user", "Method")?;
//! tree.set_property(user, "RestApiId", Token::reference(imported))?;
//!
//! let frozen = tree.freeze()?;
//! let template = frozen.synthesize(consumer)?;
//! assert_eq!(
//!     template.resources["user"].properties["RestApiId"],
//!     json!({"Fn::ImportValue": record.name()})
//! );
//! # Ok::<(), construct_synth::core::SynthError>(())
//! ```

use indexmap::map::Entry;
use tracing::debug;

use crate::constants::{EXPORT_REF_SEGMENT, MAX_EXPORT_NAME_LENGTH};
use crate::core::{Result, SynthError};
use crate::fingerprint::canonical;
use crate::token::{Token, Value};
use crate::tree::logical_id::make_unique_id;
use crate::tree::{NodeId, NodeRole, Tree, identifier};

/// Hex digits of the digest that disambiguates a sanitized import stand-in.
const IMPORT_DIGEST_LENGTH: usize = 8;

fn import_local_id(export_name: &str) -> String {
    if identifier::validate_local_id(export_name).is_ok() {
        return export_name.to_string();
    }
    let readable: String = export_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let digest = canonical::digest(export_name, IMPORT_DIGEST_LENGTH);
    if readable.is_empty() {
        digest
    } else {
        format!("{readable}-{digest}")
    }
}

/// An output registered in a stack.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    value: Value,
    description: Option<String>,
    export_name: Option<String>,
}

impl Output {
    /// The unresolved value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Human-readable description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The export name, `None` for plain outputs.
    pub fn export_name(&self) -> Option<&str> {
        self.export_name.as_deref()
    }
}

/// A published (name, value) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRecord {
    name: String,
    value: Value,
}

impl ExportRecord {
    /// The export name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The exported value, resolved in the exporting stack at synthesis.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// A token importing this export, for use in another stack.
    pub fn import_value(&self) -> Token {
        Token::import_value(self.name.clone())
    }
}

impl Tree {
    /// Export the `Ref` value of a resource or parameter.
    pub fn export(&mut self, node: NodeId) -> Result<ExportRecord> {
        let n = self.node(node)?;
        if !matches!(n.role(), NodeRole::Resource { .. } | NodeRole::Parameter(_)) {
            return Err(SynthError::InvalidReference {
                path: self.path(node)?.to_string(),
                reason: format!("a {} has no value to export", n.role().name()),
            });
        }
        self.export_value(node, EXPORT_REF_SEGMENT, Token::reference(node))
    }

    /// Export an arbitrary value under the name derived from `node`'s path
    /// and `segment`.
    ///
    /// # Errors
    ///
    /// - [`SynthError::UnresolvedScope`] if `node` is not inside a stack
    /// - [`SynthError::ExportConflict`] if the name is already registered with
    ///   a different value
    pub fn export_value(
        &mut self,
        node: NodeId,
        segment: &str,
        value: impl Into<Value>,
    ) -> Result<ExportRecord> {
        let value = value.into();
        let name = self.output_name(node, segment)?;
        let stack = self.require_stack(node)?;

        let output = Output {
            value: value.clone(),
            description: None,
            export_name: Some(name.clone()),
        };
        self.register_output(stack, name.clone(), output)?;
        Ok(ExportRecord { name, value })
    }

    /// Attach (or return the existing) stand-in for the export `export_name`
    /// below `scope`.
    ///
    /// The stand-in's local id is the export name when that is a valid local
    /// id, and otherwise its allowed characters plus a short digest of the
    /// full name (`producer:Api` becomes `producerApi-<digest>`). References
    /// to it resolve to an import of the export, and only from the stack that
    /// contains it.
    pub fn import(&mut self, scope: NodeId, export_name: &str) -> Result<NodeId> {
        if export_name.is_empty() {
            return Err(SynthError::InvalidIdentifier {
                id: String::new(),
                reason: "export names must not be empty".to_string(),
            });
        }
        let existing = self.node(scope)?.children().find(|&child| {
            self.node(child)
                .is_ok_and(|n| matches!(n.role(), NodeRole::Import(name) if name == export_name))
        });
        if let Some(existing) = existing {
            return Ok(existing);
        }
        let local_id = import_local_id(export_name);
        self.attach(scope, &local_id, NodeRole::Import(export_name.to_string()))
    }

    /// Register a plain (non-exported) output in `node`'s stack.
    ///
    /// Returns the output's logical ID.
    pub fn add_output(
        &mut self,
        node: NodeId,
        segment: &str,
        value: impl Into<Value>,
        description: Option<&str>,
    ) -> Result<String> {
        let name = self.output_name(node, segment)?;
        let stack = self.require_stack(node)?;

        let output = Output {
            value: value.into(),
            description: description.map(str::to_string),
            export_name: None,
        };
        self.register_output(stack, name.clone(), output)?;
        Ok(name)
    }

    /// Outputs of `stack` in registration order.
    pub fn outputs_of(&self, stack: NodeId) -> impl Iterator<Item = (&str, &Output)> {
        self.outputs
            .get(&stack)
            .into_iter()
            .flat_map(|outputs| outputs.iter().map(|(k, v)| (k.as_str(), v)))
    }

    fn output_name(&self, node: NodeId, segment: &str) -> Result<String> {
        let components = self.path(node)?.child(segment).segments().to_vec();
        let name = make_unique_id(&components, self.config(), 0);
        if name.len() > MAX_EXPORT_NAME_LENGTH {
            return Err(SynthError::InvalidOperation {
                path: self.path(node)?.to_string(),
                reason: format!("export name '{name}' exceeds {MAX_EXPORT_NAME_LENGTH} characters"),
            });
        }
        Ok(name)
    }

    fn require_stack(&self, node: NodeId) -> Result<NodeId> {
        self.stack_of(node).ok_or_else(|| SynthError::UnresolvedScope {
            path: self.path(node).map(|p| p.to_string()).unwrap_or_default(),
            reason: "outputs can only be registered inside a stack".to_string(),
        })
    }

    fn register_output(&mut self, stack: NodeId, name: String, output: Output) -> Result<()> {
        match self.outputs.entry(stack).or_default().entry(name) {
            Entry::Occupied(existing) if *existing.get() == output => Ok(()),
            Entry::Occupied(existing) => Err(SynthError::ExportConflict {
                name: existing.key().clone(),
            }),
            Entry::Vacant(slot) => {
                debug!("registered output {}", slot.key());
                slot.insert(output);
                Ok(())
            }
        }
    }
}
