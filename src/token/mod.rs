//! Deferred values.
//!
//! Tokens stand in for values that are unknown until synthesis: logical IDs
//! of other nodes, attributes only the deployment engine knows, exports of
//! other stacks. Collaborators compose them freely inside property values;
//! the [`resolver`](crate::resolver) turns them into their final encoded form.
//!
//! Tokens are immutable. Resolving one is a single step that may yield
//! another value containing tokens (partial resolution), e.g. an ARN becomes a
//! join of pseudo parameters, and a reference to an import stand-in becomes an
//! import-value token. The resolver keeps stepping until only plain values
//! remain.
//!
//! # Encodings
//!
//! | Token                        | Encoded form                              |
//! |------------------------------|-------------------------------------------|
//! | `Reference` without attribute| `{"Ref": "<logical id>"}`                 |
//! | `Reference` with attribute   | `{"Fn::GetAtt": ["<logical id>", "<attr>"]}` |
//! | `ImportValue`                | `{"Fn::ImportValue": "<export name>"}`    |
//! | `Pseudo`                     | `{"Ref": "AWS::Region"}`                  |
//! | `Join`                       | `{"Fn::Join": ["<delim>", [...]]}` or a collapsed literal |
//! | `Arn`                        | a `Join` over the ARN components          |
//!
//! # Examples
//!
//! ```rust
//! use construct_synth::token::{PseudoParameter, Token, Value};
//!
//! let url = Token::concat([
//!     Value::from("https://"),
//!     Value::from(PseudoParameter::Region),
//!     Value::from(".example.com/"),
//! ]);
//! assert!(Value::from(url).contains_tokens());
//! ```

mod pseudo;
mod value;

pub use pseudo::{ArnComponents, ArnSeparator, PseudoParameter};
pub use value::{Scalar, Value};

use std::fmt;
use std::sync::Arc;

use crate::core::{Result, SynthError};
use crate::resolver::ResolveContext;
use crate::tree::{NodeId, NodeRole, Tree};

type Producer = dyn Fn(&ResolveContext<'_>) -> Result<Value> + Send + Sync;

/// A value computed by a closure at resolution time.
///
/// The closure receives the resolution context and may return further
/// tokens. Two lazies are equal only if they share the same closure.
#[derive(Clone)]
pub struct Lazy {
    label: String,
    producer: Arc<Producer>,
}

impl Lazy {
    /// Wrap a closure under a label used in diagnostics.
    pub fn new<F>(label: impl Into<String>, producer: F) -> Self
    where
        F: Fn(&ResolveContext<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            producer: Arc::new(producer),
        }
    }

    /// The diagnostic label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Stable identity of the closure, shared by all clones.
    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.producer).cast::<()>() as usize
    }
}

impl PartialEq for Lazy {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl fmt::Debug for Lazy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lazy").field("label", &self.label).finish_non_exhaustive()
    }
}

/// A deferred value.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// The logical ID (`attribute: None`) or an attribute of a node
    Reference {
        /// The referenced node
        target: NodeId,
        /// Attribute name, `None` for the node's own reference value
        attribute: Option<String>,
    },
    /// Concatenation of parts with a delimiter
    Join {
        /// Placed between consecutive parts
        delimiter: String,
        /// Literals or further tokens
        parts: Vec<Value>,
    },
    /// The value of an export published by another stack
    ImportValue(String),
    /// A deployment-time pseudo parameter
    Pseudo(PseudoParameter),
    /// An ARN assembled from pseudo parameters and overrides
    Arn(Box<ArnComponents>),
    /// A collaborator-supplied closure
    Lazy(Lazy),
}

impl Token {
    /// Reference to a node's own value (`Ref`).
    pub fn reference(target: NodeId) -> Self {
        Self::Reference {
            target,
            attribute: None,
        }
    }

    /// Reference to an attribute of a node (`Fn::GetAtt`).
    pub fn get_att(target: NodeId, attribute: impl Into<String>) -> Self {
        Self::Reference {
            target,
            attribute: Some(attribute.into()),
        }
    }

    /// Join parts with a delimiter.
    pub fn join<V, I>(delimiter: impl Into<String>, parts: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Self::Join {
            delimiter: delimiter.into(),
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// String interpolation: join parts without a delimiter.
    pub fn concat<V, I>(parts: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Self::join("", parts)
    }

    /// Import the value of a named export.
    pub fn import_value(name: impl Into<String>) -> Self {
        Self::ImportValue(name.into())
    }

    /// A pseudo parameter.
    pub const fn pseudo(parameter: PseudoParameter) -> Self {
        Self::Pseudo(parameter)
    }

    /// An ARN.
    pub fn arn(components: ArnComponents) -> Self {
        Self::Arn(Box::new(components))
    }

    /// A value computed at resolution time.
    pub fn lazy<F>(label: impl Into<String>, producer: F) -> Self
    where
        F: Fn(&ResolveContext<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        Self::Lazy(Lazy::new(label, producer))
    }

    /// Perform one resolution step.
    ///
    /// The result may still contain tokens; use
    /// [`resolve`](crate::resolver::resolve) to reach plain values.
    pub fn resolve(&self, ctx: &ResolveContext<'_>) -> Result<Value> {
        match self {
            Self::Reference { target, attribute } => {
                resolve_reference(*target, attribute.as_deref(), ctx)
            }
            Self::Join { delimiter, parts } => Ok(collapse_join(delimiter, parts)),
            Self::ImportValue(name) => Ok(Value::mapping([("Fn::ImportValue", name.as_str())])),
            Self::Pseudo(p) => Ok(Value::mapping([("Ref", p.as_str())])),
            Self::Arn(components) => Ok(Value::Deferred(Self::Join {
                delimiter: String::new(),
                parts: components.to_parts(),
            })),
            Self::Lazy(lazy) => (lazy.producer)(ctx),
        }
    }

    /// Human-readable description naming node paths, for diagnostics.
    pub fn describe(&self, tree: &Tree) -> String {
        match self {
            Self::Reference { target, attribute } => {
                let path = tree.path(*target).map_or_else(|_| target.to_string(), |p| p.to_string());
                match attribute {
                    Some(attr) => format!("GetAtt({path}.{attr})"),
                    None => format!("Ref({path})"),
                }
            }
            other => other.to_string(),
        }
    }

    pub(crate) fn collect_references(&self, out: &mut Vec<NodeId>) {
        match self {
            Self::Reference { target, .. } => out.push(*target),
            Self::Join { parts, .. } => {
                for part in parts {
                    part.collect_references(out);
                }
            }
            Self::Arn(components) => components.collect_references(out),
            Self::ImportValue(_) | Self::Pseudo(_) | Self::Lazy(_) => {}
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reference {
                target,
                attribute: Some(attr),
            } => write!(f, "GetAtt({target}.{attr})"),
            Self::Reference {
                target,
                attribute: None,
            } => write!(f, "Ref({target})"),
            Self::Join { delimiter, parts } => {
                write!(f, "Join({delimiter:?}, {} parts)", parts.len())
            }
            Self::ImportValue(name) => write!(f, "ImportValue({name})"),
            Self::Pseudo(p) => write!(f, "Ref({p})"),
            Self::Arn(components) => write!(f, "Arn({})", components.service),
            Self::Lazy(lazy) => write!(f, "Lazy({})", lazy.label),
        }
    }
}

/// Zero parts collapse to `""`, one part to itself, all-literal parts to the
/// joined literal.
///
/// Nested joins collapse first, so `join(",", [join("", ["a", "b"]), "c"])`
/// is the literal `"ab,c"`.
fn collapse_join(delimiter: &str, parts: &[Value]) -> Value {
    let mut parts: Vec<Value> = parts.iter().map(collapse_nested).collect();
    if parts.len() <= 1 {
        return parts.pop().unwrap_or_else(|| Value::from(""));
    }
    let literals: Option<Vec<&str>> = parts.iter().map(Value::as_str).collect();
    if let Some(literals) = literals {
        return Value::from(literals.join(delimiter));
    }
    Value::mapping([(
        "Fn::Join",
        Value::Sequence(vec![Value::from(delimiter), Value::Sequence(parts)]),
    )])
}

fn collapse_nested(part: &Value) -> Value {
    match part {
        Value::Deferred(Token::Join { delimiter, parts }) => collapse_join(delimiter, parts),
        Value::Deferred(Token::Arn(components)) => collapse_join("", &components.to_parts()),
        other => other.clone(),
    }
}

fn resolve_reference(
    target: NodeId,
    attribute: Option<&str>,
    ctx: &ResolveContext<'_>,
) -> Result<Value> {
    let tree = ctx.tree();
    let node = tree.node(target)?;

    match node.role() {
        NodeRole::Resource { .. } | NodeRole::Parameter(_) => {
            ctx.check_same_unit(target)?;
            let logical_id = ctx.logical_id(target)?;
            match attribute {
                None => Ok(Value::mapping([("Ref", logical_id)])),
                Some(attr) if matches!(node.role(), NodeRole::Resource { .. }) => {
                    Ok(Value::mapping([(
                        "Fn::GetAtt",
                        Value::sequence([logical_id, attr]),
                    )]))
                }
                Some(attr) => Err(SynthError::InvalidReference {
                    path: tree.path(target)?.to_string(),
                    reason: format!("parameters have no attribute '{attr}'"),
                }),
            }
        }
        NodeRole::Import(export_name) => {
            let import_stack = tree.stack_of(target);
            match ctx.consumer() {
                None => Err(SynthError::UnresolvedScope {
                    path: tree.path(target)?.to_string(),
                    reason: "import stand-ins resolve only inside a consuming stack".to_string(),
                }),
                Some(consumer) if import_stack != Some(consumer) => {
                    Err(SynthError::UnresolvedScope {
                        path: tree.path(target)?.to_string(),
                        reason: format!(
                            "imported into '{}' but consumed in '{}'",
                            import_stack
                                .and_then(|s| tree.path(s).ok())
                                .map_or_else(|| "/".to_string(), |p| p.to_string()),
                            tree.path(consumer)?
                        ),
                    })
                }
                Some(_) => Ok(Value::Deferred(Token::ImportValue(export_name.clone()))),
            }
        }
        NodeRole::App | NodeRole::Stack | NodeRole::Construct => {
            Err(SynthError::InvalidReference {
                path: tree.path(target)?.to_string(),
                reason: "only resources, parameters and imports can be referenced".to_string(),
            })
        }
    }
}
