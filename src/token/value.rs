//! Property values that may embed tokens.
//!
//! A [`Value`] is the tagged-variant form of a resource property: a literal
//! scalar, an ordered sequence, an insertion-ordered mapping, or a deferred
//! [`Token`]. The resolver pattern-matches on it exhaustively, so there is no
//! runtime type inspection anywhere in synthesis.

use indexmap::IndexMap;

use super::Token;
use crate::tree::NodeId;

/// A literal scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// JSON `null`
    Null,
    /// A boolean
    Bool(bool),
    /// A number (integer or finite float)
    Number(serde_json::Number),
    /// A string
    String(String),
}

impl Scalar {
    /// Convert into a plain JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Value::Number(n.clone()),
            Self::String(s) => serde_json::Value::String(s.clone()),
        }
    }
}

/// A property value: literal, composite, or deferred.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A literal scalar
    Literal(Scalar),
    /// An ordered list of values
    Sequence(Vec<Value>),
    /// A mapping that preserves insertion order of its keys
    Mapping(IndexMap<String, Value>),
    /// A value known only at synthesis time
    Deferred(Token),
}

impl Value {
    /// The `null` literal.
    pub const fn null() -> Self {
        Self::Literal(Scalar::Null)
    }

    /// Build a mapping from key/value pairs, keeping their order.
    pub fn mapping<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Mapping(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Build a sequence from anything convertible into values.
    pub fn sequence<V, I>(items: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// The string content of a literal string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Literal(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` if a token appears anywhere inside this value.
    pub fn contains_tokens(&self) -> bool {
        match self {
            Self::Literal(_) => false,
            Self::Sequence(items) => items.iter().any(Self::contains_tokens),
            Self::Mapping(map) => map.values().any(Self::contains_tokens),
            Self::Deferred(_) => true,
        }
    }

    /// Nodes referenced by tokens inside this value, in traversal order.
    ///
    /// Mappings are walked in key insertion order and sequences front to
    /// back, so the result is deterministic. Duplicates are kept. Lazy tokens
    /// are opaque and contribute nothing.
    pub fn references(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    pub(crate) fn collect_references(&self, out: &mut Vec<NodeId>) {
        match self {
            Self::Literal(_) => {}
            Self::Sequence(items) => {
                for item in items {
                    item.collect_references(out);
                }
            }
            Self::Mapping(map) => {
                for value in map.values() {
                    value.collect_references(out);
                }
            }
            Self::Deferred(token) => token.collect_references(out),
        }
    }

    /// Convert a token-free value into plain JSON.
    ///
    /// Returns `None` if the value still contains tokens.
    pub fn to_plain_json(&self) -> Option<serde_json::Value> {
        match self {
            Self::Literal(scalar) => Some(scalar.to_json()),
            Self::Sequence(items) => items
                .iter()
                .map(Self::to_plain_json)
                .collect::<Option<Vec<_>>>()
                .map(serde_json::Value::Array),
            Self::Mapping(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(k.clone(), v.to_plain_json()?);
                }
                Some(serde_json::Value::Object(out))
            }
            Self::Deferred(_) => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::null()
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Self::Literal(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Literal(Scalar::String(s.to_string()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Literal(Scalar::String(s))
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Self::Literal(Scalar::String(s.clone()))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Literal(Scalar::Bool(b))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Literal(Scalar::Number(n.into()))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Literal(Scalar::Number(n.into()))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Literal(Scalar::Number(n.into()))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Self::Literal(Scalar::Number(n.into()))
    }
}

impl From<f64> for Value {
    /// Non-finite floats have no JSON form and become `null`.
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n).map_or(Self::null(), |n| Self::Literal(Scalar::Number(n)))
    }
}

impl From<Token> for Value {
    fn from(t: Token) -> Self {
        Self::Deferred(t)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Sequence(items)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(map: IndexMap<String, Value>) -> Self {
        Self::Mapping(map)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::null(), Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::null(),
            serde_json::Value::Bool(b) => Self::Literal(Scalar::Bool(b)),
            serde_json::Value::Number(n) => Self::Literal(Scalar::Number(n)),
            serde_json::Value::String(s) => Self::Literal(Scalar::String(s)),
            serde_json::Value::Array(items) => {
                Self::Sequence(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Mapping(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}
