//! Token resolution.
//!
//! [`resolve`] walks an arbitrary [`Value`] and replaces every token with its
//! final encoded form, producing plain JSON. Tokens resolve one step at a
//! time ([`Token::resolve`]); whenever a step yields another value containing
//! tokens the walk continues into it, until only literals remain.
//!
//! # Guarantees
//!
//! - **Order**: mappings keep their key insertion order, sequences their
//!   element order.
//! - **Determinism**: the same value against the same frozen tree and
//!   consuming stack always resolves to the same output.
//! - **Termination**: each chain of nested token steps is bounded by
//!   [`SynthConfig::max_token_depth`](crate::config::SynthConfig::max_token_depth).
//!   Exceeding it fails with [`SynthError::TokenResolutionOverflow`].
//! - **Cycles**: a lazy token that is re-entered while it is being resolved
//!   fails with [`SynthError::CyclicToken`] instead of looping until the
//!   depth bound.
//!
//! # Examples
//!
//! ```rust
//! use construct_synth::token::{Token, Value};
//! use construct_synth::tree::Tree;
//! use serde_json::json;
//!
//! let mut tree = Tree::new();
//! let stack = tree.add_stack("prod")?;
//! let bucket = tree.add_resource(stack, "Bucket", "Bucket")?;
//! let frozen = tree.freeze()?;
//!
//! let value = Value::from(Token::get_att(bucket, "Arn"));
//! assert_eq!(
//!     frozen.resolve(&value, Some(stack))?,
//!     json!({"Fn::GetAtt": ["Bucket", "Arn"]})
//! );
//! # Ok::<(), construct_synth::core::SynthError>(())
//! ```

mod context;

pub use context::ResolveContext;

use tracing::trace;

use crate::core::{Result, SynthError};
use crate::token::{Token, Value};

/// Resolve `value` to plain JSON.
///
/// # Errors
///
/// Any error raised by a token step, plus
/// [`SynthError::TokenResolutionOverflow`] and [`SynthError::CyclicToken`].
pub fn resolve(value: &Value, ctx: &ResolveContext<'_>) -> Result<serde_json::Value> {
    Resolver {
        ctx,
        active_lazies: Vec::new(),
    }
    .walk(value, 0)
}

struct Resolver<'c, 'a> {
    ctx: &'c ResolveContext<'a>,
    /// Identities of the lazy tokens currently being resolved.
    active_lazies: Vec<usize>,
}

impl Resolver<'_, '_> {
    fn walk(&mut self, value: &Value, depth: usize) -> Result<serde_json::Value> {
        match value {
            Value::Literal(scalar) => Ok(scalar.to_json()),
            Value::Sequence(items) => items
                .iter()
                .map(|item| self.walk(item, depth))
                .collect::<Result<Vec<_>>>()
                .map(serde_json::Value::Array),
            Value::Mapping(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (key, item) in map {
                    out.insert(key.clone(), self.walk(item, depth)?);
                }
                Ok(serde_json::Value::Object(out))
            }
            Value::Deferred(token) => self.step(token, depth),
        }
    }

    fn step(&mut self, token: &Token, depth: usize) -> Result<serde_json::Value> {
        let tree = self.ctx.tree();
        if depth >= self.ctx.max_depth() {
            return Err(SynthError::TokenResolutionOverflow {
                depth: self.ctx.max_depth(),
                token: token.describe(tree),
            });
        }

        let lazy = match token {
            Token::Lazy(lazy) => Some(lazy.identity()),
            _ => None,
        };
        if let Some(identity) = lazy {
            if self.active_lazies.contains(&identity) {
                return Err(SynthError::CyclicToken {
                    token: token.describe(tree),
                });
            }
            self.active_lazies.push(identity);
        }

        trace!("resolve {} at depth {}", token.describe(tree), depth);
        let result = token.resolve(self.ctx).and_then(|next| self.walk(&next, depth + 1));

        if lazy.is_some() {
            self.active_lazies.pop();
        }
        result
    }
}
