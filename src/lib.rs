//! construct-synth - Construct tree to template synthesis
//!
//! A deterministic compiler from an in-memory tree of typed "construct" nodes
//! to declarative infrastructure templates. Application code attaches stacks,
//! composites and resources to a [`Tree`](tree::Tree), wires them together with
//! [tokens](token) that stand in for values unknown until synthesis, then
//! freezes the tree and synthesizes one template per stack.
//!
//! # Architecture Overview
//!
//! Synthesis follows a strict build-then-synthesize model:
//! - The **build phase** mutates a [`Tree`](tree::Tree): every creation call
//!   names its parent explicitly, identifiers are validated on attach
//! - [`Tree::freeze`](tree::Tree::freeze) consumes the tree, assigns logical
//!   IDs, expands and checks dependencies and computes fingerprints
//! - The **synthesis phase** reads a [`FrozenTree`](synth::FrozenTree) and
//!   produces [`Template`](synth::Template)s, resolving every token in the
//!   context of the consuming stack
//!
//! ## Key Properties
//!
//! - **Deterministic**: the same final tree shape always synthesizes to the
//!   same document, whatever the order of attach calls
//! - **Stable identity**: logical IDs depend on paths only, plus a content
//!   fingerprint for resources that opt in
//! - **All or nothing**: a synthesis error aborts the whole document
//!
//! # Core Modules
//!
//! ## Tree and Values
//! - [`tree`] - Nodes, paths, identifier rules and logical-ID assignment
//! - [`token`] - Deferred values and the tagged value type
//! - [`resolver`] - Recursive token resolution to plain JSON
//!
//! ## Synthesis
//! - [`graph`] - Explicit and implicit dependencies, cycle detection
//! - [`fingerprint`] - Content-derived logical-ID suffixes
//! - [`export`] - Cross-stack exports, imports and outputs
//! - [`synth`] - Freezing and template emission
//!
//! ## Supporting Modules
//! - [`core`] - Error types and the resource capability trait
//! - [`config`] - Tunable engine constants
//! - [`constants`] - Shared identifiers and defaults
//!
//! # Example
//!
//! ```rust
//! use construct_synth::tree::Tree;
//! use construct_synth::token::{PseudoParameter, Token, Value};
//!
//! let mut tree = Tree::new();
//! let stack = tree.add_stack("prod")?;
//! let api = tree.add_construct(stack, "api")?;
//! let rest_api = tree.add_resource(api, "Resource", "AWS::ApiGateway::RestApi")?;
//! tree.set_property(rest_api, "Name", "api")?;
//!
//! let deployment = tree.add_resource(api, "Deployment", "AWS::ApiGateway::Deployment")?;
//! tree.set_property(deployment, "RestApiId", Token::reference(rest_api))?;
//! tree.add_to_fingerprint(deployment, "v1")?;
//!
//! tree.add_output(api, "Url", Token::concat([
//!     Value::from("https://"),
//!     Value::from(Token::reference(rest_api)),
//!     Value::from(".execute-api."),
//!     Value::from(PseudoParameter::Region),
//!     Value::from(".amazonaws.com/"),
//! ]), None)?;
//!
//! let frozen = tree.freeze()?;
//! let template = frozen.synthesize(stack)?;
//! assert_eq!(template.resources.len(), 2);
//! assert_eq!(template.outputs.len(), 1);
//! # Ok::<(), construct_synth::core::SynthError>(())
//! ```
//!
//! # Logging
//!
//! The crate emits diagnostics through `tracing` (`trace!` per attach and per
//! token step, `debug!` per synthesis phase) and never installs a subscriber.
//! Tests enable output with `test_utils::init_test_logging`.

// Tree and values
pub mod resolver;
pub mod token;
pub mod tree;

// Synthesis
pub mod export;
pub mod fingerprint;
pub mod graph;
pub mod synth;

// Supporting modules
pub mod config;
pub mod constants;
pub mod core;

// test_utils is public when testing or when the test-utils feature is enabled
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::core::{Result, SynthError};
pub use crate::synth::{FrozenTree, Template};
pub use crate::tree::{NodeId, Tree};
