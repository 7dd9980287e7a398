//! Test utilities for construct-synth
//!
//! This module provides helpers shared by the unit and integration suites:
//! one-time logging setup, a path-driven way of building trees, and shortcuts
//! for synthesizing straight to JSON.
//!
//! # Example
//!
//! ```rust,no_run
//! use construct_synth::test_utils::{attach_path, init_test_logging, synth_stack_json};
//! use construct_synth::tree::Tree;
//!
//! init_test_logging(None);
//! let mut tree = Tree::new();
//! attach_path(&mut tree, "prod/api/Resource", "Api").unwrap();
//! let json = synth_stack_json(tree, "prod").unwrap();
//! assert!(json["Resources"].is_object());
//! ```

use anyhow::{Context, Result};
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::tree::{NodeId, NodeRole, Tree};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// This function initializes the tracing subscriber for tests, but only once
/// regardless of how many times it's called. It respects the `RUST_LOG`
/// environment variable if set, or uses the provided log level.
///
/// To enable logging in tests via environment variable:
/// ```bash
/// RUST_LOG=construct_synth=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            // No logging if neither is provided
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// Attach a resource at a slash-separated path, creating missing scopes.
///
/// The first segment names a stack, intermediate segments become
/// composites, the last segment the resource. Existing scopes along the way
/// are reused, so paths can be attached in any order.
pub fn attach_path(tree: &mut Tree, path: &str, resource_type: &str) -> Result<NodeId> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let [stack_name, scopes @ .., leaf] = segments.as_slice() else {
        anyhow::bail!("path '{path}' needs at least a stack and a resource segment");
    };

    let mut parent = match tree.find_child(tree.root(), stack_name) {
        Some(existing) => existing,
        None => tree.add_stack(stack_name)?,
    };
    for scope in scopes {
        parent = match tree.find_child(parent, scope) {
            Some(existing) if tree.node(existing)?.role() == &NodeRole::Construct => existing,
            Some(_) => anyhow::bail!("'{scope}' in '{path}' is not a composite"),
            None => tree.add_construct(parent, scope)?,
        };
    }
    Ok(tree.add_resource(parent, leaf, resource_type)?)
}

/// Freeze `tree` and synthesize the stack called `stack_name` to JSON.
pub fn synth_stack_json(tree: Tree, stack_name: &str) -> Result<serde_json::Value> {
    let stack = tree
        .find_child(tree.root(), stack_name)
        .with_context(|| format!("no stack named '{stack_name}'"))?;
    let template = tree.freeze()?.synthesize(stack)?;
    Ok(serde_json::to_value(&template)?)
}

/// Freeze `tree` and synthesize every stack to JSON.
pub fn synth_all_json(tree: Tree) -> Result<serde_json::Value> {
    let assembly = tree.freeze()?.synthesize_all()?;
    Ok(serde_json::to_value(&assembly)?)
}
