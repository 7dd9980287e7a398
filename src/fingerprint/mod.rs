//! Content fingerprints.
//!
//! A fingerprinted resource gets a digest of its significant inputs appended
//! to its logical ID. Changing those inputs yields a new identity, which the
//! deployment engine treats as a replacement; changing anything else keeps
//! the identity and updates in place. This is how a deployment snapshot of an
//! API is re-created exactly when the API's methods change.
//!
//! # Significant inputs
//!
//! - Values added with [`Tree::add_to_fingerprint`] and those returned by
//!   [`ResourceSpec::significant_inputs`](crate::core::ResourceSpec::significant_inputs).
//!   These form a sequence: order matters.
//! - With [`Tree::fingerprint_prerequisites`], the canonical form
//!   `{LogicalId, Type, Properties}` of every prerequisite resource. These
//!   form a set: sorted and deduplicated, so attachment order is irrelevant.
//!
//! Inputs are resolved before hashing, so a reference contributes the final
//! logical ID of its target. Fingerprints are therefore computed after the
//! dependency graph is final, in topological order. A fingerprint that needs
//! an identity that is itself waiting for a fingerprint is computed later;
//! if no progress can be made the identities are cyclic.

pub mod canonical;

use serde_json::json;
use tracing::debug;

use crate::core::{Result, SynthError};
use crate::graph::expansion::Expanded;
use crate::resolver::{ResolveContext, resolve};
use crate::token::Value;
use crate::tree::logical_id::LogicalIds;
use crate::tree::{FingerprintSpec, NodeId, Tree, identifier};

impl Tree {
    /// Add a significant input to a resource's fingerprint.
    ///
    /// The first call turns fingerprinting on for the resource.
    pub fn add_to_fingerprint(&mut self, node: NodeId, value: impl Into<Value>) -> Result<()> {
        self.require_fingerprintable(node)?;
        self.node_mut(node)?
            .fingerprint
            .get_or_insert_with(FingerprintSpec::default)
            .inputs
            .push(value.into());
        Ok(())
    }

    /// Fold every prerequisite resource of `node` into its fingerprint.
    pub fn fingerprint_prerequisites(&mut self, node: NodeId) -> Result<()> {
        self.require_fingerprintable(node)?;
        self.node_mut(node)?
            .fingerprint
            .get_or_insert_with(FingerprintSpec::default)
            .include_prerequisites = true;
        Ok(())
    }

    fn require_fingerprintable(&self, node: NodeId) -> Result<()> {
        let n = self.node(node)?;
        if n.is_resource() {
            if let Some(explicit) = &n.logical_id_override {
                identifier::validate_suffixed_logical_id(explicit, self.config.fingerprint_length)?;
            }
            return Ok(());
        }
        Err(SynthError::InvalidOperation {
            path: self.path(node)?.to_string(),
            reason: format!("only resources can be fingerprinted, not a {}", n.role().name()),
        })
    }
}

/// Finalize the logical ID of every fingerprinted resource.
///
/// `order` lists resources with prerequisites first.
pub(crate) fn apply(
    tree: &Tree,
    ids: &mut LogicalIds,
    expanded: &Expanded,
    order: &[NodeId],
) -> Result<()> {
    let mut pending: Vec<NodeId> = order.iter().copied().filter(|&n| ids.is_pending(n)).collect();
    let total = pending.len();

    while !pending.is_empty() {
        let mut deferred = Vec::new();
        let mut last_cycle = None;

        for node in pending.iter().copied() {
            match suffix(tree, ids, expanded, node) {
                Ok(suffix) => ids.finalize(node, &suffix),
                Err(e @ SynthError::CyclicToken { .. }) => {
                    deferred.push(node);
                    last_cycle = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        if deferred.len() == pending.len() {
            return Err(last_cycle.unwrap_or_else(|| SynthError::CyclicToken {
                token: "fingerprint".to_string(),
            }));
        }
        pending = deferred;
    }

    debug!("computed {} fingerprints", total);
    Ok(())
}

/// Digest of the significant inputs of `node`.
fn suffix(tree: &Tree, ids: &LogicalIds, expanded: &Expanded, node: NodeId) -> Result<String> {
    let n = tree.node(node)?;
    let Some(spec) = &n.fingerprint else {
        return Ok(String::new());
    };

    let ctx = ResolveContext::new(tree, ids, tree.stack_of(node));

    let inputs = spec
        .inputs
        .iter()
        .map(|v| resolve(v, &ctx))
        .collect::<Result<Vec<_>>>()?;

    let mut document = json!({ "Inputs": inputs });
    if spec.include_prerequisites {
        let mut prerequisites = Vec::new();
        for &p in expanded.edges.get(&node).map(Vec::as_slice).unwrap_or_default() {
            prerequisites.push(canonical::canonical_json(&canonical_form(&ctx, p)?));
        }
        prerequisites.sort();
        prerequisites.dedup();
        document["Prerequisites"] = json!(prerequisites);
    }

    Ok(canonical::digest(
        &canonical::canonical_json(&document),
        tree.config().fingerprint_length,
    ))
}

/// `{LogicalId, Type, Properties}` of a resource.
fn canonical_form(ctx: &ResolveContext<'_>, node: NodeId) -> Result<serde_json::Value> {
    let n = ctx.tree().node(node)?;
    let properties = resolve(&Value::Mapping(n.properties().clone()), ctx)?;
    Ok(json!({
        "LogicalId": ctx.logical_id(node)?,
        "Type": n.resource_type(),
        "Properties": properties,
    }))
}
