//! Logical-ID assignment.
//!
//! Logical IDs are derived from paths only after the tree is frozen, because
//! a sibling attached later can change whether a short name is still unique.
//! Each synthesis unit (a stack, or the root for nodes outside any stack) is
//! its own namespace.
//!
//! A node whose stack-relative path has a single alphanumeric component that
//! no other node of the unit claims keeps that component verbatim. Every other
//! node gets a readable prefix built from its components plus a short hash of
//! the full component list:
//!
//! ```text
//! /prod/Bucket                 -> Bucket
//! /prod/api/Resource           -> api + hash("api/Resource")
//! /prod/api/Default/Stage      -> apiStage + hash("api/Stage")
//! ```

use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};

use super::{NodeId, NodeRole, Tree};
use crate::config::SynthConfig;
use crate::constants::{HIDDEN_FROM_HUMAN_ID, HIDDEN_ID, MAX_LOGICAL_ID_LENGTH, PATH_SEP};
use crate::core::{Result, SynthError};

#[derive(Debug, Clone)]
struct Entry {
    unit: NodeId,
    logical_id: String,
    pending: bool,
}

/// Logical IDs of every referenceable node, keyed by node.
///
/// Fingerprinted nodes start out pending: their base ID is known but the
/// suffix is not, and looking one up before [`LogicalIds::finalize`] is a
/// cyclic dependency on the node's own identity.
#[derive(Debug, Clone, Default)]
pub(crate) struct LogicalIds {
    entries: BTreeMap<NodeId, Entry>,
}

impl LogicalIds {
    /// The final logical ID, `None` if unknown or still pending.
    pub(crate) fn get(&self, node: NodeId) -> Option<&str> {
        self.entries
            .get(&node)
            .filter(|e| !e.pending)
            .map(|e| e.logical_id.as_str())
    }

    pub(crate) fn is_pending(&self, node: NodeId) -> bool {
        self.entries.get(&node).is_some_and(|e| e.pending)
    }

    /// Append the fingerprint suffix and mark the ID final.
    pub(crate) fn finalize(&mut self, node: NodeId, suffix: &str) {
        if let Some(entry) = self.entries.get_mut(&node) {
            entry.logical_id.push_str(suffix);
            entry.pending = false;
        }
    }

    /// Fail if two nodes of one unit share an ID.
    pub(crate) fn check_unique(&self, tree: &Tree) -> Result<()> {
        let mut seen: HashMap<(NodeId, &str), NodeId> = HashMap::new();
        for (&node, entry) in &self.entries {
            if let Some(&first) = seen.get(&(entry.unit, entry.logical_id.as_str())) {
                return Err(SynthError::DuplicateLogicalId {
                    logical_id: entry.logical_id.clone(),
                    first: tree.path(first)?.to_string(),
                    second: tree.path(node)?.to_string(),
                });
            }
            seen.insert((entry.unit, entry.logical_id.as_str()), node);
        }
        Ok(())
    }
}

/// Compute base logical IDs for every resource and parameter of the tree.
pub(crate) fn assign(tree: &Tree) -> Result<LogicalIds> {
    let config = tree.config();
    let mut ids = LogicalIds::default();

    let mut units = tree.stacks();
    units.push(tree.root());

    for unit in units {
        let members: Vec<NodeId> = tree
            .subtree(unit)?
            .into_iter()
            .filter(|&n| is_referenceable(tree, n) && unit_of(tree, n) == unit)
            .collect();

        let mut components = Vec::with_capacity(members.len());
        let mut claims: HashMap<String, usize> = HashMap::new();
        for &node in &members {
            let comps = id_components(tree, unit, node)?;
            if let Some(candidate) = verbatim_candidate(&comps, config) {
                *claims.entry(candidate.to_string()).or_default() += 1;
            }
            components.push(comps);
        }

        for (node, comps) in members.into_iter().zip(components) {
            let n = tree.node(node)?;
            // room left for the fingerprint suffix appended at finalize
            let reserve = if n.is_fingerprinted() {
                config.fingerprint_length
            } else {
                0
            };
            let logical_id = match &n.logical_id_override {
                Some(explicit) => explicit.clone(),
                None => match verbatim_candidate(&comps, config) {
                    Some(candidate)
                        if claims.get(candidate) == Some(&1)
                            && candidate.len() + reserve <= MAX_LOGICAL_ID_LENGTH =>
                    {
                        candidate.to_string()
                    }
                    _ => make_unique_id(&comps, config, reserve),
                },
            };
            ids.entries.insert(
                node,
                Entry {
                    unit,
                    logical_id,
                    pending: n.is_fingerprinted(),
                },
            );
        }
    }

    tracing::debug!("assigned {} base logical IDs", ids.entries.len());
    Ok(ids)
}

/// Human-readable prefix plus path hash, e.g. `apiDeployment` + `A1B2C3D4`.
///
/// The prefix is shortened so that `reserve` more characters still fit
/// within [`MAX_LOGICAL_ID_LENGTH`].
pub(crate) fn make_unique_id(
    components: &[String],
    config: &SynthConfig,
    reserve: usize,
) -> String {
    let components: Vec<&str> = components
        .iter()
        .map(String::as_str)
        .filter(|c| *c != HIDDEN_ID)
        .collect();

    let hash = path_hash(&components, config.hash_length);
    let mut human: String = remove_dupes(&components)
        .into_iter()
        .filter(|c| *c != HIDDEN_FROM_HUMAN_ID)
        .flat_map(|c| c.chars().filter(char::is_ascii_alphanumeric))
        .collect();
    let room = MAX_LOGICAL_ID_LENGTH.saturating_sub(config.hash_length + reserve);
    human.truncate(config.max_human_length.min(room));
    human + &hash
}

fn path_hash(components: &[&str], length: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(components.join(PATH_SEP).as_bytes());
    let mut hash = hex::encode_upper(hasher.finalize());
    hash.truncate(length);
    hash
}

/// Drop a component when the previous kept one already ends with it, so
/// `api/apiDeployment/Deployment` reads `apiapiDeployment` rather than
/// repeating itself.
fn remove_dupes<'a>(components: &[&'a str]) -> Vec<&'a str> {
    let mut kept: Vec<&str> = Vec::with_capacity(components.len());
    for &component in components {
        if kept.last().is_none_or(|last| !last.ends_with(component)) {
            kept.push(component);
        }
    }
    kept
}

fn verbatim_candidate<'a>(components: &'a [String], config: &SynthConfig) -> Option<&'a str> {
    match components {
        [single]
            if single.len() <= config.max_human_length
                && single.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            Some(single)
        }
        _ => None,
    }
}

fn id_components(tree: &Tree, unit: NodeId, node: NodeId) -> Result<Vec<String>> {
    Ok(tree
        .path_from(unit, node)?
        .segments()
        .iter()
        .filter(|s| *s != HIDDEN_ID)
        .cloned()
        .collect())
}

fn is_referenceable(tree: &Tree, node: NodeId) -> bool {
    tree.node(node)
        .is_ok_and(|n| matches!(n.role, NodeRole::Resource { .. } | NodeRole::Parameter(_)))
}

/// The stack enclosing `node`, or the root for nodes outside any stack.
pub(crate) fn unit_of(tree: &Tree, node: NodeId) -> NodeId {
    tree.stack_of(node).unwrap_or_else(|| tree.root())
}
