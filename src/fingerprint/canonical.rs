//! Canonical serialization and digests.

use sha2::{Digest, Sha256};

/// Compact JSON text with every object's keys sorted.
///
/// Two values that differ only in key order produce the same text.
pub fn canonical_json(value: &serde_json::Value) -> String {
    sort_keys(value).to_string()
}

fn sort_keys(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut entries: Vec<(&String, &serde_json::Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            serde_json::Value::Object(
                entries.into_iter().map(|(k, v)| (k.clone(), sort_keys(v))).collect(),
            )
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(sort_keys).collect())
        }
        other => other.clone(),
    }
}

/// First `length` lowercase hex digits of the SHA-256 of `text`.
pub fn digest(text: &str, length: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let mut hex = hex::encode(hasher.finalize());
    hex.truncate(length);
    hex
}
