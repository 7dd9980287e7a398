//! Identifier validation for local ids and logical-ID overrides.
//!
//! Local ids are checked when a node is attached, never deferred to
//! synthesis, so a bad id rejects exactly the call that introduced it.

use regex::Regex;
use std::sync::OnceLock;

use crate::constants::MAX_LOGICAL_ID_LENGTH;
use crate::core::{Result, SynthError};

/// Letters, digits, `.`, `_`, `-`; or one braced segment such as `{id}` or
/// `{proxy+}`.
const LOCAL_ID_PATTERN: &str = r"^(?:[A-Za-z0-9._-]+|\{[A-Za-z0-9._-]+\+?\})$";

fn local_id_regex() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(LOCAL_ID_PATTERN).ok()).as_ref()
}

/// Validate a local id.
///
/// # Errors
///
/// [`SynthError::InvalidIdentifier`] if the id is empty or contains
/// characters outside the allow-list (path separators, parentheses, braces
/// that do not wrap the whole id, whitespace, ...).
pub fn validate_local_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(invalid(id, "identifiers must not be empty"));
    }

    let Some(pattern) = local_id_regex() else {
        return Err(invalid(id, "identifier pattern is unavailable"));
    };

    if !pattern.is_match(id) {
        let reason = if id.contains('/') {
            "the path separator '/' is reserved".to_string()
        } else {
            format!("must match {LOCAL_ID_PATTERN}")
        };
        return Err(invalid(id, reason));
    }

    Ok(())
}

/// Validate an explicit logical ID.
///
/// Logical IDs must be non-empty, alphanumeric and at most
/// [`MAX_LOGICAL_ID_LENGTH`] characters long.
pub fn validate_logical_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(invalid(id, "logical IDs must not be empty"));
    }
    if id.len() > MAX_LOGICAL_ID_LENGTH {
        return Err(invalid(
            id,
            format!("logical IDs are limited to {MAX_LOGICAL_ID_LENGTH} characters"),
        ));
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid(id, "logical IDs must be alphanumeric"));
    }
    Ok(())
}

/// Validate an explicit logical ID that will later carry a suffix of
/// `suffix_len` characters.
pub(crate) fn validate_suffixed_logical_id(id: &str, suffix_len: usize) -> Result<()> {
    validate_logical_id(id)?;
    if id.len() + suffix_len > MAX_LOGICAL_ID_LENGTH {
        return Err(invalid(
            id,
            format!(
                "with a {suffix_len}-character fingerprint suffix the logical ID exceeds {MAX_LOGICAL_ID_LENGTH} characters"
            ),
        ));
    }
    Ok(())
}

fn invalid(id: &str, reason: impl Into<String>) -> SynthError {
    SynthError::InvalidIdentifier {
        id: id.to_string(),
        reason: reason.into(),
    }
}
