//! Global constants used throughout the synthesis engine.
//!
//! This module contains the identifier rules, hash widths and resolution
//! bounds that several modules share. Values that callers may want to tune
//! have a counterpart in [`SynthConfig`](crate::config::SynthConfig); the
//! constants here are the defaults.

/// Local id of a child that is hidden from logical IDs entirely.
///
/// A construct that wraps a single "default" child lets that child inherit
/// the construct's identity by attaching it under this id.
pub const HIDDEN_ID: &str = "Default";

/// Local id that is kept in the path hash but dropped from the human-readable
/// part of a logical ID.
///
/// Composites conventionally call their primary resource `Resource`, which
/// would otherwise add noise to every emitted identifier.
pub const HIDDEN_FROM_HUMAN_ID: &str = "Resource";

/// Separator used when joining path components for display and hashing.
pub const PATH_SEP: &str = "/";

/// Default number of hex digits of the path hash embedded in logical IDs.
pub const DEFAULT_HASH_LENGTH: usize = 8;

/// Default maximum length of the human-readable prefix of a logical ID.
pub const DEFAULT_MAX_HUMAN_LENGTH: usize = 240;

/// Hard upper bound for any emitted logical ID.
pub const MAX_LOGICAL_ID_LENGTH: usize = 255;

/// Default number of hex digits of a content fingerprint suffix.
pub const DEFAULT_FINGERPRINT_LENGTH: usize = 32;

/// Default bound on nested token resolution.
///
/// A chain of tokens that each resolve to another token deeper than this is
/// treated as a runaway (most likely self-referential) token graph.
pub const DEFAULT_MAX_TOKEN_DEPTH: usize = 64;

/// Segment appended to a node's path to derive the export name used by
/// [`Tree::export`](crate::tree::Tree::export).
pub const EXPORT_REF_SEGMENT: &str = "Ref";

/// Maximum length of an export name accepted by template consumers.
pub const MAX_EXPORT_NAME_LENGTH: usize = 255;
