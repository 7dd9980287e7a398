//! Error handling for construct synthesis
//!
//! This module provides the error taxonomy of the synthesis engine and a
//! user-friendly wrapper for drivers that present failures in a terminal. The
//! error system follows two principles:
//! 1. **Strongly-typed errors** so callers can react to the exact failure
//! 2. **Path-carrying messages** so every failure names the offending node
//!
//! # Architecture
//!
//! - [`SynthError`] - Enumerated error types for all failure cases
//! - [`ErrorContext`] - Wrapper that adds suggestions and details for display
//!
//! # Error Categories
//!
//! - **Build time** (abort only the offending call, the tree stays usable):
//!   [`SynthError::DuplicateSibling`], [`SynthError::InvalidIdentifier`],
//!   [`SynthError::InvalidOperation`], [`SynthError::ExportConflict`],
//!   [`SynthError::UnknownNode`]
//! - **Synthesis time** (abort the whole synthesis, no document is produced):
//!   [`SynthError::Cycle`], [`SynthError::TokenResolutionOverflow`],
//!   [`SynthError::CyclicToken`], [`SynthError::UnresolvedScope`],
//!   [`SynthError::InvalidReference`], [`SynthError::DuplicateLogicalId`]
//! - **Configuration**: [`SynthError::Config`]
//!
//! None of these are transient. They signal programming-contract violations
//! in the code that builds the tree, so nothing in the engine retries.
//!
//! # Examples
//!
//! ```rust,no_run
//! use construct_synth::core::{SynthError, user_friendly_error};
//! use construct_synth::tree::Tree;
//!
//! let mut tree = Tree::new();
//! let stack = tree.add_stack("prod").unwrap();
//! match tree.add_construct(stack, "foo/") {
//!     Ok(_) => {}
//!     Err(e @ SynthError::InvalidIdentifier { .. }) => {
//!         user_friendly_error(anyhow::Error::from(e)).display();
//!     }
//!     Err(e) => eprintln!("unexpected: {e}"),
//! }
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = SynthError> = std::result::Result<T, E>;

/// The error type for tree construction and synthesis.
///
/// Every variant that concerns a node carries its path rendered as
/// `/stack/construct/child`, so a failed synthesis always identifies where
/// in the tree the problem lives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthError {
    /// A child with the same local id already exists under the parent.
    #[error("Duplicate id '{id}' under '{parent}'")]
    DuplicateSibling {
        /// Path of the parent scope
        parent: String,
        /// The conflicting local id
        id: String,
    },

    /// A local id or logical-ID override violates the identifier rules.
    #[error("Invalid identifier '{id}': {reason}")]
    InvalidIdentifier {
        /// The rejected identifier
        id: String,
        /// Which rule was violated
        reason: String,
    },

    /// The dependency graph contains a cycle.
    ///
    /// `cycle` lists the node paths along the cycle, closing on the first one.
    #[error("Circular dependency detected: {cycle}")]
    Cycle {
        /// The cycle rendered as `a → b → a`
        cycle: String,
    },

    /// Nested token resolution went deeper than the configured bound.
    #[error("Token resolution exceeded the maximum depth of {depth} while resolving {token}")]
    TokenResolutionOverflow {
        /// The depth bound that was exceeded
        depth: usize,
        /// Display form of the token being resolved when the bound was hit
        token: String,
    },

    /// A token resolved back into itself within one resolution pass.
    #[error("Cyclic token detected: {token}")]
    CyclicToken {
        /// Display form of the token that re-entered itself
        token: String,
    },

    /// A value was resolved outside of a context that can consume it.
    #[error("Cannot resolve '{path}' in this scope: {reason}")]
    UnresolvedScope {
        /// Path of the referenced node
        path: String,
        /// Why the consuming scope is unsuitable
        reason: String,
    },

    /// A token refers to a node that has no referenceable value.
    #[error("Invalid reference to '{path}': {reason}")]
    InvalidReference {
        /// Path of the referenced node
        path: String,
        /// Why the node cannot be referenced
        reason: String,
    },

    /// An API call is not valid for the node's role.
    #[error("Invalid operation on '{path}': {reason}")]
    InvalidOperation {
        /// Path of the node the call was made on
        path: String,
        /// Why the call was rejected
        reason: String,
    },

    /// Two nodes of one synthesis unit were assigned the same logical ID.
    #[error("Logical ID '{logical_id}' is claimed by both '{first}' and '{second}'")]
    DuplicateLogicalId {
        /// The colliding logical ID
        logical_id: String,
        /// Path of the first claimant
        first: String,
        /// Path of the second claimant
        second: String,
    },

    /// An export name was registered twice with different values.
    #[error("Export '{name}' is already registered with a different value")]
    ExportConflict {
        /// The export name
        name: String,
    },

    /// A node handle that does not belong to this tree.
    #[error("Unknown node handle #{id}")]
    UnknownNode {
        /// Raw index of the handle
        id: usize,
    },

    /// Configuration could not be parsed or is out of range.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },
}

impl SynthError {
    /// Returns `true` for errors raised while building the tree.
    ///
    /// Build-time errors reject a single call and leave the tree usable;
    /// everything else aborts synthesis.
    pub fn is_build_time(&self) -> bool {
        matches!(
            self,
            Self::DuplicateSibling { .. }
                | Self::InvalidIdentifier { .. }
                | Self::InvalidOperation { .. }
                | Self::ExportConflict { .. }
                | Self::UnknownNode { .. }
        )
    }
}

impl From<toml::de::Error> for SynthError {
    fn from(error: toml::de::Error) -> Self {
        Self::Config {
            message: error.to_string(),
        }
    }
}

/// Error wrapper with a suggestion and details for terminal display.
///
/// Drivers that run synthesis on behalf of a user convert failures with
/// [`user_friendly_error`] and call [`ErrorContext::display`].
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying synthesis error
    pub error: SynthError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context without suggestion or details.
    #[must_use]
    pub const fn new(error: SynthError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors.
    ///
    /// - Error message: red and bold
    /// - Details: yellow
    /// - Suggestion: green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with a suggestion.
///
/// Errors that are not a [`SynthError`] (for example a driver's own I/O
/// failure) are wrapped as [`SynthError::InvalidOperation`] on the root so
/// they can still be displayed uniformly.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(synth_error) = error.downcast_ref::<SynthError>() {
        return create_error_context(synth_error.clone());
    }

    if let Some(context) = error.downcast_ref::<ErrorContext>() {
        return ErrorContext {
            error: context.error.clone(),
            suggestion: context.suggestion.clone(),
            details: context.details.clone(),
        };
    }

    ErrorContext::new(SynthError::InvalidOperation {
        path: "/".to_string(),
        reason: format!("{error:#}"),
    })
}

fn create_error_context(error: SynthError) -> ErrorContext {
    match &error {
        SynthError::DuplicateSibling { .. } => ErrorContext::new(error)
            .with_suggestion("Pick a different local id; ids only need to be unique among siblings")
            .with_details("Every child of a scope is addressed by its local id"),
        SynthError::InvalidIdentifier { .. } => ErrorContext::new(error)
            .with_suggestion(
                "Use letters, digits, '.', '_' and '-', or a single braced segment like '{name}'",
            )
            .with_details("Path separators and most punctuation are reserved"),
        SynthError::Cycle { .. } => ErrorContext::new(error)
            .with_suggestion("Remove one of the dependencies or references along the cycle")
            .with_details("Resources must be creatable in some order; a cycle has none"),
        SynthError::TokenResolutionOverflow { .. } | SynthError::CyclicToken { .. } => {
            ErrorContext::new(error)
                .with_suggestion("Check lazy values and fingerprint inputs for self references")
                .with_details("A deferred value kept producing further deferred values")
        }
        SynthError::UnresolvedScope { .. } => ErrorContext::new(error)
            .with_suggestion(
                "Export the value from its stack and import it where it is consumed",
            )
            .with_details("References cannot cross synthesis units directly"),
        SynthError::InvalidReference { .. } => ErrorContext::new(error)
            .with_suggestion("Reference the resource inside the construct instead of the construct"),
        SynthError::DuplicateLogicalId { .. } => ErrorContext::new(error)
            .with_suggestion("Remove or change one of the logical ID overrides"),
        SynthError::ExportConflict { .. } => ErrorContext::new(error)
            .with_suggestion("Export the new value under a different segment name"),
        SynthError::Config { .. } => ErrorContext::new(error)
            .with_suggestion("Check the TOML syntax and the value ranges of the synthesis settings"),
        SynthError::InvalidOperation { .. } | SynthError::UnknownNode { .. } => {
            ErrorContext::new(error)
        }
    }
}
