//! Core types shared by every stage of synthesis
//!
//! # Modules
//!
//! ## `error` - Error Handling
//!
//! - [`SynthError`] - Enumerated failure modes of tree construction and synthesis
//! - [`ErrorContext`] - Display wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error into an [`ErrorContext`]
//!
//! ## `resource` - Resource Capability Interface
//!
//! - [`ResourceSpec`] - Per-kind capability trait (kind tag, properties,
//!   significant inputs)
//! - [`RawResource`] - Data-only implementation for ad-hoc resources

pub mod error;
pub mod resource;

pub use error::{ErrorContext, Result, SynthError, user_friendly_error};
pub use resource::{RawResource, ResourceSpec};
