//! Synthesis settings.
//!
//! The engine has a handful of implementation-defined constants: the width of
//! the path hash in logical IDs, the length bound of their human-readable
//! prefix, the width of content fingerprints and the depth bound for nested
//! token resolution. [`SynthConfig`] carries them so a driver can pin them in
//! a TOML file next to its other settings.
//!
//! # File Format
//!
//! ```toml
//! max_token_depth = 64
//! hash_length = 8
//! max_human_length = 240
//! fingerprint_length = 32
//! ```
//!
//! Every key is optional; missing keys take the defaults from
//! [`constants`](crate::constants). Reading the text from disk is left to the
//! driver.
//!
//! # Examples
//!
//! ```rust
//! use construct_synth::config::SynthConfig;
//!
//! let config = SynthConfig::from_toml_str("max_token_depth = 16").unwrap();
//! assert_eq!(config.max_token_depth, 16);
//! assert_eq!(config.hash_length, 8);
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_FINGERPRINT_LENGTH, DEFAULT_HASH_LENGTH, DEFAULT_MAX_HUMAN_LENGTH,
    DEFAULT_MAX_TOKEN_DEPTH, MAX_LOGICAL_ID_LENGTH,
};
use crate::core::{Result, SynthError};

/// Hex digits available from a SHA-256 digest.
const SHA256_HEX_DIGITS: usize = 64;

const fn default_max_token_depth() -> usize {
    DEFAULT_MAX_TOKEN_DEPTH
}

const fn default_hash_length() -> usize {
    DEFAULT_HASH_LENGTH
}

const fn default_max_human_length() -> usize {
    DEFAULT_MAX_HUMAN_LENGTH
}

const fn default_fingerprint_length() -> usize {
    DEFAULT_FINGERPRINT_LENGTH
}

/// Tunable constants of the synthesis engine.
///
/// Changing `hash_length`, `max_human_length` or `fingerprint_length` changes
/// emitted logical IDs, which downstream systems treat as replacing every
/// resource. Pin them once per project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthConfig {
    /// Maximum chain of nested token resolutions.
    #[serde(default = "default_max_token_depth")]
    pub max_token_depth: usize,

    /// Hex digits of the path hash appended to logical IDs.
    #[serde(default = "default_hash_length")]
    pub hash_length: usize,

    /// Maximum length of the human-readable prefix of logical IDs.
    #[serde(default = "default_max_human_length")]
    pub max_human_length: usize,

    /// Hex digits of the content fingerprint suffix.
    #[serde(default = "default_fingerprint_length")]
    pub fingerprint_length: usize,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            max_token_depth: DEFAULT_MAX_TOKEN_DEPTH,
            hash_length: DEFAULT_HASH_LENGTH,
            max_human_length: DEFAULT_MAX_HUMAN_LENGTH,
            fingerprint_length: DEFAULT_FINGERPRINT_LENGTH,
        }
    }
}

impl SynthConfig {
    /// Parse settings from TOML text and validate them.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would produce unusable identifiers.
    pub fn validate(&self) -> Result<()> {
        if self.max_token_depth == 0 {
            return Err(config_error("max_token_depth must be at least 1"));
        }
        if self.hash_length == 0 || self.hash_length > SHA256_HEX_DIGITS {
            return Err(config_error(format!(
                "hash_length must be between 1 and {SHA256_HEX_DIGITS}, got {}",
                self.hash_length
            )));
        }
        if self.fingerprint_length == 0 || self.fingerprint_length > SHA256_HEX_DIGITS {
            return Err(config_error(format!(
                "fingerprint_length must be between 1 and {SHA256_HEX_DIGITS}, got {}",
                self.fingerprint_length
            )));
        }
        if self.max_human_length + self.hash_length > MAX_LOGICAL_ID_LENGTH {
            return Err(config_error(format!(
                "max_human_length + hash_length must not exceed {MAX_LOGICAL_ID_LENGTH}"
            )));
        }
        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> SynthError {
    SynthError::Config {
        message: message.into(),
    }
}
