//! Unit test suite for construct-synth
//!
//! Exercises the public API of each module in isolation: tree construction,
//! token encodings, the resolver, dependency expansion, fingerprints,
//! exports and configuration.
//!
//! # Running Unit Tests
//!
//! ```bash
//! cargo test --test unit
//! ```

mod config_tests;
mod export_tests;
mod resolver_tests;
mod token_tests;
