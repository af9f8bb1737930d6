//! Utility functions for short code generation.
//!
//! - [`base62`] - Base-62 codec for sequence-derived codes
//! - [`code_generator`] - Word-pair and random code generators, custom code validation

pub mod base62;
pub mod code_generator;
