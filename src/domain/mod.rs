//! Domain layer containing business entities and the store contract.
//!
//! # Architecture
//!
//! - [`entities`] - Core data structures
//! - [`repositories`] - The [`repositories::MappingStore`] trait
//!
//! The domain layer has no dependencies on infrastructure or presentation layers;
//! the file-backed implementation lives in [`crate::infrastructure::persistence`].

pub mod entities;
pub mod repositories;
