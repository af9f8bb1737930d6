//! Repository trait definitions for the domain layer.
//!
//! The traits abstract storage so the allocator and services can be tested
//! against `mockall` mocks and isolated file stores alike.
//!
//! # Available Repositories
//!
//! - [`MappingStore`] - Short code records, lookups and click counters
//!
//! # Testing
//!
//! See integration tests in `tests/repository_mapping.rs` for usage examples.

pub mod mapping_store;

pub use mapping_store::MappingStore;

#[cfg(test)]
pub use mapping_store::MockMappingStore;
