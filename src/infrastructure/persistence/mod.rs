//! Durable storage for the mapping table.
//!
//! - [`SnapshotFile`] - Atomic read/write of the JSON snapshot
//! - [`FileMappingStore`] - [`crate::domain::repositories::MappingStore`] over a snapshot file

pub mod file_mapping_store;
pub mod snapshot;

pub use file_mapping_store::FileMappingStore;
pub use snapshot::{Snapshot, SnapshotFile, SnapshotView};
