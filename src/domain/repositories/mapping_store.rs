//! Repository trait for the code → target mapping.

use crate::domain::entities::{LinkStats, Record};
use crate::error::AppError;
use async_trait::async_trait;

/// Durable keyed collection of short-code records.
///
/// Every mutating method must have flushed the full mapping to persistent
/// storage before it returns `Ok`. When the flush fails the method returns
/// [`AppError::PersistenceFailure`] and the in-memory state is left exactly as
/// it was before the call.
///
/// Check-then-act sequences (duplicate check before insert, read before
/// increment) are performed atomically inside the store, never by callers.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::FileMappingStore`] - JSON snapshot file
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// Returns true if a finalized record holds `code`.
    async fn exists(&self, code: &str) -> Result<bool, AppError>;

    /// Inserts a new record unless `code` is already taken.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DuplicateCode`] if the code exists, including when a
    /// concurrent request claimed it after the caller's own `exists` check.
    async fn create_if_absent(&self, target: &str, code: &str) -> Result<Record, AppError>;

    /// Inserts a placeholder record and returns its freshly assigned sequence id.
    ///
    /// The returned record has an empty code and cannot be looked up until
    /// [`MappingStore::update_code`] finalizes it.
    async fn create_with_sequence(&self, target: &str) -> Result<(u64, Record), AppError>;

    /// Assigns the final code to a pending record.
    ///
    /// # Errors
    ///
    /// - [`AppError::DuplicateCode`] if another record already holds `code`
    /// - [`AppError::NotFound`] if no record has this id
    /// - [`AppError::InvalidInput`] if the record already has a code
    async fn update_code(&self, id: u64, code: &str) -> Result<Record, AppError>;

    /// Removes a pending record that could not be finalized.
    ///
    /// Finalized records are never removed.
    async fn discard_pending(&self, id: u64) -> Result<(), AppError>;

    /// Looks up `code` and counts one click on it.
    ///
    /// Returns the record with the post-increment click count.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown.
    async fn lookup_and_touch(&self, code: &str) -> Result<Record, AppError>;

    /// Returns target and click count without side effects.
    async fn get_stats(&self, code: &str) -> Result<LinkStats, AppError>;

    /// Number of finalized records.
    async fn count(&self) -> usize;

    /// All finalized records ordered by id.
    async fn list(&self) -> Vec<Record>;
}
