//! Link creation, redirect resolution and statistics.

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::allocator::{CodeAllocator, CodePolicy};
use crate::domain::entities::{LinkStats, Record};
use crate::domain::repositories::MappingStore;
use crate::error::AppError;

/// Service behind the three public operations: shorten, redirect and stats.
///
/// Shortening goes through the [`CodeAllocator`]; redirects and stats go
/// straight to the store.
pub struct LinkService<S: MappingStore + ?Sized> {
    store: Arc<S>,
    allocator: CodeAllocator<S>,
    base_url: String,
}

impl<S: MappingStore + ?Sized> LinkService<S> {
    /// Creates a new link service.
    ///
    /// `base_url` is the public prefix of short URLs; trailing slashes are dropped.
    pub fn new(store: Arc<S>, policy: CodePolicy, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            allocator: CodeAllocator::new(store.clone(), policy),
            store,
            base_url,
        }
    }

    /// Overrides the allocator's retry cap.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.allocator = self.allocator.with_max_attempts(max_attempts);
        self
    }

    pub fn allocator(&self) -> &CodeAllocator<S> {
        &self.allocator
    }

    /// Creates a short link for `long_url`.
    ///
    /// An empty `custom_code` is treated as absent.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidInput`] if the URL or custom code is invalid
    /// - [`AppError::CodeConflict`] if the custom code is taken
    /// - [`AppError::AllocationExhausted`] if no free code could be generated
    /// - [`AppError::PersistenceFailure`] if the store could not be flushed
    pub async fn shorten(
        &self,
        long_url: &str,
        custom_code: Option<&str>,
    ) -> Result<Record, AppError> {
        let custom_code = custom_code.filter(|c| !c.is_empty());

        let record = self.allocator.create(long_url, custom_code).await?;

        info!(
            code = %record.code,
            policy = self.allocator.policy().name(),
            custom = custom_code.is_some(),
            "Created short link"
        );
        Ok(record)
    }

    /// Resolves a code for redirection, counting the visit.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown.
    pub async fn resolve(&self, code: &str) -> Result<Record, AppError> {
        let record = self.store.lookup_and_touch(code).await?;

        metrics::counter!("redirects_total").increment(1);
        debug!("Resolved {} (clicks: {})", code, record.clicks);
        Ok(record)
    }

    /// Returns target and click count of a code.
    ///
    /// The count includes every redirect that has completed, so a stats call
    /// right after a redirect reflects that visit.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown.
    pub async fn get_stats(&self, code: &str) -> Result<LinkStats, AppError> {
        self.store.get_stats(code).await
    }

    /// Number of short links in the store.
    pub async fn link_count(&self) -> usize {
        self.store.count().await
    }

    /// Builds the public short URL for a code.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockMappingStore;
    use crate::utils::code_generator::WordPairGenerator;

    fn service(store: MockMappingStore, policy: CodePolicy) -> LinkService<MockMappingStore> {
        LinkService::new(Arc::new(store), policy, "https://s.example.com/")
    }

    #[tokio::test]
    async fn test_shorten_with_generated_code() {
        let mut store = MockMappingStore::new();
        store.expect_exists().times(1).returning(|_| Ok(false));
        store
            .expect_create_if_absent()
            .withf(|target, _| target == "https://example.com")
            .times(1)
            .returning(|target, code| Ok(Record::new(1, code, target)));

        let service = service(store, CodePolicy::generated(WordPairGenerator::default()));

        let record = service.shorten("https://example.com", None).await.unwrap();
        assert_eq!(record.target, "https://example.com");
        assert_eq!(record.clicks, 0);
    }

    #[tokio::test]
    async fn test_shorten_treats_empty_custom_code_as_absent() {
        let mut store = MockMappingStore::new();
        store
            .expect_create_with_sequence()
            .times(1)
            .returning(|target| Ok((1, Record::pending(1, target))));
        store
            .expect_update_code()
            .times(1)
            .returning(|id, code| Ok(Record::new(id, code, "https://example.com")));

        let service = service(store, CodePolicy::Sequence);

        let record = service
            .shorten("https://example.com", Some(""))
            .await
            .unwrap();
        assert_eq!(record.code, "1");
    }

    #[tokio::test]
    async fn test_shorten_with_custom_code() {
        let mut store = MockMappingStore::new();
        store
            .expect_exists()
            .withf(|code| code == "abc")
            .times(1)
            .returning(|_| Ok(false));
        store
            .expect_create_if_absent()
            .withf(|_, code| code == "abc")
            .times(1)
            .returning(|target, code| Ok(Record::new(3, code, target)));

        let service = service(store, CodePolicy::Sequence);

        let record = service.shorten("https://a.com", Some("abc")).await.unwrap();
        assert_eq!(record.code, "abc");
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let mut store = MockMappingStore::new();
        store
            .expect_lookup_and_touch()
            .times(1)
            .returning(|code| Err(AppError::not_found(code)));

        let service = service(store, CodePolicy::Sequence);

        let result = service.resolve("missing").await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_resolve_returns_post_increment_record() {
        let mut store = MockMappingStore::new();
        store.expect_lookup_and_touch().times(1).returning(|code| {
            let mut record = Record::new(1, code, "https://example.com");
            record.clicks = 1;
            Ok(record)
        });

        let service = service(store, CodePolicy::Sequence);

        let record = service.resolve("abc").await.unwrap();
        assert_eq!(record.clicks, 1);
    }

    #[test]
    fn test_short_url_trims_trailing_slash() {
        let service = service(MockMappingStore::new(), CodePolicy::Sequence);
        assert_eq!(service.short_url("abc"), "https://s.example.com/abc");
    }
}
