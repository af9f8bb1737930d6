//! Short code allocation policy layered over the mapping store.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::entities::Record;
use crate::domain::repositories::MappingStore;
use crate::error::AppError;
use crate::utils::base62;
use crate::utils::code_generator::{CodeGenerator, is_reserved_code, validate_custom_code};

/// Default cap on generate-and-check rounds.
pub const DEFAULT_MAX_ATTEMPTS: usize = 32;

/// Longest accepted target URL.
pub const MAX_TARGET_LENGTH: usize = 2048;

/// How codes are produced when the caller does not request one.
#[derive(Clone)]
pub enum CodePolicy {
    /// Random candidates (word pairs, fixed-length strings) checked against the store.
    Generated(Arc<dyn CodeGenerator>),
    /// Base-62 encoding of the store's sequence id, assigned at insertion.
    Sequence,
}

impl CodePolicy {
    pub fn generated(generator: impl CodeGenerator + 'static) -> Self {
        Self::Generated(Arc::new(generator))
    }

    pub fn name(&self) -> &'static str {
        match self {
            CodePolicy::Generated(generator) => generator.name(),
            CodePolicy::Sequence => "sequence",
        }
    }
}

impl fmt::Debug for CodePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CodePolicy({})", self.name())
    }
}

/// Result of [`CodeAllocator::allocate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Allocation {
    /// A code that was free at the time of the check.
    Code(String),
    /// The code will be derived from the sequence id assigned at insertion.
    Deferred,
}

/// Picks or validates short codes and creates records for them.
///
/// The allocator holds no state of its own; uniqueness is ultimately enforced
/// by [`MappingStore::create_if_absent`] and [`MappingStore::update_code`], so
/// a code that was free during [`Self::allocate`] but taken by the time of
/// insertion is detected rather than overwritten.
pub struct CodeAllocator<S: MappingStore + ?Sized> {
    store: Arc<S>,
    policy: CodePolicy,
    max_attempts: usize,
}

impl<S: MappingStore + ?Sized> CodeAllocator<S> {
    pub fn new(store: Arc<S>, policy: CodePolicy) -> Self {
        Self {
            store,
            policy,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Overrides the retry cap (minimum 1).
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn policy(&self) -> &CodePolicy {
        &self.policy
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Validates a requested code or generates a free one.
    ///
    /// - A requested code is checked for availability and returned verbatim.
    /// - Under [`CodePolicy::Generated`] candidates are drawn until a free one
    ///   is found or the retry cap is hit.
    /// - Under [`CodePolicy::Sequence`] no code exists before insertion, so
    ///   [`Allocation::Deferred`] is returned.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidInput`] for malformed custom codes
    /// - [`AppError::CodeConflict`] if the requested code is taken
    /// - [`AppError::AllocationExhausted`] if every candidate collided
    pub async fn allocate(&self, requested: Option<&str>) -> Result<Allocation, AppError> {
        if let Some(code) = requested {
            validate_custom_code(code)?;

            if self.store.exists(code).await? {
                return Err(AppError::CodeConflict {
                    code: code.to_string(),
                });
            }

            return Ok(Allocation::Code(code.to_string()));
        }

        match &self.policy {
            CodePolicy::Generated(generator) => self
                .next_free_candidate(generator.as_ref())
                .await
                .map(Allocation::Code),
            CodePolicy::Sequence => Ok(Allocation::Deferred),
        }
    }

    /// Allocates a code for `target` and persists the new record.
    ///
    /// # Errors
    ///
    /// Everything [`Self::allocate`] returns, plus [`AppError::InvalidInput`]
    /// for an empty target and [`AppError::PersistenceFailure`] from the store.
    pub async fn create(&self, target: &str, requested: Option<&str>) -> Result<Record, AppError> {
        validate_target(target)?;

        let record = match (requested, &self.policy) {
            (Some(code), _) => self.create_custom(target, code).await?,
            (None, CodePolicy::Generated(generator)) => {
                self.create_generated(target, generator.as_ref()).await?
            }
            (None, CodePolicy::Sequence) => self.create_sequenced(target).await?,
        };

        metrics::counter!("links_created_total").increment(1);
        Ok(record)
    }

    async fn create_custom(&self, target: &str, code: &str) -> Result<Record, AppError> {
        self.allocate(Some(code)).await?;

        self.store
            .create_if_absent(target, code)
            .await
            .map_err(|e| match e {
                AppError::DuplicateCode { code } => AppError::CodeConflict { code },
                other => other,
            })
    }

    async fn create_generated(
        &self,
        target: &str,
        generator: &dyn CodeGenerator,
    ) -> Result<Record, AppError> {
        for attempt in 1..=self.max_attempts {
            let code = generator.generate();

            if is_reserved_code(&code) || self.store.exists(&code).await? {
                metrics::counter!("code_collisions_total").increment(1);
                debug!(
                    "Candidate {} collided (attempt {}/{})",
                    code, attempt, self.max_attempts
                );
                continue;
            }

            match self.store.create_if_absent(target, &code).await {
                Ok(record) => return Ok(record),
                Err(AppError::DuplicateCode { code }) => {
                    metrics::counter!("code_collisions_total").increment(1);
                    warn!("Generated code {} was claimed concurrently, retrying", code);
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::AllocationExhausted {
            attempts: self.max_attempts,
        })
    }

    async fn create_sequenced(&self, target: &str) -> Result<Record, AppError> {
        for _ in 0..self.max_attempts {
            let (id, _) = self.store.create_with_sequence(target).await?;
            let code = base62::encode(id);

            if is_reserved_code(&code) {
                metrics::counter!("code_collisions_total").increment(1);
                debug!("Sequence code {} for id {} is a route name, skipping", code, id);
                self.store.discard_pending(id).await?;
                continue;
            }

            match self.store.update_code(id, &code).await {
                Ok(record) => return Ok(record),
                Err(AppError::DuplicateCode { code }) => {
                    metrics::counter!("code_collisions_total").increment(1);
                    warn!(
                        "Sequence code {} for id {} is held by a custom code, retrying",
                        code, id
                    );
                    self.store.discard_pending(id).await?;
                }
                Err(e) => {
                    if let Err(discard_err) = self.store.discard_pending(id).await {
                        warn!("Failed to discard placeholder {}: {}", id, discard_err);
                    }
                    return Err(e);
                }
            }
        }

        Err(AppError::AllocationExhausted {
            attempts: self.max_attempts,
        })
    }

    /// Draws up to `max_attempts` candidates and returns the first unused one.
    async fn next_free_candidate(&self, generator: &dyn CodeGenerator) -> Result<String, AppError> {
        for attempt in 1..=self.max_attempts {
            let code = generator.generate();

            if !is_reserved_code(&code) && !self.store.exists(&code).await? {
                return Ok(code);
            }

            metrics::counter!("code_collisions_total").increment(1);
            debug!(
                "Candidate {} collided (attempt {}/{})",
                code, attempt, self.max_attempts
            );
        }

        Err(AppError::AllocationExhausted {
            attempts: self.max_attempts,
        })
    }
}

/// Rejects missing, blank or oversized target URLs.
///
/// Targets are otherwise stored verbatim.
pub fn validate_target(target: &str) -> Result<(), AppError> {
    if target.trim().is_empty() {
        return Err(AppError::invalid_input("URL is required"));
    }

    if target.chars().any(char::is_control) {
        return Err(AppError::invalid_input("URL must not contain control characters"));
    }

    if target.len() > MAX_TARGET_LENGTH {
        return Err(AppError::invalid_input(format!(
            "URL must be at most {} characters",
            MAX_TARGET_LENGTH
        )));
    }

    Ok(())
}
