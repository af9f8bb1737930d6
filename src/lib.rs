//! # Snaplink
//!
//! A small URL shortening service built with Axum and a durable file-backed
//! mapping store.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - The mapping record and the store trait
//! - **Application Layer** ([`application`]) - Code allocation and the link service
//! - **Infrastructure Layer** ([`infrastructure`]) - JSON snapshot persistence
//! - **API Layer** ([`api`]) - Shorten, stats, health and redirect handlers
//! - **Web Layer** ([`web`]) - Home page with the shorten form
//!
//! ## Features
//!
//! - Word-pair, base-62 sequence and random short codes
//! - Custom codes with conflict detection
//! - Click counting on every redirect
//! - Whole-table snapshot rewritten atomically after each mutation
//!
//! ## Quick Start
//!
//! ```bash
//! export STORE_PATH=data/urls.json
//! export CODE_STRATEGY=words
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;
pub mod web;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::allocator::{CodeAllocator, CodePolicy};
    pub use crate::application::services::LinkService;
    pub use crate::domain::entities::{LinkStats, Record};
    pub use crate::domain::repositories::MappingStore;
    pub use crate::error::AppError;
    pub use crate::infrastructure::persistence::FileMappingStore;
    pub use crate::state::AppState;
}
