#![allow(dead_code)]

use axum::{Router, routing::get};
use snaplink::api::handlers::{health_handler, redirect_handler};
use snaplink::application::allocator::CodePolicy;
use snaplink::application::services::LinkService;
use snaplink::domain::repositories::MappingStore;
use snaplink::infrastructure::persistence::FileMappingStore;
use snaplink::state::AppState;
use snaplink::utils::code_generator::{RandomCodeGenerator, WordPairGenerator};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub const BASE_URL: &str = "http://localhost:3000";

/// Isolated store living in its own temporary directory.
///
/// The directory is removed when the context is dropped, so keep it alive
/// for the duration of the test.
pub struct TestContext {
    pub dir: TempDir,
    pub store: Arc<FileMappingStore>,
    pub state: AppState,
}

impl TestContext {
    pub fn store_path(&self) -> PathBuf {
        store_path(&self.dir)
    }
}

pub fn store_path(dir: &TempDir) -> PathBuf {
    dir.path().join("data").join("urls.json")
}

pub async fn open_store(dir: &TempDir) -> Arc<FileMappingStore> {
    Arc::new(FileMappingStore::open(store_path(dir)).await.unwrap())
}

pub async fn create_test_context(policy: CodePolicy) -> TestContext {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let dyn_store: Arc<dyn MappingStore> = store.clone();
    let state = AppState::new(LinkService::new(dyn_store, policy, BASE_URL));

    TestContext { dir, store, state }
}

pub async fn words_context() -> TestContext {
    create_test_context(CodePolicy::generated(WordPairGenerator::default())).await
}

pub async fn sequence_context() -> TestContext {
    create_test_context(CodePolicy::Sequence).await
}

pub async fn random_context() -> TestContext {
    create_test_context(CodePolicy::generated(RandomCodeGenerator::new(6))).await
}

pub async fn create_test_link(ctx: &TestContext, code: &str, url: &str) {
    ctx.store.create_if_absent(url, code).await.unwrap();
}

/// Router with every public route, without the outer middleware stack.
pub fn test_router(state: AppState) -> Router {
    Router::new()
        .merge(snaplink::web::routes::public_routes())
        .merge(snaplink::api::routes::api_routes())
        .route("/health", get(health_handler))
        .route("/{code}", get(redirect_handler))
        .with_state(state)
}
