//! Top-level router configuration combining API and web routes.
//!
//! # Route Structure
//!
//! - `GET  /`             - Home page with the shorten form
//! - `POST /shorten`      - Create a short link
//! - `GET  /stats/{code}` - Link statistics
//! - `GET  /health`       - Health check
//! - `GET  /{code}`       - Short link redirect
//!
//! Fixed routes take precedence over `/{code}`, which is why their names are
//! reserved as custom codes.
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **CORS** - Permissive cross-origin access
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{cors, tracing};
use crate::state::AppState;
use crate::web;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let router = Router::new()
        .merge(web::routes::public_routes())
        .merge(api::routes::api_routes())
        .route("/health", get(health_handler))
        .route("/{code}", get(redirect_handler))
        .with_state(state)
        .layer(cors::layer())
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
