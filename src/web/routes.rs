//! Web page route configuration.

use crate::state::AppState;
use crate::web::handlers::home_handler;
use axum::{Router, routing::get};

/// Browser-facing pages.
///
/// # Endpoints
///
/// - `GET /` - Home page with the shorten form
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/", get(home_handler))
}
