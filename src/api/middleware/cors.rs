//! Cross-origin request middleware.

use tower_http::cors::{Any, CorsLayer};

/// Allows the shorten form and stats endpoint to be used from any origin.
///
/// No credentials are involved, so a permissive policy is safe.
pub fn layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
