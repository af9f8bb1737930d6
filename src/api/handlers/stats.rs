//! Handler for link statistics.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::stats::StatsResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns target URL and click count for a short code.
///
/// # Endpoint
///
/// `GET /stats/{code}`
///
/// # Response
///
/// ```json
/// { "code": "apple-zulu", "longUrl": "https://example.com", "clicks": 3 }
/// ```
///
/// `clicks` counts every completed redirect, including one that finished
/// immediately before this call.
///
/// # Errors
///
/// Returns 404 `{"error": "Short URL not found"}` if the code doesn't exist.
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<StatsResponse>, AppError> {
    let stats = state.link_service.get_stats(&code).await?;

    Ok(Json(StatsResponse {
        code,
        long_url: stats.target,
        clicks: stats.clicks,
    }))
}
