//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL and counts the visit.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// The click is persisted before the redirect is sent.
///
/// # Responses
///
/// - 307 Temporary Redirect with `Location` set to the target URL
/// - 404 `Short URL not found` (plain text) for unknown codes
/// - 500 `{"error": ...}` if the click could not be persisted
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let record = match state.link_service.resolve(&code).await {
        Ok(record) => record,
        Err(AppError::NotFound { .. }) => {
            return Ok((StatusCode::NOT_FOUND, "Short URL not found").into_response());
        }
        Err(e) => return Err(e),
    };

    let location = location_header(&record.target)?;

    Ok((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response())
}

/// Builds a `Location` value, percent-encoding any non-ASCII bytes.
fn location_header(target: &str) -> Result<HeaderValue, AppError> {
    let encoded = if target.is_ascii() {
        target.to_string()
    } else {
        let mut out = String::with_capacity(target.len() * 3);
        for byte in target.bytes() {
            if byte.is_ascii() {
                out.push(byte as char);
            } else {
                out.push_str(&format!("%{:02X}", byte));
            }
        }
        out
    };

    HeaderValue::from_str(&encoded)
        .map_err(|_| AppError::internal("Stored URL is not a valid redirect location"))
}
