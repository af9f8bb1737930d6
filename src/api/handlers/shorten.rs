//! Handler for link shortening endpoint.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde_json::Value;
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com", "customCode": "my-link" }
/// ```
///
/// `customCode` is optional; without it a code is produced by the configured
/// strategy.
///
/// # Response
///
/// ```json
/// { "shortUrl": "http://localhost:3000/apple-zulu", "code": "apple-zulu" }
/// ```
///
/// # Errors
///
/// - 400 `{"error": "URL is required"}` for a missing, empty or non-string URL
/// - 400 `{"error": "Custom code already in use"}` when the custom code is taken
/// - 503 when no free code could be generated
/// - 500 when the store could not be persisted
pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ShortenResponse>, AppError> {
    let Json(body) = payload?;
    let payload = parse_request(body)?;
    payload.validate()?;

    let url = payload
        .url
        .ok_or_else(|| AppError::invalid_input("URL is required"))?;

    let record = state
        .link_service
        .shorten(&url, payload.custom_code.as_deref())
        .await?;

    Ok(Json(ShortenResponse {
        short_url: state.link_service.short_url(&record.code),
        code: record.code,
    }))
}

/// Deserializes the request, telling a missing URL apart from other bad fields.
fn parse_request(body: Value) -> Result<ShortenRequest, AppError> {
    let has_url = ["url", "longUrl"]
        .iter()
        .any(|key| body.get(key).is_some_and(Value::is_string));

    serde_json::from_value(body).map_err(|e| {
        tracing::debug!("Rejected shorten payload: {}", e);
        if has_url {
            AppError::invalid_input("Invalid request body")
        } else {
            AppError::invalid_input("URL is required")
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_request_reports_non_string_url_as_missing() {
        let err = parse_request(json!({ "url": 42, "customCode": 5 }))
            .map(|_| ())
            .unwrap_err();
        assert_eq!(err.to_string(), "URL is required");
    }

    #[test]
    fn test_parse_request_leaves_absent_url_to_handler() {
        let request = parse_request(json!({ "customCode": "abc" })).unwrap();
        assert!(request.url.is_none());
    }

    #[test]
    fn test_parse_request_reports_bad_field_next_to_valid_url() {
        let err = parse_request(json!({ "url": "https://example.com", "customCode": 5 }))
            .map(|_| ())
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid request body");

        let err = parse_request(json!({ "longUrl": "https://example.com", "customCode": [] }))
            .map(|_| ())
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid request body");
    }

    #[test]
    fn test_parse_request_accepts_null_custom_code() {
        let request = parse_request(json!({ "url": "https://example.com", "customCode": null }))
            .unwrap();
        assert_eq!(request.url.as_deref(), Some("https://example.com"));
        assert!(request.custom_code.is_none());
    }
}
