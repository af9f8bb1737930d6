//! DTOs for link shortening endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to shorten a single URL.
///
/// `url` is optional at the type level so that a missing field is reported as
/// a validation error (`"URL is required"`) instead of a deserialization
/// failure. The older form field name `longUrl` is accepted as an alias.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequest {
    /// The original URL to shorten; stored verbatim.
    #[serde(alias = "longUrl")]
    #[validate(length(min = 1, message = "URL is required"))]
    pub url: Option<String>,

    /// Optional custom short code; `null` and `""` both mean "generate one".
    pub custom_code: Option<String>,
}

/// Response for a created short link.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenResponse {
    pub short_url: String,
    pub code: String,
}
