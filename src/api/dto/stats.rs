//! DTOs for link statistics.

use serde::Serialize;

/// Target URL and click count of a short link.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub code: String,
    pub long_url: String,
    pub clicks: u64,
}
