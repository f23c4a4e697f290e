//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::StopId;

/// Request to search stop names.
#[derive(Debug, Deserialize)]
pub struct StationSearchRequest {
    /// Free-text query
    #[serde(default)]
    pub q: String,

    /// Maximum number of results (default 10, at most 50)
    pub limit: Option<usize>,
}

/// Ranked stop name matches.
#[derive(Debug, Serialize)]
pub struct StationSearchResponse {
    pub stations: Vec<StationSearchResult>,
}

/// A stop in search results.
#[derive(Debug, Serialize)]
pub struct StationSearchResult {
    /// Canonical stop name
    pub name: String,

    /// Stop identifier; `null` if the name has none configured
    pub id: Option<StopId>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Pipeline stage that failed
    pub stage: &'static str,
}
