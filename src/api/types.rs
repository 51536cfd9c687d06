//! API request and response types

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use tracing::error;
use tracing::warn;

use crate::errors::AgriRagError;

/// Text query request; fields are optional so that missing values surface
/// as input errors rather than extractor rejections
#[derive(Debug, Default, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub tables: usize,
    pub records: usize,
}

/// Per-table index statistics
#[derive(Debug, Serialize)]
pub struct TableStats {
    pub name: String,
    pub records: usize,
    pub dimension: usize,
}

/// Statistics response
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub tables: Vec<TableStats>,
    pub total_records: usize,
    /// Tables that loaded but could not be embedded
    pub failed_tables: Vec<String>,
}

/// Error body `{"error": message}`; input errors are 400, everything else 500
#[derive(Debug)]
pub struct ApiError(pub AgriRagError);

impl From<AgriRagError> for ApiError {
    fn from(err: AgriRagError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            warn!("Rejected request: {}", self.0);
            StatusCode::BAD_REQUEST
        } else {
            error!("Request failed: {}", self.0);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let message = match &self.0 {
            AgriRagError::InputError(msg) => msg.clone(),
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
