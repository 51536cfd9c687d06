/// API request handlers
use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::api::types::HealthResponse;
use crate::rag::AdvisoryService;

pub mod query;
pub mod stats;

pub use query::*;
pub use stats::*;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AdvisoryService>,
}

impl AppState {
    pub fn new(service: AdvisoryService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let index = state.service.index();
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        tables: index.len(),
        records: index.total_records(),
    })
}
