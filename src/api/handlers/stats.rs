/// Index statistics handler
use axum::extract::State;
use axum::Json;
use tracing::info;

use super::AppState;
use crate::api::types::StatsResponse;
use crate::api::types::TableStats;

/// Get per-table index statistics
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    info!("GET /api/stats");

    let index = state.service.index();
    let tables = index
        .tables()
        .iter()
        .map(|entry| TableStats {
            name: entry.table().name().to_string(),
            records: entry.table().len(),
            dimension: index.dimension(),
        })
        .collect();

    Json(StatsResponse {
        tables,
        total_records: index.total_records(),
        failed_tables: index.failed().iter().map(|(name, _)| name.clone()).collect(),
    })
}
