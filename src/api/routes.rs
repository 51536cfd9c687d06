//! API route definitions

use axum::routing::get;
use axum::routing::post;
use axum::Router;

use super::handlers::AppState;
use super::handlers::{
    self,
};

/// Create RESTful API router
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/stats", get(handlers::get_stats))
        .route("/query", post(handlers::query))
        .route("/transcribe", post(handlers::transcribe))
        .route("/analyze-image", post(handlers::analyze_image))
        .with_state(state)
}
