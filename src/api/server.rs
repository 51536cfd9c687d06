//! HTTP server implementation

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::config::AppConfig;
use crate::rag::AdvisoryService;
use crate::Result;

/// Assemble the application router: `/api` routes plus tracing, the upload
/// limit and optional CORS
pub fn build_app(state: AppState, max_upload_bytes: usize, enable_cors: bool) -> Router {
    let mut app = Router::new()
        .nest("/api", routes::api_routes(state))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        info!("✅ CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Start the API server
pub async fn serve_api(
    config: &AppConfig,
    service: AdvisoryService,
    host: String,
    port: u16,
    enable_cors: bool,
) -> Result<()> {
    info!("🚀 Starting AgriRAG API server...");

    let state = AppState::new(service);
    let app = build_app(state, config.server.max_upload_bytes, enable_cors);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 API server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET  /api/health         - Health check");
    info!("  GET  /api/stats          - Index statistics");
    info!("  POST /api/query          - Text query");
    info!("  POST /api/transcribe     - Speech to text");
    info!("  POST /api/analyze-image  - Image query");

    axum::serve(listener, app).await?;

    Ok(())
}
