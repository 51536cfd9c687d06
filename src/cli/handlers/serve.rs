//! API server handlers

use crate::api::serve_api;
use crate::cli::output::*;
use crate::rag::AdvisoryService;
use crate::AppConfig;
use crate::Result;

pub async fn handle_serve_command(
    config: &AppConfig,
    host: Option<String>,
    port: Option<u16>,
    no_cors: bool,
) -> Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let cors = config.server.cors && !no_cors;

    println!("🚀 Starting AgriRAG API Server");
    println!("===============================\n");
    println!("📍 Host: {host}");
    println!("🔌 Port: {port}");
    println!("🌐 CORS: {}", if cors { "Enabled" } else { "Disabled" });
    println!();

    print_info(&format!(
        "Loading corpus from {} and building the index...",
        config.data.dir.display()
    ));
    let service = AdvisoryService::from_config(config).await?;
    print_index_summary(service.index());
    println!();

    serve_api(config, service, host, port, cors).await
}
