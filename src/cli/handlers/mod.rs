//! CLI command handlers module
//!
//! This module is organized by functional domains:
//! - ask: one-shot text queries
//! - index: corpus loading and index statistics
//! - serve: API server
//! - info: configuration display

pub mod ask;
pub mod index;
pub mod info;
pub mod serve;

pub use ask::*;
pub use index::*;
pub use info::*;
pub use serve::*;

use crate::cli::commands::Commands;
use crate::AppConfig;
use crate::Result;

/// Dispatch a parsed command
pub async fn run_command(config: &AppConfig, command: Commands) -> Result<()> {
    match command {
        Commands::Serve {
            host,
            port,
            no_cors,
        } => handle_serve_command(config, host, port, no_cors).await,
        Commands::Ask {
            query,
            language,
            threshold,
        } => handle_ask_command(config, &query, &language, threshold).await,
        Commands::Index => handle_index_command(config).await,
        Commands::Config => handle_config_command(config),
    }
}
