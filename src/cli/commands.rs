//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "agrirag")]
#[command(about = "AgriRAG: dataset-first answers for farmers with generative fallback")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: config.toml, then config.example.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the corpus, build the index and start the HTTP API
    Serve {
        /// Host to bind to (default: from config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to (default: from config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Disable CORS even if the config enables it
        #[arg(long)]
        no_cors: bool,
    },
    /// Answer a single text query and print the JSON response
    Ask {
        /// The question to ask
        query: String,
        /// Answer language (en or bn)
        #[arg(short, long, default_value = "en")]
        language: String,
        /// First-stage similarity threshold (default: from config)
        #[arg(short, long)]
        threshold: Option<f32>,
    },
    /// Build the index and print per-table statistics
    Index,
    /// Show current configuration
    Config,
}
