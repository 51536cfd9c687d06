use agrirag::cli::print_error;
use agrirag::cli::run_command;
use agrirag::cli::Cli;
use agrirag::config::AppConfig;
use agrirag::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load()?,
    };

    // Initialize logging with configuration; --verbose wins over the file
    if cli.verbose {
        agrirag::logging::init_logging_with_level("debug")?;
    } else {
        agrirag::logging::init_logging_with_config(&config)?;
    }

    if let Err(e) = run_command(&config, cli.command).await {
        print_error(&e.to_string());
        return Err(e);
    }

    Ok(())
}
