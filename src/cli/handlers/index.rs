//! Corpus loading and index statistics

use crate::cli::output::*;
use crate::embeddings::EmbeddingService;
use crate::rag::pipeline::build_index;
use crate::AppConfig;
use crate::Result;

/// Load every table, embed it and report what was indexed
pub async fn handle_index_command(config: &AppConfig) -> Result<()> {
    print_info(&format!(
        "Indexing {} with provider {} ({})",
        config.data.dir.display(),
        config.embeddings.provider,
        config.embeddings.model
    ));

    let embeddings = EmbeddingService::new(config)?;
    let index = build_index(config, &embeddings).await?;

    print_index_summary(&index);
    if index.is_empty() {
        print_warning("No tables indexed; every query will use the generative fallback");
    } else {
        print_success("Index built");
    }
    Ok(())
}
