//! One-shot text query handler

use crate::cli::output::*;
use crate::errors::AgriRagError;
use crate::models::Language;
use crate::models::TextQuery;
use crate::rag::AdvisoryService;
use crate::AppConfig;
use crate::Result;

/// Run a text query through the full pipeline and print the JSON answer
pub async fn handle_ask_command(
    config: &AppConfig,
    query: &str,
    language: &str,
    threshold: Option<f32>,
) -> Result<()> {
    let language: Language = language.parse()?;
    if let Some(threshold) = threshold.filter(|t| !(-1.0..=1.0).contains(t)) {
        return Err(AgriRagError::InputError(format!(
            "threshold must be within [-1, 1], got {threshold}"
        )));
    }

    let mut service = AdvisoryService::from_config(config).await?;
    if let Some(threshold) = threshold {
        service = service.with_threshold(threshold);
    }

    print_info(&format!(
        "Searching {} tables (threshold {})",
        service.index().len(),
        service.threshold()
    ));
    let answer = service
        .answer_text(&TextQuery::new(query, language))
        .await?;
    println!("{}", serde_json::to_string_pretty(&answer)?);
    Ok(())
}
