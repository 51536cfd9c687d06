//! CLI output formatting utilities
//!
//! This module provides consistent output formatting for the `AgriRAG` CLI

use crate::embeddings::EmbeddingIndex;
use crate::AppConfig;

/// Safely truncate a string at character boundary (not byte boundary)
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Print per-table index statistics
pub fn print_index_summary(index: &EmbeddingIndex) {
    println!("📚 Indexed {} tables ({} records):", index.len(), index.total_records());
    for entry in index.tables() {
        println!(
            "  - {} | Records: {} | Dimension: {}",
            entry.table().name(),
            entry.table().len(),
            index.dimension()
        );
    }
    if !index.failed().is_empty() {
        println!();
        print_warning(&format!("{} tables could not be embedded:", index.failed().len()));
        for (name, e) in index.failed() {
            println!("  - {}: {}", name, truncate_str(&e.to_string(), 120));
        }
    }
}

/// Print the effective configuration; callers pass a redacted copy
pub fn print_config(config: &AppConfig) {
    println!("📋 AgriRAG Configuration:");
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!();

    println!("📂 Data:");
    println!("  Directory: {}", config.data.dir.display());
    println!();

    println!("🧠 Embeddings:");
    println!("  Provider: {}", config.embeddings.provider);
    println!("  Model: {}", config.embeddings.model);
    println!("  Dimension: {}", config.embeddings.dimension);
    println!("  Endpoint: {}", config.embeddings.endpoint);
    println!("  API key: {}", display_secret(&config.embeddings.api_key));
    println!("  Batch size: {}", config.embeddings.batch_size);
    println!("  Index concurrency: {}", config.embeddings.index_concurrency);
    println!();

    println!("🤖 LLM:");
    println!("  Endpoint: {}", config.llm.endpoint);
    println!("  API key: {}", display_secret(&config.llm.api_key));
    println!("  Chat model: {}", config.llm.chat_model);
    println!("  Vision model: {}", config.llm.vision_model);
    println!("  Transcription model: {}", config.llm.transcription_model);
    println!("  Timeout: {}s", config.llm.timeout_secs);
    println!("  System prompt: {}", truncate_str(&config.llm.system_prompt, 60));
    println!();

    println!("🔍 Search:");
    println!("  Threshold: {}", config.search.threshold);
    println!("  Confidence floor: {}", crate::rag::CONFIDENCE_FLOOR);
    println!();

    println!("🌐 Server:");
    println!("  Address: {}:{}", config.server.host, config.server.port);
    println!("  CORS: {}", config.server.cors);
    println!("  Max upload: {} bytes", config.server.max_upload_bytes);
    println!();

    println!("🧩 Extra extractor rules: {}", config.extractor.rules.len());
    for rule in &config.extractor.rules {
        println!("  - {:?} -> {:?}", rule.keywords, rule.fields);
    }
}

fn display_secret(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}

pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("❌ {msg}");
}
