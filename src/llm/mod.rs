//! Generative collaborators used when the corpus has no confident answer

pub mod openai;
pub mod prompts;

use async_trait::async_trait;

pub use openai::OpenAiClient;
pub use prompts::PromptTemplate;

use crate::errors::Result;
use crate::models::AudioInput;
use crate::models::ImageInput;
use crate::models::Language;

/// Text generation from a system prompt and a user message
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(&self, system: &str, user: &str) -> Result<String>;
}

/// Free-text answer about an image
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn analyze(&self, image: &ImageInput, prompt: &str, max_tokens: u32) -> Result<String>;
}

/// Speech to text
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &AudioInput, language: Language) -> Result<String>;
}
