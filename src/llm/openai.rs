//! OpenAI-compatible client for chat, vision and speech transcription

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::multipart;
use reqwest::Client;
use reqwest::Response;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::ChatModel;
use super::Transcriber;
use super::VisionModel;
use crate::config::LlmConfig;
use crate::errors::AgriRagError;
use crate::errors::Result;
use crate::models::AudioInput;
use crate::models::ImageInput;
use crate::models::Language;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum ContentPart<'a> {
    #[serde(rename = "text")]
    Text { text: &'a str },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// One client for all three collaborators; every call is bounded by the
/// configured timeout.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    chat_model: String,
    vision_model: String,
    transcription_model: String,
}

impl OpenAiClient {
    /// # Errors
    /// - HTTP client build errors
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AgriRagError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            chat_model: config.chat_model.clone(),
            vision_model: config.vision_model.clone(),
            transcription_model: config.transcription_model.clone(),
        })
    }

    fn api_key(&self) -> Result<&str> {
        if self.api_key.is_empty() {
            return Err(AgriRagError::ConfigError(
                "LLM API key not provided (set llm.api_key or OPENAI_API_KEY)".to_string(),
            ));
        }
        Ok(&self.api_key)
    }

    async fn complete(&self, service: &str, request: &ChatRequest<'_>) -> Result<String> {
        let url = format!("{}/chat/completions", self.endpoint);
        debug!("Calling {} via {} (model {})", service, url, request.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key()?)
            .json(request)
            .send()
            .await
            .map_err(|e| AgriRagError::from_reqwest(service, &e))?;

        let response: ChatResponse = check_status(service, response)
            .await?
            .json()
            .await
            .map_err(|e| AgriRagError::from_reqwest(service, &e))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| {
                AgriRagError::CollaboratorError(format!("{service} returned no message content"))
            })
    }
}

/// Turn a non-2xx reply into a collaborator error carrying status and body
async fn check_status(service: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(AgriRagError::CollaboratorError(format!(
        "{service} API error ({status}): {body}"
    )))
}

fn data_url(image: &ImageInput) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(&image.bytes);
    format!("data:{};base64,{}", image.content_type, encoded)
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn chat(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.chat_model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(system),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Text(user),
                },
            ],
            max_tokens: None,
        };
        self.complete("chat", &request).await
    }
}

#[async_trait]
impl VisionModel for OpenAiClient {
    async fn analyze(&self, image: &ImageInput, prompt: &str, max_tokens: u32) -> Result<String> {
        let request = ChatRequest {
            model: &self.vision_model,
            messages: vec![ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: data_url(image),
                        },
                    },
                ]),
            }],
            max_tokens: Some(max_tokens),
        };
        self.complete("vision", &request).await
    }
}

#[async_trait]
impl Transcriber for OpenAiClient {
    async fn transcribe(&self, audio: &AudioInput, language: Language) -> Result<String> {
        let url = format!("{}/audio/transcriptions", self.endpoint);
        debug!(
            "Transcribing {} ({} bytes, language {})",
            audio.file_name,
            audio.bytes.len(),
            language
        );

        let file = multipart::Part::bytes(audio.bytes.clone()).file_name(audio.file_name.clone());
        let form = multipart::Form::new()
            .part("file", file)
            .text("model", self.transcription_model.clone())
            .text("language", language.code());

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key()?)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AgriRagError::from_reqwest("transcription", &e))?;

        let response: TranscriptionResponse = check_status("transcription", response)
            .await?
            .json()
            .await
            .map_err(|e| AgriRagError::from_reqwest("transcription", &e))?;

        Ok(response.text.trim().to_string())
    }
}
