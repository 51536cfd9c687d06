//! Request and response types shared by the orchestrator, the HTTP layer and the CLI

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::corpus::FieldValue;
use crate::errors::AgriRagError;

/// Language the user wants the answer in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Bn,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Bn => "bn",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = AgriRagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "en" => Ok(Self::En),
            "bn" => Ok(Self::Bn),
            other => Err(AgriRagError::InputError(format!(
                "unsupported language: {other} (expected en or bn)"
            ))),
        }
    }
}

/// Free-text question
#[derive(Debug, Clone)]
pub struct TextQuery {
    pub query: String,
    pub language: Language,
}

impl TextQuery {
    pub fn new(query: impl Into<String>, language: Language) -> Self {
        Self {
            query: query.into(),
            language,
        }
    }
}

/// Uploaded image
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub bytes: Vec<u8>,
    /// MIME type used for the data URL; defaults to JPEG
    pub content_type: String,
}

impl ImageInput {
    pub fn new(bytes: Vec<u8>, content_type: Option<&str>) -> Self {
        let content_type = content_type
            .filter(|ct| ct.starts_with("image/"))
            .unwrap_or("image/jpeg")
            .to_string();
        Self {
            bytes,
            content_type,
        }
    }
}

/// Uploaded audio clip
#[derive(Debug, Clone)]
pub struct AudioInput {
    pub bytes: Vec<u8>,
    /// Transcription APIs infer the codec from the extension
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transcript {
    pub transcript: String,
}

/// Where an answer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerSource {
    Dataset,
    Generative,
}

/// Either dataset values or generated text
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnswerData {
    Records(Vec<FieldValue>),
    Text(String),
}

/// Final response envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub source: AnswerSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<AnswerData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl Answer {
    /// Dataset answer; confidence is the best match's similarity
    pub fn dataset(values: Vec<FieldValue>, confidence: f32) -> Self {
        Self {
            source: AnswerSource::Dataset,
            data: Some(AnswerData::Records(values)),
            analysis: None,
            confidence: Some(confidence),
        }
    }

    /// Generated reply to a text query
    pub fn generative(text: String) -> Self {
        Self {
            source: AnswerSource::Generative,
            data: Some(AnswerData::Text(text)),
            analysis: None,
            confidence: Some(1.0),
        }
    }

    /// Generated image analysis; carries no numeric confidence
    pub fn analysis(text: String) -> Self {
        Self {
            source: AnswerSource::Generative,
            data: None,
            analysis: Some(text),
            confidence: None,
        }
    }
}
