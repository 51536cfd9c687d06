/// Query, image and transcription handlers
use axum::extract::rejection::JsonRejection;
use axum::extract::Multipart;
use axum::extract::State;
use axum::Json;
use tracing::info;

use super::AppState;
use crate::api::types::ApiError;
use crate::api::types::QueryRequest;
use crate::errors::AgriRagError;
use crate::models::Answer;
use crate::models::AudioInput;
use crate::models::ImageInput;
use crate::models::Language;
use crate::models::TextQuery;
use crate::models::Transcript;

/// Answer a text query (POST /api/query)
pub async fn query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<Answer>, ApiError> {
    let Json(request) = payload
        .map_err(|e| AgriRagError::InputError(format!("invalid request body: {}", e.body_text())))?;
    let language = parse_language(request.language.as_deref())?;
    let query = request.query.unwrap_or_default();
    info!("POST /api/query ({}): {}", language, query);

    let answer = state
        .service
        .answer_text(&TextQuery::new(query, language))
        .await?;
    Ok(Json(answer))
}

/// Transcribe an uploaded clip (POST /api/transcribe)
pub async fn transcribe(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Transcript>, ApiError> {
    let mut audio = None;
    let mut language = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "audio" => {
                let file_name = field.file_name().unwrap_or("audio.webm").to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                if !bytes.is_empty() {
                    audio = Some(AudioInput {
                        bytes: bytes.to_vec(),
                        file_name,
                    });
                }
            }
            "language" => language = Some(field.text().await.map_err(bad_multipart)?),
            _ => continue,
        }
    }

    let language = parse_language(language.as_deref())?;
    info!("POST /api/transcribe ({})", language);
    let transcript = state.service.transcribe(audio, language).await?;
    Ok(Json(transcript))
}

/// Answer a question about an uploaded photo (POST /api/analyze-image)
pub async fn analyze_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Answer>, ApiError> {
    let mut image = None;
    let mut prompt = String::new();
    let mut language = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "image" => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                if !bytes.is_empty() {
                    image = Some(ImageInput::new(bytes.to_vec(), content_type.as_deref()));
                }
            }
            "prompt" => prompt = field.text().await.map_err(bad_multipart)?,
            "language" => language = Some(field.text().await.map_err(bad_multipart)?),
            _ => continue,
        }
    }

    let language = parse_language(language.as_deref())?;
    info!("POST /api/analyze-image ({}): {}", language, prompt);
    let answer = state.service.answer_image(image, &prompt, language).await?;
    Ok(Json(answer))
}

fn parse_language(raw: Option<&str>) -> Result<Language, AgriRagError> {
    raw.map_or(Ok(Language::default()), |s| s.parse::<Language>())
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> AgriRagError {
    AgriRagError::InputError(format!("malformed multipart body: {err}"))
}
