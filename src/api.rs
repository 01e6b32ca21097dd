//! HTTP surface over the translation and speech services.
//!
//! Thin by design: handlers deserialize, delegate, serialize. Validation
//! failures come back as 400 with the offending field named; inference
//! failures as 502 with a generic message that never names a deployment
//! endpoint; storage failures as 500.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::errors::ServiceError;
use crate::languages::Language;
use crate::speech::SpeechService;
use crate::translation::{TranslateRequest, TranslationService};

#[derive(Clone)]
pub struct AppState {
    pub translation: Arc<TranslationService>,
    pub speech: Arc<SpeechService>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/languages", get(list_languages))
        .route("/api/translate", post(translate))
        .route("/api/text-to-speech", post(text_to_speech))
        .route("/api/speech-to-text", post(speech_to_text))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `ServiceError` mapped onto an HTTP response.
pub struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            ServiceError::Validation { field } => (
                StatusCode::BAD_REQUEST,
                format!("missing or invalid field `{}`", field),
            ),
            ServiceError::Inference(err) => {
                error!(error = %err, "inference failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "translation service is currently unavailable".to_string(),
                )
            }
            ServiceError::Storage(err) => {
                error!(error = %err, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn list_languages(State(state): State<AppState>) -> Json<Vec<Language>> {
    Json(state.translation.registry().list_all().to_vec())
}

#[derive(Debug, Deserialize)]
struct TranslateBody {
    src_text: Option<String>,
    src_lang: Option<String>,
    dst_lang: Option<String>,
    user: Option<String>,
}

#[derive(Debug, Serialize)]
struct TranslateResponse {
    src_text: String,
    dst_text: String,
    src_lang: String,
    dst_lang: String,
    model_name: Option<String>,
    model_version: Option<String>,
}

async fn translate(
    State(state): State<AppState>,
    Json(body): Json<TranslateBody>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let outcome = state
        .translation
        .translate(&TranslateRequest {
            src_text: body.src_text,
            src_lang: body.src_lang,
            dst_lang: body.dst_lang,
            user: body.user,
        })
        .await?;

    Ok(Json(TranslateResponse {
        src_text: outcome.src_text,
        dst_text: outcome.dst_text,
        src_lang: outcome.src_lang_code,
        dst_lang: outcome.dst_lang_code,
        model_name: outcome.model_name,
        model_version: outcome.model_version,
    }))
}

#[derive(Debug, Deserialize)]
struct TextToSpeechBody {
    text: Option<String>,
    lang: Option<String>,
}

#[derive(Debug, Serialize)]
struct TextToSpeechResponse {
    audio: String,
    model_name: String,
    model_version: String,
}

async fn text_to_speech(
    State(state): State<AppState>,
    Json(body): Json<TextToSpeechBody>,
) -> Result<Json<TextToSpeechResponse>, ApiError> {
    let synthesis = state
        .speech
        .synthesize(body.text.as_deref(), body.lang.as_deref())
        .await?;

    Ok(Json(TextToSpeechResponse {
        audio: synthesis.audio_b64,
        model_name: synthesis.model_name,
        model_version: synthesis.model_version,
    }))
}

#[derive(Debug, Deserialize)]
struct SpeechToTextBody {
    audio: Option<String>,
    sampling_rate: Option<i32>,
    lang: Option<String>,
}

#[derive(Debug, Serialize)]
struct SpeechToTextResponse {
    text: String,
    model_name: String,
    model_version: String,
}

async fn speech_to_text(
    State(state): State<AppState>,
    Json(body): Json<SpeechToTextBody>,
) -> Result<Json<SpeechToTextResponse>, ApiError> {
    let transcription = state
        .speech
        .transcribe(
            body.audio.as_deref(),
            body.sampling_rate.unwrap_or(16_000),
            body.lang.as_deref(),
        )
        .await?;

    Ok(Json(SpeechToTextResponse {
        text: transcription.text,
        model_name: transcription.model_name,
        model_version: transcription.model_version,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::InferenceError;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should collect");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    #[tokio::test]
    async fn test_validation_error_maps_to_400_and_names_field() {
        let response = ApiError::from(ServiceError::validation("src_lang")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("src_lang"));
    }

    #[tokio::test]
    async fn test_inference_error_maps_to_502_without_endpoint_detail() {
        let err = ServiceError::Inference(InferenceError::Remote(
            "http://native.internal:8015 refused".to_string(),
        ));
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        // The deployment endpoint must not leak to the caller
        let body = body_json(response).await;
        assert!(!body["error"].as_str().unwrap().contains("native.internal"));
    }

    #[tokio::test]
    async fn test_storage_error_maps_to_500() {
        let err = ServiceError::Storage(rusqlite::Error::InvalidQuery);
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
