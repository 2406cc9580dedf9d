//! Assistant control endpoints

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};

use super::ApiState;
use crate::classify::{ClassificationResult, Emotion, EmotionClassifier, Language, LanguageClassifier};
use crate::session::SessionState;

/// Build assistant router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/wake", post(wake))
        .route("/classify", post(classify))
        .route("/enabled", put(set_enabled))
        .with_state(state)
}

/// Status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub state: SessionState,
    pub enabled: bool,
    pub wake_armed: bool,
}

async fn status(State(state): State<Arc<ApiState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        state: *state.state.borrow(),
        enabled: state.preferences.load().enabled,
        wake_armed: state.wake.is_armed(),
    })
}

/// Wake accepted or refused
#[derive(Debug, Serialize)]
pub struct WakeResponse {
    pub accepted: bool,
    pub state: SessionState,
}

/// Trigger a session as if the wake phrase was heard
async fn wake(State(state): State<Arc<ApiState>>) -> (StatusCode, Json<WakeResponse>) {
    let current = *state.state.borrow();
    if !current.is_quiescent() {
        return (
            StatusCode::CONFLICT,
            Json(WakeResponse {
                accepted: false,
                state: current,
            }),
        );
    }

    state.wake.trigger_manual();
    (
        StatusCode::ACCEPTED,
        Json(WakeResponse {
            accepted: true,
            state: current,
        }),
    )
}

/// Classification request
#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub text: String,
}

/// Classification response
#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub language: ClassificationResult<Language>,
    pub language_code: &'static str,
    pub emotion: ClassificationResult<Emotion>,
    pub emotion_description: &'static str,
    pub emotion_color: &'static str,
}

async fn classify(Json(request): Json<ClassifyRequest>) -> Json<ClassifyResponse> {
    let language = LanguageClassifier::classify(&request.text);
    let emotion = EmotionClassifier::classify(&request.text);

    Json(ClassifyResponse {
        language_code: language.value.code(),
        language,
        emotion_description: emotion.value.description(),
        emotion_color: emotion.value.color(),
        emotion,
    })
}

/// Enable or disable the wake detector
#[derive(Debug, Deserialize)]
pub struct EnabledRequest {
    pub enabled: bool,
}

/// Persist the preference and arm or disarm the detector to match
async fn set_enabled(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<EnabledRequest>,
) -> Result<Json<StatusResponse>, AssistantError> {
    let prefs = state
        .preferences
        .set_enabled(request.enabled)
        .map_err(|e| AssistantError::Preferences(e.to_string()))?;

    if prefs.enabled {
        state.wake.arm().await;
    } else {
        state.wake.disarm().await;
    }

    tracing::info!(enabled = prefs.enabled, "assistant preference updated");

    Ok(Json(StatusResponse {
        state: *state.state.borrow(),
        enabled: prefs.enabled,
        wake_armed: state.wake.is_armed(),
    }))
}

/// Assistant API errors
#[derive(Debug)]
pub enum AssistantError {
    Preferences(String),
}

impl IntoResponse for AssistantError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorBody {
            code: &'static str,
            message: String,
        }

        let (status, code, message) = match self {
            Self::Preferences(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "preferences_failed", msg),
        };

        (status, Json(ErrorBody { code, message })).into_response()
    }
}
