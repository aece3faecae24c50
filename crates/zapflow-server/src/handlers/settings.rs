//! AI assistant settings handlers.

use axum::extract::State;
use axum::Json;
use zapflow_storage::AiSettings;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/ai/settings` — returns defaults until settings are saved.
pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<AiSettings>, ApiError> {
    let service = state.service.lock().await;
    let settings = service.ai_settings()?;
    Ok(Json(settings))
}

/// `POST /api/ai/settings` — range-checks and persists the settings.
pub async fn save_settings(
    State(state): State<AppState>,
    Json(settings): Json<AiSettings>,
) -> Result<Json<AiSettings>, ApiError> {
    let mut service = state.service.lock().await;
    let saved = service.save_ai_settings(settings)?;
    Ok(Json(saved))
}
