//! Read-only execution, log, and message record handlers.

use axum::extract::{Path, State};
use axum::Json;

use crate::error::ApiError;
use crate::schema::flows::{ExecutionListResponse, LogListResponse, MessageListResponse};
use crate::state::AppState;

/// `GET /api/flows/{id}/executions`
pub async fn list_executions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ExecutionListResponse>, ApiError> {
    let service = state.service.lock().await;
    let executions = service.list_executions(&id)?;
    Ok(Json(ExecutionListResponse { executions }))
}

/// `GET /api/flows/{id}/logs`
pub async fn list_logs(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LogListResponse>, ApiError> {
    let service = state.service.lock().await;
    let logs = service.list_logs(&id)?;
    Ok(Json(LogListResponse { logs }))
}

/// `GET /api/flows/{id}/messages`
pub async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageListResponse>, ApiError> {
    let service = state.service.lock().await;
    let messages = service.list_messages(&id)?;
    Ok(Json(MessageListResponse { messages }))
}
