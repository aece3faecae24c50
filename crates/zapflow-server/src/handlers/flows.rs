//! Flow CRUD and execution handlers.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use zapflow_core::Flow;
use zapflow_storage::FlowRecord;

use crate::error::ApiError;
use crate::executor;
use crate::schema::flows::{ExecuteResponse, FlowListResponse};
use crate::state::AppState;

/// Lists all flows.
///
/// `GET /api/flows`
pub async fn list_flows(
    State(state): State<AppState>,
) -> Result<Json<FlowListResponse>, ApiError> {
    let service = state.service.lock().await;
    let flows = service.list_flows()?;
    Ok(Json(FlowListResponse { flows }))
}

/// Creates a flow.
///
/// `POST /api/flows`
pub async fn create_flow(
    State(state): State<AppState>,
    Json(flow): Json<Flow>,
) -> Result<Json<FlowRecord>, ApiError> {
    let mut service = state.service.lock().await;
    let record = service.create_flow(flow)?;
    Ok(Json(record))
}

/// Fetches a flow by id.
///
/// `GET /api/flows/{id}`
pub async fn get_flow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FlowRecord>, ApiError> {
    let service = state.service.lock().await;
    let record = service.get_flow(&id)?;
    Ok(Json(record))
}

/// Replaces a flow definition.
///
/// `PUT /api/flows/{id}`
pub async fn update_flow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(flow): Json<Flow>,
) -> Result<Json<FlowRecord>, ApiError> {
    let mut service = state.service.lock().await;
    let record = service.update_flow(&id, flow)?;
    Ok(Json(record))
}

/// Deletes a flow and its operational records.
///
/// `DELETE /api/flows/{id}`
pub async fn delete_flow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut service = state.service.lock().await;
    service.delete_flow(&id)?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Executes a flow against an instance.
///
/// `POST /api/flows/{id}/execute` — multipart form with `recipient` and
/// `instance_name` fields.
pub async fn execute_flow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<ExecuteResponse>, ApiError> {
    let mut recipient = None;
    let mut instance_name = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("bad multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let value = field
            .text()
            .await
            .map_err(|e| ApiError::BadRequest(format!("bad multipart field: {}", e)))?;
        match name.as_str() {
            "recipient" => recipient = Some(value),
            "instance_name" => instance_name = Some(value),
            _ => {}
        }
    }

    let recipient = recipient
        .filter(|r| !r.is_empty())
        .ok_or_else(|| ApiError::BadRequest("recipient is required".to_string()))?;
    let instance_name = instance_name
        .filter(|i| !i.is_empty())
        .ok_or_else(|| ApiError::BadRequest("instance_name is required".to_string()))?;

    let mut service = state.service.lock().await;
    let execution = executor::run_flow(
        &mut service,
        state.evolution.as_ref(),
        &id,
        &instance_name,
        &recipient,
    )
    .await?;
    Ok(Json(ExecuteResponse {
        success: true,
        execution,
    }))
}
