//! Evolution instance management and webhook handlers.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use zapflow_storage::InstanceRecord;

use crate::error::ApiError;
use crate::schema::instances::{InstanceListResponse, QrResponse, WebhookEvent};
use crate::state::AppState;

/// `GET /api/evolution/instances`
pub async fn list_instances(
    State(state): State<AppState>,
) -> Result<Json<InstanceListResponse>, ApiError> {
    let service = state.service.lock().await;
    let instances = service.list_instances()?;
    Ok(Json(InstanceListResponse { instances }))
}

/// Creates an instance upstream and registers it locally.
///
/// `POST /api/evolution/instances` — multipart form with an
/// `instance_name` field.
pub async fn create_instance(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<InstanceRecord>, ApiError> {
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
        if name == "instance_name" {
            instance_name = Some(value);
        }
    }

    let instance_name = instance_name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("instance_name is required".to_string()))?;

    let created = state.evolution.create_instance(&instance_name).await?;
    let mut service = state.service.lock().await;
    let record = service.register_instance(&instance_name, &created)?;
    Ok(Json(record))
}

/// Fetches a fresh connection QR code and stores it.
///
/// `GET /api/evolution/instances/{name}/qr`
pub async fn instance_qr(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<QrResponse>, ApiError> {
    let qr_code = state.evolution.connect_qr(&name).await?;
    let mut service = state.service.lock().await;
    service.set_instance_qr(&name, &qr_code)?;
    service.set_instance_status(&name, "connecting")?;
    Ok(Json(QrResponse {
        instance_name: name,
        qr_code,
    }))
}

/// Receives Evolution webhook events.
///
/// `POST /api/evolution/webhook` — `qrcode.updated` refreshes the stored
/// QR code; `connection.update` refreshes the instance status. Unknown
/// events and unknown instances are acknowledged without effect.
pub async fn webhook(
    State(state): State<AppState>,
    Json(event): Json<WebhookEvent>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut service = state.service.lock().await;
    match event.event.as_str() {
        "qrcode.updated" => {
            if let Some(base64) = event.data["qrcode"]["base64"].as_str() {
                if let Err(err) = service.set_instance_qr(&event.instance, base64) {
                    tracing::warn!("webhook qr update for {} dropped: {}", event.instance, err);
                }
            }
        }
        "connection.update" => {
            if let Some(status) = event.data["state"].as_str() {
                if let Err(err) = service.set_instance_status(&event.instance, status) {
                    tracing::warn!(
                        "webhook status update for {} dropped: {}",
                        event.instance,
                        err
                    );
                }
            }
        }
        other => {
            tracing::debug!("ignoring webhook event {}", other);
        }
    }
    Ok(Json(serde_json::json!({ "success": true })))
}
