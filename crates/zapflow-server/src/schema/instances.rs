//! Evolution instance endpoint payloads.

use serde::{Deserialize, Serialize};
use zapflow_storage::InstanceRecord;

#[derive(Debug, Serialize)]
pub struct InstanceListResponse {
    pub instances: Vec<InstanceRecord>,
}

#[derive(Debug, Serialize)]
pub struct QrResponse {
    #[serde(rename = "instanceName")]
    pub instance_name: String,
    #[serde(rename = "qrCode")]
    pub qr_code: String,
}

/// Webhook event pushed by the Evolution API. The discriminator arrives
/// under the `type` key. Only `qrcode.updated` and `connection.update` are
/// acted upon; other events are acknowledged and dropped.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event: String,
    pub instance: String,
    #[serde(default)]
    pub data: serde_json::Value,
}
