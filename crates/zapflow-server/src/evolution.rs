//! Evolution API client for WhatsApp instance management and message sending.
//!
//! [`EvolutionClient`] abstracts the upstream HTTP API behind a trait so the
//! flow executor and instance handlers can be exercised in tests without a
//! running Evolution server. [`HttpEvolutionClient`] is the production
//! implementation; tests use [`RecordingEvolutionClient`].

use async_trait::async_trait;
use serde_json::json;

use crate::error::ApiError;

/// Result of creating an instance upstream.
#[derive(Debug, Clone)]
pub struct CreatedInstance {
    pub instance_key: String,
    pub qr_code: Option<String>,
}

/// Client for the Evolution API (WhatsApp gateway).
#[async_trait]
pub trait EvolutionClient: Send + Sync {
    /// Creates a named instance and returns its key and initial QR code.
    async fn create_instance(&self, name: &str) -> Result<CreatedInstance, ApiError>;

    /// Fetches a fresh connection QR code for an instance.
    async fn connect_qr(&self, name: &str) -> Result<String, ApiError>;

    /// Sends a plain text message through an instance.
    async fn send_text(&self, instance: &str, recipient: &str, text: &str)
        -> Result<(), ApiError>;

    /// Sends a media message (image, video, audio or document) with an
    /// optional caption.
    async fn send_media(
        &self,
        instance: &str,
        recipient: &str,
        media_type: &str,
        media_url: &str,
        caption: Option<&str>,
    ) -> Result<(), ApiError>;
}

/// reqwest-backed [`EvolutionClient`] talking to a real Evolution API server.
pub struct HttpEvolutionClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl HttpEvolutionClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        HttpEvolutionClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        let response = self
            .http
            .post(self.endpoint(path))
            .header("apikey", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Upstream(format!("evolution request failed: {}", e)))?;

        let status = response.status();
        let payload: serde_json::Value = response
            .json()
            .await
            .unwrap_or_else(|_| serde_json::Value::Null);
        if !status.is_success() {
            return Err(ApiError::Upstream(format!(
                "evolution returned {}: {}",
                status, payload
            )));
        }
        Ok(payload)
    }
}

#[async_trait]
impl EvolutionClient for HttpEvolutionClient {
    async fn create_instance(&self, name: &str) -> Result<CreatedInstance, ApiError> {
        let payload = self
            .post_json(
                "/instance/create",
                json!({
                    "instanceName": name,
                    "qrcode": true,
                    "integration": "WHATSAPP-BAILEYS",
                }),
            )
            .await?;
        let instance_key = payload["hash"]["apikey"]
            .as_str()
            .or_else(|| payload["hash"].as_str())
            .unwrap_or_default()
            .to_string();
        let qr_code = payload["qrcode"]["base64"].as_str().map(str::to_string);
        Ok(CreatedInstance {
            instance_key,
            qr_code,
        })
    }

    async fn connect_qr(&self, name: &str) -> Result<String, ApiError> {
        let response = self
            .http
            .get(self.endpoint(&format!("/instance/connect/{}", name)))
            .header("apikey", &self.api_key)
            .send()
            .await
            .map_err(|e| ApiError::Upstream(format!("evolution request failed: {}", e)))?;
        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ApiError::Upstream(format!("evolution returned bad payload: {}", e)))?;
        payload["base64"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ApiError::Upstream("evolution returned no QR code".to_string()))
    }

    async fn send_text(
        &self,
        instance: &str,
        recipient: &str,
        text: &str,
    ) -> Result<(), ApiError> {
        self.post_json(
            &format!("/message/sendText/{}", instance),
            json!({
                "number": recipient,
                "text": text,
            }),
        )
        .await?;
        Ok(())
    }

    async fn send_media(
        &self,
        instance: &str,
        recipient: &str,
        media_type: &str,
        media_url: &str,
        caption: Option<&str>,
    ) -> Result<(), ApiError> {
        self.post_json(
            &format!("/message/sendMedia/{}", instance),
            json!({
                "number": recipient,
                "mediatype": media_type,
                "media": media_url,
                "caption": caption.unwrap_or_default(),
            }),
        )
        .await?;
        Ok(())
    }
}

/// Test double that records every send instead of calling upstream.
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    /// One recorded outbound send.
    #[derive(Debug, Clone, PartialEq)]
    pub enum SentPayload {
        Text {
            instance: String,
            recipient: String,
            text: String,
        },
        Media {
            instance: String,
            recipient: String,
            media_type: String,
            media_url: String,
            caption: Option<String>,
        },
    }

    /// In-memory [`EvolutionClient`] for tests. Records sends; optionally
    /// fails every send to exercise abort paths.
    #[derive(Default)]
    pub struct RecordingEvolutionClient {
        pub sent: Mutex<Vec<SentPayload>>,
        pub fail_sends: bool,
    }

    impl RecordingEvolutionClient {
        pub fn new() -> Self {
            RecordingEvolutionClient::default()
        }

        pub fn failing() -> Self {
            RecordingEvolutionClient {
                sent: Mutex::new(Vec::new()),
                fail_sends: true,
            }
        }

        pub fn sent_count(&self) -> usize {
            self.sent.lock().map(|s| s.len()).unwrap_or(0)
        }
    }

    #[async_trait]
    impl EvolutionClient for RecordingEvolutionClient {
        async fn create_instance(&self, _name: &str) -> Result<CreatedInstance, ApiError> {
            Ok(CreatedInstance {
                instance_key: "test-key".to_string(),
                qr_code: Some("data:image/png;base64,QQ==".to_string()),
            })
        }

        async fn connect_qr(&self, _name: &str) -> Result<String, ApiError> {
            Ok("data:image/png;base64,QQ==".to_string())
        }

        async fn send_text(
            &self,
            instance: &str,
            recipient: &str,
            text: &str,
        ) -> Result<(), ApiError> {
            if self.fail_sends {
                return Err(ApiError::Upstream("send failed".to_string()));
            }
            if let Ok(mut sent) = self.sent.lock() {
                sent.push(SentPayload::Text {
                    instance: instance.to_string(),
                    recipient: recipient.to_string(),
                    text: text.to_string(),
                });
            }
            Ok(())
        }

        async fn send_media(
            &self,
            instance: &str,
            recipient: &str,
            media_type: &str,
            media_url: &str,
            caption: Option<&str>,
        ) -> Result<(), ApiError> {
            if self.fail_sends {
                return Err(ApiError::Upstream("send failed".to_string()));
            }
            if let Ok(mut sent) = self.sent.lock() {
                sent.push(SentPayload::Media {
                    instance: instance.to_string(),
                    recipient: recipient.to_string(),
                    media_type: media_type.to_string(),
                    media_url: media_url.to_string(),
                    caption: caption.map(str::to_string),
                });
            }
            Ok(())
        }
    }
}
