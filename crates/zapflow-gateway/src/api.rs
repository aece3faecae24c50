//! reqwest-backed client for the flow API.

use serde::Deserialize;

use zapflow_core::{Flow, FlowDocument};

use crate::error::GatewayError;

/// A flow as returned by the backend, with its server-side timestamps.
#[derive(Debug, Clone, Deserialize)]
pub struct FlowView {
    #[serde(flatten)]
    pub flow: Flow,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

/// The execution summary returned by `POST /flows/{id}/execute`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionView {
    pub id: String,
    #[serde(rename = "flowId")]
    pub flow_id: String,
    pub status: String,
    #[serde(default)]
    pub log: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct FlowListPayload {
    flows: Vec<FlowView>,
}

#[derive(Debug, Deserialize)]
struct ExecutePayload {
    execution: ExecutionView,
}

#[derive(Debug, Deserialize)]
struct UploadPayload {
    base64: String,
    #[serde(rename = "contentType")]
    content_type: String,
}

/// Client for the zapflow backend API.
pub struct FlowApi {
    base: String,
    http: reqwest::Client,
}

impl FlowApi {
    /// Builds a client from `BACKEND_URL` (default `http://localhost:8001`).
    pub fn from_env() -> Self {
        let base_url = std::env::var("BACKEND_URL")
            .unwrap_or_else(|_| "http://localhost:8001".to_string());
        FlowApi::new(&base_url)
    }

    /// Builds a client for a backend at `base_url` (without the `/api`
    /// suffix).
    pub fn new(base_url: &str) -> Self {
        FlowApi {
            base: format!("{}/api", base_url.trim_end_matches('/')),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn decode<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let payload: serde_json::Value = response.json().await.unwrap_or_default();
        let message = payload["error"]["message"]
            .as_str()
            .unwrap_or("unknown error")
            .to_string();
        Err(GatewayError::Api {
            status: status.as_u16(),
            message,
        })
    }

    // -------------------------------------------------------------------
    // Flow CRUD
    // -------------------------------------------------------------------

    pub async fn list(&self) -> Result<Vec<FlowView>, GatewayError> {
        let response = self.http.get(self.url("/flows")).send().await?;
        let payload: FlowListPayload = Self::decode(response).await?;
        Ok(payload.flows)
    }

    pub async fn create(&self, flow: &Flow) -> Result<FlowView, GatewayError> {
        let response = self.http.post(self.url("/flows")).json(flow).send().await?;
        Self::decode(response).await
    }

    pub async fn read(&self, id: &str) -> Result<FlowView, GatewayError> {
        let response = self
            .http
            .get(self.url(&format!("/flows/{id}")))
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn update(&self, id: &str, flow: &Flow) -> Result<FlowView, GatewayError> {
        let response = self
            .http
            .put(self.url(&format!("/flows/{id}")))
            .json(flow)
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), GatewayError> {
        let response = self
            .http
            .delete(self.url(&format!("/flows/{id}")))
            .send()
            .await?;
        Self::decode::<serde_json::Value>(response).await?;
        Ok(())
    }

    /// Saves a document, creating or updating depending on whether it has
    /// been saved before. Local validation runs first: a document with
    /// node-level violations is never sent. On first save the assigned id
    /// is written back into the document.
    pub async fn save(&self, doc: &mut FlowDocument) -> Result<FlowView, GatewayError> {
        let violations = doc.validate();
        if !violations.is_empty() {
            return Err(GatewayError::Validation(violations));
        }
        let flow = doc.serialize();
        let view = match &doc.id {
            Some(id) => {
                tracing::debug!("updating flow {}", id);
                self.update(id, &flow).await?
            }
            None => {
                tracing::debug!("creating flow {:?}", flow.name);
                let view = self.create(&flow).await?;
                doc.id = view.flow.id.clone();
                view
            }
        };
        Ok(view)
    }

    // -------------------------------------------------------------------
    // Execution and upload
    // -------------------------------------------------------------------

    /// Executes a saved flow against an instance.
    ///
    /// Fails with [`GatewayError::Precondition`] before any request is
    /// constructed when the flow has never been saved.
    pub async fn execute(
        &self,
        flow: &Flow,
        instance_name: &str,
        recipient: &str,
    ) -> Result<ExecutionView, GatewayError> {
        let id = flow.id.as_deref().ok_or_else(|| {
            GatewayError::Precondition("flow must be saved before it can be executed".to_string())
        })?;

        let form = reqwest::multipart::Form::new()
            .text("recipient", recipient.to_string())
            .text("instance_name", instance_name.to_string());
        let response = self
            .http
            .post(self.url(&format!("/flows/{id}/execute")))
            .multipart(form)
            .send()
            .await?;
        let payload: ExecutePayload = Self::decode(response).await?;
        Ok(payload.execution)
    }

    /// Uploads a media file and returns a `data:` URI suitable for a media
    /// node's `mediaUrl` field.
    pub async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, GatewayError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| GatewayError::Precondition(format!("bad content type: {}", e)))?;
        let form = reqwest::multipart::Form::new().part("file", part);
        let response = self
            .http
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await?;
        let payload: UploadPayload = Self::decode(response).await?;
        Ok(format!(
            "data:{};base64,{}",
            payload.content_type, payload.base64
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zapflow_core::NodeKind;

    #[tokio::test]
    async fn execute_requires_a_saved_flow() {
        let api = FlowApi::new("http://localhost:9");
        let doc = FlowDocument::new_with_trigger("rascunho");
        let flow = doc.serialize();
        assert!(flow.id.is_none());

        // Fails before any connection attempt: port 9 would error with
        // Network if a request were made.
        let err = api
            .execute(&flow, "vendas", "5511999999999")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Precondition(_)));
    }

    #[tokio::test]
    async fn save_blocks_on_local_violations() {
        let api = FlowApi::new("http://localhost:9");
        let mut doc = FlowDocument::new_with_trigger("rascunho");
        let msg = doc.add_node(NodeKind::Message).id.clone();
        doc.update_node_data(
            &msg,
            serde_json::json!({ "message": 123 })
                .as_object()
                .cloned()
                .unwrap(),
        )
        .unwrap();

        let err = api.save(&mut doc).await.unwrap_err();
        match err {
            GatewayError::Validation(violations) => {
                assert_eq!(violations.len(), 1);
            }
            other => panic!("expected Validation, got {other:?}"),
        }
        assert!(doc.id.is_none());
    }

    #[test]
    fn base_url_gains_api_suffix() {
        let api = FlowApi::new("http://backend:8001/");
        assert_eq!(api.base, "http://backend:8001/api");
    }
}
