//! Integration tests for the flow API over the full router.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::json;
use tower::ServiceExt;

use zapflow_core::{FlowDocument, NodeKind};
use zapflow_server::evolution::testing::RecordingEvolutionClient;
use zapflow_server::router::build_router;
use zapflow_server::state::AppState;

fn test_app() -> Router {
    let state = AppState::in_memory(Arc::new(RecordingEvolutionClient::new()));
    build_router(state)
}

async fn request_json(
    app: &Router,
    method: Method,
    path: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(path);

    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&v).unwrap())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(json!(null));
    (status, json)
}

async fn post_json(
    app: &Router,
    path: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    request_json(app, Method::POST, path, Some(body)).await
}

async fn get_json(app: &Router, path: &str) -> (StatusCode, serde_json::Value) {
    request_json(app, Method::GET, path, None).await
}

/// Builds a multipart/form-data body with text fields.
fn multipart_fields(boundary: &str, fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\ncontent-disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

async fn post_multipart(
    app: &Router,
    path: &str,
    body: Vec<u8>,
    boundary: &str,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(json!(null));
    (status, json)
}

fn sample_flow(active: bool) -> serde_json::Value {
    let mut doc = FlowDocument::new_with_trigger("Atendimento");
    let msg = doc.add_node(NodeKind::Message).id.clone();
    doc.connect("trigger-1", &msg, None).unwrap();
    let mut flow = doc.serialize();
    flow.is_active = active;
    serde_json::to_value(&flow).unwrap()
}

async fn create_flow(app: &Router, flow: serde_json::Value) -> String {
    let (status, body) = post_json(app, "/api/flows", flow).await;
    assert_eq!(status, StatusCode::OK, "create flow failed: {body:?}");
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn flow_crud_round_trip() {
    let app = test_app();
    let id = create_flow(&app, sample_flow(false)).await;

    let (status, body) = get_json(&app, &format!("/api/flows/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Atendimento");
    assert_eq!(body["nodes"].as_array().unwrap().len(), 2);
    assert!(body["createdAt"].is_string());

    let mut updated = sample_flow(true);
    updated["name"] = json!("Atendimento v2");
    let (status, body) = request_json(
        &app,
        Method::PUT,
        &format!("/api/flows/{id}"),
        Some(updated),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Atendimento v2");
    assert_eq!(body["isActive"], json!(true));

    let (status, body) = get_json(&app, "/api/flows").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["flows"].as_array().unwrap().len(), 1);

    let (status, _) = request_json(&app, Method::DELETE, &format!("/api/flows/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get_json(&app, &format!("/api/flows/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_with_dangling_edge_is_rejected() {
    let app = test_app();
    let mut flow = sample_flow(false);
    flow["edges"][0]["target"] = json!("ghost");
    let (status, body) = post_json(&app, "/api/flows", flow).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn create_with_invalid_node_data_returns_violations() {
    let app = test_app();
    let mut flow = sample_flow(false);
    flow["nodes"][1]["data"]["message"] = json!(123);
    let (status, body) = post_json(&app, "/api/flows", flow).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_FAILED");
    let details = body["error"]["details"].as_array().unwrap();
    assert_eq!(details[0]["violations"][0]["field"], "message");
}

#[tokio::test]
async fn execute_runs_and_records() {
    let app = test_app();
    let id = create_flow(&app, sample_flow(true)).await;

    let boundary = "zflowtest";
    let body = multipart_fields(
        boundary,
        &[("recipient", "5511999999999"), ("instance_name", "vendas")],
    );
    let (status, response) =
        post_multipart(&app, &format!("/api/flows/{id}/execute"), body, boundary).await;
    assert_eq!(status, StatusCode::OK, "execute failed: {response:?}");
    assert_eq!(response["success"], json!(true));
    assert_eq!(response["execution"]["status"], "completed");

    let (status, body) = get_json(&app, &format!("/api/flows/{id}/executions")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["executions"].as_array().unwrap().len(), 1);

    let (_, body) = get_json(&app, &format!("/api/flows/{id}/messages")).await;
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    assert_eq!(body["messages"][0]["recipient"], "5511999999999");

    let (_, body) = get_json(&app, &format!("/api/flows/{id}/logs")).await;
    assert!(!body["logs"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn execute_inactive_flow_is_rejected() {
    let app = test_app();
    let id = create_flow(&app, sample_flow(false)).await;

    let boundary = "zflowtest";
    let body = multipart_fields(
        boundary,
        &[("recipient", "5511999999999"), ("instance_name", "vendas")],
    );
    let (status, body) =
        post_multipart(&app, &format!("/api/flows/{id}/execute"), body, boundary).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn execute_unknown_flow_is_404() {
    let app = test_app();
    let boundary = "zflowtest";
    let body = multipart_fields(
        boundary,
        &[("recipient", "5511999999999"), ("instance_name", "vendas")],
    );
    let (status, _) = post_multipart(&app, "/api/flows/ghost/execute", body, boundary).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn execute_requires_recipient() {
    let app = test_app();
    let id = create_flow(&app, sample_flow(true)).await;

    let boundary = "zflowtest";
    let body = multipart_fields(boundary, &[("instance_name", "vendas")]);
    let (status, body) =
        post_multipart(&app, &format!("/api/flows/{id}/execute"), body, boundary).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body:?}");
}

#[tokio::test]
async fn instance_lifecycle_and_webhook() {
    let app = test_app();

    let boundary = "zflowinstance";
    let form = multipart_fields(boundary, &[("instance_name", "vendas-01")]);
    let (status, body) =
        post_multipart(&app, "/api/evolution/instances", form, boundary).await;
    assert_eq!(status, StatusCode::OK, "{body:?}");
    assert_eq!(body["instanceName"], "vendas-01");
    assert_eq!(body["status"], "created");

    // duplicate name conflicts
    let form = multipart_fields(boundary, &[("instance_name", "vendas-01")]);
    let (status, _) = post_multipart(&app, "/api/evolution/instances", form, boundary).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = get_json(&app, "/api/evolution/instances/vendas-01/qr").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["qrCode"].as_str().unwrap().starts_with("data:image"));

    let (status, _) = post_json(
        &app,
        "/api/evolution/webhook",
        json!({
            "type": "connection.update",
            "instance": "vendas-01",
            "data": { "state": "open" }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get_json(&app, "/api/evolution/instances").await;
    assert_eq!(body["instances"][0]["status"], "open");

    // unknown instances are acknowledged without effect
    let (status, _) = post_json(
        &app,
        "/api/evolution/webhook",
        json!({
            "type": "qrcode.updated",
            "instance": "ghost",
            "data": { "qrcode": { "base64": "QQ==" } }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn ai_settings_defaults_and_validation() {
    let app = test_app();

    let (status, body) = get_json(&app, "/api/ai/settings").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["confidenceThreshold"], json!(0.5));
    assert_eq!(body["maxContextMessages"], json!(5));
    assert!(body["disinterestTriggers"]
        .as_array()
        .unwrap()
        .contains(&json!("cancelar")));

    let mut settings = body.clone();
    settings["confidenceThreshold"] = json!(2.0);
    let (status, _) = post_json(&app, "/api/ai/settings", settings).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut settings = body;
    settings["confidenceThreshold"] = json!(0.8);
    settings["maxContextMessages"] = json!(10);
    let (status, saved) = post_json(&app, "/api/ai/settings", settings).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["maxContextMessages"], json!(10));

    let (_, body) = get_json(&app, "/api/ai/settings").await;
    assert_eq!(body["confidenceThreshold"], json!(0.8));
}

#[tokio::test]
async fn upload_returns_base64() {
    let app = test_app();

    let boundary = "zflowupload";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\ncontent-disposition: form-data; name=\"file\"; filename=\"logo.png\"\r\ncontent-type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"fake png bytes");
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let (status, response) = post_multipart(&app, "/api/upload", body, boundary).await;
    assert_eq!(status, StatusCode::OK, "{response:?}");
    assert_eq!(response["filename"], "logo.png");
    assert_eq!(response["contentType"], "image/png");
    assert_eq!(response["size"], json!(14));

    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    let decoded = STANDARD
        .decode(response["base64"].as_str().unwrap())
        .unwrap();
    assert_eq!(decoded, b"fake png bytes");
}
