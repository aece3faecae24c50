//! Sequential flow executor.
//!
//! Walks the execution order from the trigger node and dispatches one
//! action per node: text and media sends go through the
//! [`EvolutionClient`]; delay, AI, and conditional steps are recorded in
//! the execution log without side effects (delays and conversational
//! branching belong to the external runtime, not to a test run). The
//! first failed send aborts the run and marks the execution failed.

use chrono::Utc;
use uuid::Uuid;

use zapflow_core::topology::execution_order;
use zapflow_core::{Node, NodeData, NodeKind};
use zapflow_storage::{ExecutionLogEntry, ExecutionRecord, ExecutionStatus, MessageRecord};

use crate::error::ApiError;
use crate::evolution::EvolutionClient;
use crate::service::FlowService;

/// Runs a flow against an instance and persists the execution record.
///
/// The flow must exist and be active; the caller resolves those errors
/// before any execution state is created.
pub async fn run_flow(
    service: &mut FlowService,
    evolution: &dyn EvolutionClient,
    flow_id: &str,
    instance: &str,
    recipient: &str,
) -> Result<ExecutionRecord, ApiError> {
    let doc = service.executable_document(flow_id)?;
    let order = execution_order(&doc)?;

    let mut record = ExecutionRecord {
        id: Uuid::new_v4().to_string(),
        flow_id: flow_id.to_string(),
        status: ExecutionStatus::Running,
        current_node_id: None,
        started_at: Utc::now(),
        completed_at: None,
        log: Vec::new(),
    };

    service.record_log(flow_id, "info", &format!("execution {} started", record.id))?;

    for node_id in &order {
        let node = match doc.node(node_id) {
            Some(node) => node.clone(),
            None => continue,
        };
        record.current_node_id = Some(node.id.clone());

        match run_node(service, evolution, &node, flow_id, instance, recipient).await {
            Ok(detail) => {
                record.log.push(ExecutionLogEntry {
                    node_id: Some(node.id.clone()),
                    node_type: Some(node.kind.to_string()),
                    timestamp: Utc::now(),
                    status: detail,
                    error: None,
                });
            }
            Err(err) => {
                let message = err.to_string();
                record.log.push(ExecutionLogEntry {
                    node_id: Some(node.id.clone()),
                    node_type: Some(node.kind.to_string()),
                    timestamp: Utc::now(),
                    status: "failed".to_string(),
                    error: Some(message.clone()),
                });
                record.status = ExecutionStatus::Failed;
                record.completed_at = Some(Utc::now());
                service.record_log(
                    flow_id,
                    "error",
                    &format!("execution {} failed at {}: {}", record.id, node.id, message),
                )?;
                service.record_execution(&record)?;
                return Ok(record);
            }
        }
    }

    record.status = ExecutionStatus::Completed;
    record.current_node_id = None;
    record.completed_at = Some(Utc::now());
    service.record_log(flow_id, "info", &format!("execution {} completed", record.id))?;
    service.record_execution(&record)?;
    Ok(record)
}

async fn run_node(
    service: &mut FlowService,
    evolution: &dyn EvolutionClient,
    node: &Node,
    flow_id: &str,
    instance: &str,
    recipient: &str,
) -> Result<String, ApiError> {
    match node.kind {
        NodeKind::Trigger => Ok("triggered".to_string()),
        NodeKind::Message => {
            let text = text_field(&node.data, "message").unwrap_or_default();
            evolution.send_text(instance, recipient, text).await?;
            service.record_message(&MessageRecord {
                id: Uuid::new_v4().to_string(),
                flow_id: flow_id.to_string(),
                recipient: recipient.to_string(),
                message_type: "text".to_string(),
                content: text.to_string(),
                timestamp: Utc::now(),
            })?;
            Ok("sent".to_string())
        }
        NodeKind::Media => {
            let media_type = text_field(&node.data, "mediaType").unwrap_or("image");
            let media_url = text_field(&node.data, "mediaUrl").unwrap_or_default();
            let caption = text_field(&node.data, "caption");
            evolution
                .send_media(instance, recipient, media_type, media_url, caption)
                .await?;
            service.record_message(&MessageRecord {
                id: Uuid::new_v4().to_string(),
                flow_id: flow_id.to_string(),
                recipient: recipient.to_string(),
                message_type: media_type.to_string(),
                content: media_url.to_string(),
                timestamp: Utc::now(),
            })?;
            Ok("sent".to_string())
        }
        NodeKind::Delay => {
            // Recorded, never slept: delays run in the external runtime.
            let seconds = node
                .data
                .get("seconds")
                .and_then(serde_json::Value::as_i64)
                .unwrap_or(0);
            Ok(format!("delay {}s recorded", seconds))
        }
        NodeKind::Ai => Ok("ai step recorded".to_string()),
        NodeKind::Conditional => Ok("branch recorded".to_string()),
    }
}

fn text_field<'a>(data: &'a NodeData, key: &str) -> Option<&'a str> {
    data.get(key).and_then(serde_json::Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolution::testing::{RecordingEvolutionClient, SentPayload};
    use zapflow_core::FlowDocument;

    fn seeded_service(active: bool) -> (FlowService, String) {
        let mut svc = FlowService::in_memory();
        let mut doc = FlowDocument::new_with_trigger("Atendimento");
        let msg = doc.add_node(NodeKind::Message).id.clone();
        let delay = doc.add_node(NodeKind::Delay).id.clone();
        doc.connect("trigger-1", &msg, None).unwrap();
        doc.connect(&msg, &delay, None).unwrap();
        let mut flow = doc.serialize();
        flow.is_active = active;
        let record = svc.create_flow(flow).unwrap();
        let id = record.id().to_string();
        (svc, id)
    }

    #[tokio::test]
    async fn completed_run_sends_and_records() {
        let (mut svc, id) = seeded_service(true);
        let client = RecordingEvolutionClient::new();

        let record = run_flow(&mut svc, &client, &id, "vendas", "5511999999999")
            .await
            .unwrap();

        assert_eq!(record.status, ExecutionStatus::Completed);
        assert_eq!(record.log.len(), 3);
        assert!(record.completed_at.is_some());
        assert_eq!(client.sent_count(), 1);
        assert!(matches!(
            &client.sent.lock().unwrap()[0],
            SentPayload::Text { recipient, .. } if recipient == "5511999999999"
        ));

        assert_eq!(svc.list_executions(&id).unwrap().len(), 1);
        assert_eq!(svc.list_messages(&id).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_send_aborts_run() {
        let (mut svc, id) = seeded_service(true);
        let client = RecordingEvolutionClient::failing();

        let record = run_flow(&mut svc, &client, &id, "vendas", "5511999999999")
            .await
            .unwrap();

        assert_eq!(record.status, ExecutionStatus::Failed);
        // trigger step succeeded, message step failed, delay never ran
        assert_eq!(record.log.len(), 2);
        assert!(record.log[1].error.is_some());
        assert_eq!(record.current_node_id.as_deref(), Some("message-2"));
        assert!(svc.list_messages(&id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn inactive_flow_is_rejected() {
        let (mut svc, id) = seeded_service(false);
        let client = RecordingEvolutionClient::new();

        let err = run_flow(&mut svc, &client, &id, "vendas", "5511999999999")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert!(svc.list_executions(&id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn flow_without_trigger_is_rejected() {
        let mut svc = FlowService::in_memory();
        let mut doc = FlowDocument::new("vazio");
        doc.add_node(NodeKind::Message);
        let mut flow = doc.serialize();
        flow.is_active = true;
        let record = svc.create_flow(flow).unwrap();
        let id = record.id().to_string();

        let client = RecordingEvolutionClient::new();
        let err = run_flow(&mut svc, &client, &id, "vendas", "5511999999999")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
