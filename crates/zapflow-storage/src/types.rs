//! Storage-layer record types.
//!
//! Flow identity is a storage concern — flows only gain an id when
//! persisted — so the stamped wrapper [`FlowRecord`] lives here rather than
//! in zapflow-core. Execution, message, and log records are what the
//! executor appends; instance records mirror the external account registry;
//! [`AiSettings`] is the singleton settings document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zapflow_core::Flow;

/// A persisted flow with server-side timestamps.
///
/// Flattens the wire [`Flow`] so API responses carry the document fields
/// plus `createdAt`/`updatedAt` at the top level, matching the persisted
/// document format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    #[serde(flatten)]
    pub flow: Flow,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl FlowRecord {
    /// The assigned id. Present by construction for stored records.
    pub fn id(&self) -> &str {
        self.flow.id.as_deref().unwrap_or_default()
    }
}

/// Status of one flow execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Running => "running",
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::Failed => "failed",
        }
    }

    /// Reads a status back from its TEXT column. Unknown values collapse to
    /// `Failed` rather than aborting the whole listing.
    pub fn parse(s: &str) -> Self {
        match s {
            "running" => ExecutionStatus::Running,
            "completed" => ExecutionStatus::Completed,
            _ => ExecutionStatus::Failed,
        }
    }
}

/// One entry in an execution's step log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionLogEntry {
    #[serde(rename = "nodeId", default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(rename = "nodeType", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One recorded flow execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: String,
    #[serde(rename = "flowId")]
    pub flow_id: String,
    pub status: ExecutionStatus,
    #[serde(
        rename = "currentNodeId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub current_node_id: Option<String>,
    #[serde(rename = "startedAt")]
    pub started_at: DateTime<Utc>,
    #[serde(
        rename = "completedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub log: Vec<ExecutionLogEntry>,
}

/// An external messaging-account instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub id: String,
    #[serde(rename = "instanceName")]
    pub instance_name: String,
    #[serde(rename = "instanceKey", default)]
    pub instance_key: String,
    #[serde(rename = "qrCode", default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
    pub status: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// An outbound message recorded by the executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    #[serde(rename = "flowId")]
    pub flow_id: String,
    pub recipient: String,
    #[serde(rename = "messageType")]
    pub message_type: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// A diagnostic log line tied to a flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: String,
    #[serde(rename = "flowId")]
    pub flow_id: String,
    pub level: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// The singleton AI settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSettings {
    #[serde(rename = "defaultPrompt")]
    pub default_prompt: String,
    #[serde(rename = "enableSentimentAnalysis")]
    pub enable_sentiment_analysis: bool,
    #[serde(rename = "enableAutoResponse")]
    pub enable_auto_response: bool,
    #[serde(rename = "confidenceThreshold")]
    pub confidence_threshold: f64,
    #[serde(rename = "maxContextMessages")]
    pub max_context_messages: u32,
    #[serde(rename = "disinterestTriggers", default)]
    pub disinterest_triggers: Vec<String>,
    #[serde(rename = "doubtTriggers", default)]
    pub doubt_triggers: Vec<String>,
    #[serde(
        rename = "openaiApiKey",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub openai_api_key: Option<String>,
}

impl Default for AiSettings {
    fn default() -> Self {
        AiSettings {
            default_prompt:
                "Você é um assistente inteligente em português. Responda de forma útil e amigável."
                    .to_string(),
            enable_sentiment_analysis: true,
            enable_auto_response: true,
            confidence_threshold: 0.5,
            max_context_messages: 5,
            disinterest_triggers: ["não quero", "desistir", "cancelar", "chato", "pare"]
                .map(String::from)
                .to_vec(),
            doubt_triggers: ["dúvida", "não entendi", "confuso", "como", "o que", "por que"]
                .map(String::from)
                .to_vec(),
            openai_api_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_record_flattens_on_the_wire() {
        let record = FlowRecord {
            flow: Flow {
                id: Some("f-1".into()),
                ..Flow::named("Boas-vindas")
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["id"], "f-1");
        assert_eq!(value["name"], "Boas-vindas");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("flow").is_none());
    }

    #[test]
    fn execution_status_wire_names_are_lowercase() {
        assert_eq!(
            serde_json::to_string(&ExecutionStatus::Running).unwrap(),
            "\"running\""
        );
        assert_eq!(
            serde_json::to_string(&ExecutionStatus::Failed).unwrap(),
            "\"failed\""
        );
    }

    #[test]
    fn ai_settings_defaults_match_the_editor_seed() {
        let settings = AiSettings::default();
        assert!(settings.enable_sentiment_analysis);
        assert_eq!(settings.confidence_threshold, 0.5);
        assert_eq!(settings.max_context_messages, 5);
        assert!(settings.disinterest_triggers.contains(&"cancelar".to_string()));
        assert!(settings.doubt_triggers.contains(&"dúvida".to_string()));
    }
}
