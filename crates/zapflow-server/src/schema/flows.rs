//! Flow endpoint payloads.

use serde::Serialize;
use zapflow_storage::{ExecutionRecord, FlowRecord, LogRecord, MessageRecord};

#[derive(Debug, Serialize)]
pub struct FlowListResponse {
    pub flows: Vec<FlowRecord>,
}

#[derive(Debug, Serialize)]
pub struct ExecuteResponse {
    pub success: bool,
    pub execution: ExecutionRecord,
}

#[derive(Debug, Serialize)]
pub struct ExecutionListResponse {
    pub executions: Vec<ExecutionRecord>,
}

#[derive(Debug, Serialize)]
pub struct LogListResponse {
    pub logs: Vec<LogRecord>,
}

#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<MessageRecord>,
}
