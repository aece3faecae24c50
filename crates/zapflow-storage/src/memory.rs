//! In-memory implementation of [`FlowStore`].
//!
//! [`InMemoryStore`] is a first-class backend for tests and ephemeral
//! sessions. It stores records in insertion-ordered structures with
//! identical semantics to the SQLite backend.

use chrono::Utc;
use uuid::Uuid;
use zapflow_core::Flow;

use crate::error::StorageError;
use crate::traits::FlowStore;
use crate::types::{
    AiSettings, ExecutionRecord, FlowRecord, InstanceRecord, LogRecord, MessageRecord,
};

/// HashMap-free, insertion-ordered in-memory backend.
///
/// Plain vectors keep listing order identical to SQLite's
/// `ORDER BY created_at` without a second index; the store sizes involved
/// (one operator's flows) never justify more.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    flows: Vec<FlowRecord>,
    executions: Vec<ExecutionRecord>,
    messages: Vec<MessageRecord>,
    logs: Vec<LogRecord>,
    instances: Vec<InstanceRecord>,
    ai_settings: Option<AiSettings>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore::default()
    }

    fn flow_index(&self, id: &str) -> Result<usize, StorageError> {
        self.flows
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| StorageError::FlowNotFound(id.into()))
    }

    fn instance_mut(&mut self, name: &str) -> Result<&mut InstanceRecord, StorageError> {
        self.instances
            .iter_mut()
            .find(|i| i.instance_name == name)
            .ok_or_else(|| StorageError::InstanceNotFound(name.into()))
    }
}

impl FlowStore for InMemoryStore {
    fn create_flow(&mut self, mut flow: Flow) -> Result<FlowRecord, StorageError> {
        flow.id = Some(Uuid::new_v4().to_string());
        let now = Utc::now();
        let record = FlowRecord {
            flow,
            created_at: now,
            updated_at: now,
        };
        self.flows.push(record.clone());
        Ok(record)
    }

    fn get_flow(&self, id: &str) -> Result<FlowRecord, StorageError> {
        let idx = self.flow_index(id)?;
        Ok(self.flows[idx].clone())
    }

    fn update_flow(&mut self, id: &str, mut flow: Flow) -> Result<FlowRecord, StorageError> {
        let idx = self.flow_index(id)?;
        flow.id = Some(id.to_string());
        let record = FlowRecord {
            flow,
            created_at: self.flows[idx].created_at,
            updated_at: Utc::now(),
        };
        self.flows[idx] = record.clone();
        Ok(record)
    }

    fn delete_flow(&mut self, id: &str) -> Result<(), StorageError> {
        let idx = self.flow_index(id)?;
        self.flows.remove(idx);
        self.executions.retain(|e| e.flow_id != id);
        self.messages.retain(|m| m.flow_id != id);
        self.logs.retain(|l| l.flow_id != id);
        Ok(())
    }

    fn list_flows(&self) -> Result<Vec<FlowRecord>, StorageError> {
        Ok(self.flows.clone())
    }

    fn insert_execution(&mut self, execution: &ExecutionRecord) -> Result<(), StorageError> {
        self.executions.push(execution.clone());
        Ok(())
    }

    fn list_executions(&self, flow_id: &str) -> Result<Vec<ExecutionRecord>, StorageError> {
        Ok(self
            .executions
            .iter()
            .filter(|e| e.flow_id == flow_id)
            .cloned()
            .collect())
    }

    fn append_message(&mut self, message: &MessageRecord) -> Result<(), StorageError> {
        self.messages.push(message.clone());
        Ok(())
    }

    fn list_messages(&self, flow_id: &str) -> Result<Vec<MessageRecord>, StorageError> {
        Ok(self
            .messages
            .iter()
            .filter(|m| m.flow_id == flow_id)
            .cloned()
            .collect())
    }

    fn append_log(&mut self, log: &LogRecord) -> Result<(), StorageError> {
        self.logs.push(log.clone());
        Ok(())
    }

    fn list_logs(&self, flow_id: &str) -> Result<Vec<LogRecord>, StorageError> {
        Ok(self
            .logs
            .iter()
            .filter(|l| l.flow_id == flow_id)
            .cloned()
            .collect())
    }

    fn insert_instance(&mut self, instance: &InstanceRecord) -> Result<(), StorageError> {
        self.instances.push(instance.clone());
        Ok(())
    }

    fn list_instances(&self) -> Result<Vec<InstanceRecord>, StorageError> {
        Ok(self.instances.clone())
    }

    fn update_instance_status(&mut self, name: &str, status: &str) -> Result<(), StorageError> {
        self.instance_mut(name)?.status = status.to_string();
        Ok(())
    }

    fn update_instance_qr(&mut self, name: &str, qr_code: &str) -> Result<(), StorageError> {
        self.instance_mut(name)?.qr_code = Some(qr_code.to_string());
        Ok(())
    }

    fn get_ai_settings(&self) -> Result<AiSettings, StorageError> {
        Ok(self.ai_settings.clone().unwrap_or_default())
    }

    fn put_ai_settings(&mut self, settings: &AiSettings) -> Result<(), StorageError> {
        self.ai_settings = Some(settings.clone());
        Ok(())
    }
}
