//! FlowService: the single coordinator between HTTP handlers and the
//! core/storage crates.
//!
//! All business logic flows through [`FlowService`]. Handlers are thin
//! wrappers that delegate to these methods.

use chrono::Utc;
use uuid::Uuid;

use zapflow_core::{Flow, FlowDocument};
use zapflow_storage::{
    AiSettings, ExecutionRecord, FlowRecord, FlowStore, InMemoryStore, InstanceRecord, LogRecord,
    MessageRecord, SqliteStore,
};

use crate::error::ApiError;
use crate::evolution::CreatedInstance;

/// The central service coordinating flow CRUD, execution records,
/// instance registry, and AI settings.
pub struct FlowService {
    store: Box<dyn FlowStore + Send>,
}

impl FlowService {
    /// Creates a `FlowService` backed by a SQLite database at `db_path`.
    pub fn new(db_path: &str) -> Result<Self, ApiError> {
        let store = SqliteStore::new(db_path)
            .map_err(|e| ApiError::InternalError(format!("failed to open database: {}", e)))?;
        Ok(FlowService {
            store: Box::new(store),
        })
    }

    /// Creates a `FlowService` with an in-memory store (for testing).
    pub fn in_memory() -> Self {
        FlowService {
            store: Box::new(InMemoryStore::new()),
        }
    }

    // -------------------------------------------------------------------
    // Flow CRUD
    // -------------------------------------------------------------------

    pub fn list_flows(&self) -> Result<Vec<FlowRecord>, ApiError> {
        Ok(self.store.list_flows()?)
    }

    /// Creates a flow. Graph integrity failures map to 400; node data
    /// failing field validation is rejected with 422 and the per-node
    /// violations.
    pub fn create_flow(&mut self, flow: Flow) -> Result<FlowRecord, ApiError> {
        Self::check_flow(&flow)?;
        Ok(self.store.create_flow(flow)?)
    }

    pub fn get_flow(&self, id: &str) -> Result<FlowRecord, ApiError> {
        Ok(self.store.get_flow(id)?)
    }

    pub fn update_flow(&mut self, id: &str, flow: Flow) -> Result<FlowRecord, ApiError> {
        Self::check_flow(&flow)?;
        Ok(self.store.update_flow(id, flow)?)
    }

    fn check_flow(flow: &Flow) -> Result<(), ApiError> {
        let doc = FlowDocument::deserialize(flow.clone())?;
        let violations = doc.validate();
        if !violations.is_empty() {
            return Err(ApiError::ValidationFailed(violations));
        }
        Ok(())
    }

    pub fn delete_flow(&mut self, id: &str) -> Result<(), ApiError> {
        Ok(self.store.delete_flow(id)?)
    }

    /// Loads a flow into a [`FlowDocument`] ready for execution. Inactive
    /// flows are rejected; node data was already validated at save time.
    pub fn executable_document(&self, id: &str) -> Result<FlowDocument, ApiError> {
        let record = self.store.get_flow(id)?;
        if !record.flow.is_active {
            return Err(ApiError::BadRequest(format!(
                "flow {} is not active",
                id
            )));
        }
        Ok(FlowDocument::deserialize(record.flow)?)
    }

    // -------------------------------------------------------------------
    // Operational records
    // -------------------------------------------------------------------

    pub fn record_execution(&mut self, execution: &ExecutionRecord) -> Result<(), ApiError> {
        Ok(self.store.insert_execution(execution)?)
    }

    pub fn list_executions(&self, flow_id: &str) -> Result<Vec<ExecutionRecord>, ApiError> {
        self.store.get_flow(flow_id)?;
        Ok(self.store.list_executions(flow_id)?)
    }

    pub fn record_message(&mut self, message: &MessageRecord) -> Result<(), ApiError> {
        Ok(self.store.append_message(message)?)
    }

    pub fn list_messages(&self, flow_id: &str) -> Result<Vec<MessageRecord>, ApiError> {
        self.store.get_flow(flow_id)?;
        Ok(self.store.list_messages(flow_id)?)
    }

    pub fn record_log(&mut self, flow_id: &str, level: &str, message: &str) -> Result<(), ApiError> {
        let log = LogRecord {
            id: Uuid::new_v4().to_string(),
            flow_id: flow_id.to_string(),
            level: level.to_string(),
            message: message.to_string(),
            timestamp: Utc::now(),
        };
        Ok(self.store.append_log(&log)?)
    }

    pub fn list_logs(&self, flow_id: &str) -> Result<Vec<LogRecord>, ApiError> {
        self.store.get_flow(flow_id)?;
        Ok(self.store.list_logs(flow_id)?)
    }

    // -------------------------------------------------------------------
    // Instances
    // -------------------------------------------------------------------

    /// Registers an instance created upstream. Instance names are unique.
    pub fn register_instance(
        &mut self,
        name: &str,
        created: &CreatedInstance,
    ) -> Result<InstanceRecord, ApiError> {
        let exists = self
            .store
            .list_instances()?
            .iter()
            .any(|i| i.instance_name == name);
        if exists {
            return Err(ApiError::Conflict(format!(
                "instance {} already exists",
                name
            )));
        }
        let record = InstanceRecord {
            id: Uuid::new_v4().to_string(),
            instance_name: name.to_string(),
            instance_key: created.instance_key.clone(),
            qr_code: created.qr_code.clone(),
            status: "created".to_string(),
            created_at: Utc::now(),
        };
        self.store.insert_instance(&record)?;
        Ok(record)
    }

    pub fn list_instances(&self) -> Result<Vec<InstanceRecord>, ApiError> {
        Ok(self.store.list_instances()?)
    }

    pub fn set_instance_status(&mut self, name: &str, status: &str) -> Result<(), ApiError> {
        Ok(self.store.update_instance_status(name, status)?)
    }

    pub fn set_instance_qr(&mut self, name: &str, qr_code: &str) -> Result<(), ApiError> {
        Ok(self.store.update_instance_qr(name, qr_code)?)
    }

    // -------------------------------------------------------------------
    // AI settings
    // -------------------------------------------------------------------

    pub fn ai_settings(&self) -> Result<AiSettings, ApiError> {
        Ok(self.store.get_ai_settings()?)
    }

    /// Persists AI settings after range checks on the tunable fields.
    pub fn save_ai_settings(&mut self, settings: AiSettings) -> Result<AiSettings, ApiError> {
        if !(0.0..=1.0).contains(&settings.confidence_threshold) {
            return Err(ApiError::BadRequest(format!(
                "confidenceThreshold must be between 0 and 1, got {}",
                settings.confidence_threshold
            )));
        }
        if !(1..=20).contains(&settings.max_context_messages) {
            return Err(ApiError::BadRequest(format!(
                "maxContextMessages must be between 1 and 20, got {}",
                settings.max_context_messages
            )));
        }
        self.store.put_ai_settings(&settings)?;
        Ok(settings)
    }
}
