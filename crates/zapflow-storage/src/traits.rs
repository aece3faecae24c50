//! The [`FlowStore`] trait defining the storage contract for flows.
//!
//! All backends (InMemoryStore, SqliteStore) implement this trait, keeping
//! them fully swappable without changing service logic. The trait is
//! synchronous; the HTTP layer serializes access behind an async mutex.
//!
//! No component reaches storage except through this contract.

use zapflow_core::Flow;

use crate::error::StorageError;
use crate::types::{
    AiSettings, ExecutionRecord, FlowRecord, InstanceRecord, LogRecord, MessageRecord,
};

/// The storage contract for flow documents and their operational records.
pub trait FlowStore {
    // -------------------------------------------------------------------
    // Flow CRUD
    // -------------------------------------------------------------------

    /// Persists a new flow, assigning it a fresh id and timestamps.
    ///
    /// Any id already present on `flow` is ignored: identity is minted by
    /// the store.
    fn create_flow(&mut self, flow: Flow) -> Result<FlowRecord, StorageError>;

    /// Loads a flow by id.
    fn get_flow(&self, id: &str) -> Result<FlowRecord, StorageError>;

    /// Overwrites a stored flow wholesale (last update wins; there is no
    /// concurrency control between editing sessions). Refreshes
    /// `updated_at`.
    fn update_flow(&mut self, id: &str, flow: Flow) -> Result<FlowRecord, StorageError>;

    /// Deletes a flow and its execution/message/log records.
    fn delete_flow(&mut self, id: &str) -> Result<(), StorageError>;

    /// Lists all flows in creation order.
    fn list_flows(&self) -> Result<Vec<FlowRecord>, StorageError>;

    // -------------------------------------------------------------------
    // Execution records
    // -------------------------------------------------------------------

    /// Appends a completed execution record.
    fn insert_execution(&mut self, execution: &ExecutionRecord) -> Result<(), StorageError>;

    /// Lists executions of one flow, oldest first.
    fn list_executions(&self, flow_id: &str) -> Result<Vec<ExecutionRecord>, StorageError>;

    // -------------------------------------------------------------------
    // Message / log records
    // -------------------------------------------------------------------

    /// Appends an outbound message record.
    fn append_message(&mut self, message: &MessageRecord) -> Result<(), StorageError>;

    /// Lists messages sent by one flow, oldest first.
    fn list_messages(&self, flow_id: &str) -> Result<Vec<MessageRecord>, StorageError>;

    /// Appends a diagnostic log line.
    fn append_log(&mut self, log: &LogRecord) -> Result<(), StorageError>;

    /// Lists log lines of one flow, oldest first.
    fn list_logs(&self, flow_id: &str) -> Result<Vec<LogRecord>, StorageError>;

    // -------------------------------------------------------------------
    // Instance registry
    // -------------------------------------------------------------------

    /// Registers a messaging-account instance.
    fn insert_instance(&mut self, instance: &InstanceRecord) -> Result<(), StorageError>;

    /// Lists all registered instances.
    fn list_instances(&self) -> Result<Vec<InstanceRecord>, StorageError>;

    /// Updates an instance's connection status (webhook `connection.update`).
    fn update_instance_status(&mut self, name: &str, status: &str) -> Result<(), StorageError>;

    /// Updates an instance's cached QR code (webhook `qrcode.updated`).
    fn update_instance_qr(&mut self, name: &str, qr_code: &str) -> Result<(), StorageError>;

    // -------------------------------------------------------------------
    // AI settings (singleton)
    // -------------------------------------------------------------------

    /// Loads the AI settings, falling back to defaults when never saved.
    fn get_ai_settings(&self) -> Result<AiSettings, StorageError>;

    /// Replaces the AI settings.
    fn put_ai_settings(&mut self, settings: &AiSettings) -> Result<(), StorageError>;
}
