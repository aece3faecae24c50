//! Storage abstraction for zapflow flow documents.
//!
//! Provides the [`FlowStore`] trait defining the storage contract that all
//! backends implement, plus [`InMemoryStore`] and [`SqliteStore`] as
//! first-class backends.
//!
//! Flow ids are server-assigned UUID strings minted on create; a flow has
//! no id until it is persisted. Alongside flows the store keeps the
//! execution, message, and log records the executor appends, the
//! messaging-account instance registry, and the singleton AI settings.
//!
//! # Modules
//!
//! - [`error`]: StorageError enum with all failure modes
//! - [`types`]: FlowRecord, ExecutionRecord, InstanceRecord, AiSettings
//! - [`traits`]: FlowStore trait definition
//! - [`memory`]: InMemoryStore implementation
//! - [`schema`]: SQL schema constants and migration setup
//! - [`sqlite`]: SqliteStore implementation

pub mod error;
pub mod memory;
pub mod schema;
pub mod sqlite;
pub mod traits;
pub mod types;

// Re-export key types for ergonomic use.
pub use error::StorageError;
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
pub use traits::FlowStore;
pub use types::{
    AiSettings, ExecutionLogEntry, ExecutionRecord, ExecutionStatus, FlowRecord, InstanceRecord,
    LogRecord, MessageRecord,
};
