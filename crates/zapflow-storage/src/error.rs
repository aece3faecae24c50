//! Storage error types for zapflow-storage.
//!
//! [`StorageError`] covers all anticipated failure modes in the storage
//! layer: serialization of the JSON document columns, entity-not-found
//! variants, and the underlying database machinery.

use thiserror::Error;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// JSON serialization or deserialization of a document column failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The underlying SQLite call failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Applying schema migrations failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// A flow with the given id was not found.
    #[error("flow not found: '{0}'")]
    FlowNotFound(String),

    /// An instance with the given name was not found.
    #[error("instance not found: '{0}'")]
    InstanceNotFound(String),
}
