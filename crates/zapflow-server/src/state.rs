//! Application state with shared `FlowService` for concurrent access.
//!
//! [`AppState`] wraps the service in `Arc<tokio::sync::Mutex<>>` for use with
//! axum handlers. Uses `tokio::sync::Mutex` (async-aware) instead of
//! `std::sync::Mutex` (blocking) so handlers await the lock without blocking
//! the tokio runtime.
//!
//! Note: `tokio::sync::RwLock` would allow concurrent reads, but the SQLite
//! backend holds a `rusqlite::Connection`, which is `!Sync`, preventing it
//! from being held behind an `RwLock`. The `Mutex` approach is correct and
//! non-blocking.

use std::sync::Arc;

use crate::error::ApiError;
use crate::evolution::EvolutionClient;
use crate::service::FlowService;

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// The shared flow service (async Mutex -- non-blocking await).
    pub service: Arc<tokio::sync::Mutex<FlowService>>,
    /// Client for the upstream Evolution API.
    pub evolution: Arc<dyn EvolutionClient>,
}

impl AppState {
    /// Creates an `AppState` backed by a SQLite database at `db_path`.
    pub fn new(db_path: &str, evolution: Arc<dyn EvolutionClient>) -> Result<Self, ApiError> {
        let service = FlowService::new(db_path)?;
        Ok(AppState {
            service: Arc::new(tokio::sync::Mutex::new(service)),
            evolution,
        })
    }

    /// Creates an `AppState` with an in-memory store (for testing).
    pub fn in_memory(evolution: Arc<dyn EvolutionClient>) -> Self {
        AppState {
            service: Arc::new(tokio::sync::Mutex::new(FlowService::in_memory())),
            evolution,
        }
    }
}
