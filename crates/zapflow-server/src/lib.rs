//! HTTP/JSON API server for the zapflow conversational automation builder.
//!
//! Exposes a REST API for managing flow definitions, triggering flow
//! executions against a WhatsApp instance, managing Evolution API
//! instances, and editing AI assistant settings. This crate contains the
//! server framework, API schema types, error handling, and route
//! definitions.

pub mod error;
pub mod evolution;
pub mod executor;
pub mod handlers;
pub mod router;
pub mod schema;
pub mod service;
pub mod state;
