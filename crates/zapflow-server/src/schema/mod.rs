//! Request/response types for the HTTP API.

pub mod flows;
pub mod instances;
pub mod upload;
