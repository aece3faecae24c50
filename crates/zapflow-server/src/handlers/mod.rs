//! HTTP handler functions, grouped by resource.
//!
//! Handlers are thin: they parse the request, delegate to
//! [`crate::service::FlowService`] or the Evolution client, and shape the
//! response.

pub mod flows;
pub mod instances;
pub mod records;
pub mod settings;
pub mod upload;
