//! Client-side persistence gateway for the zapflow editor.
//!
//! [`FlowApi`] wraps the backend REST API: flow CRUD, execution, and media
//! upload. It enforces the client-side preconditions the editor relies on:
//! a flow must be saved (have an id) before it can be executed, and a
//! document with node-level validation failures is never sent to the
//! backend.

mod api;
mod error;

pub use api::{ExecutionView, FlowApi, FlowView};
pub use error::GatewayError;
