//! Gateway error types.

use zapflow_core::NodeViolation;

/// Errors surfaced by [`crate::FlowApi`].
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// A client-side precondition failed before any request was made
    /// (e.g. executing a flow that was never saved).
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Local validation found node-level violations; the save was not sent.
    #[error("validation failed for {} node(s)", .0.len())]
    Validation(Vec<NodeViolation>),

    /// Transport-level failure talking to the backend.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with an error status.
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },
}
