//! Core error types for zapflow-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering
//! all anticipated failure modes in the flow graph data model.

use serde::Serialize;
use thiserror::Error;

use crate::kind::NodeKind;

/// Core errors produced by the zapflow-core crate.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A node kind string outside the closed enumeration. Node kind arrives
    /// as an untyped string from the wire, so this is checked, not assumed.
    #[error("unknown node kind: '{kind}'")]
    UnknownKind { kind: String },

    /// A node id was not found in the document.
    #[error("node not found: '{id}'")]
    NodeNotFound { id: String },

    /// An edge id was not found in the document.
    #[error("edge not found: '{id}'")]
    EdgeNotFound { id: String },

    /// An edge endpoint references a node id absent from the document.
    #[error("dangling reference: {endpoint} node '{id}' does not exist")]
    DanglingReference {
        /// Which endpoint is dangling ("source" or "target").
        endpoint: &'static str,
        id: String,
    },

    /// A source handle that does not match the source node's handle set.
    /// Conditional sources require exactly "true" or "false"; every other
    /// kind exposes a single unnamed handle.
    #[error("invalid handle {handle:?} for {kind} source node")]
    InvalidHandle {
        kind: NodeKind,
        handle: Option<String>,
    },

    /// A persisted document that violates the structural invariants
    /// (duplicate ids, edges referencing missing nodes).
    #[error("malformed flow: {reason}")]
    MalformedFlow { reason: String },

    /// A field edit was attempted with no node under edit.
    #[error("no node selected")]
    NoNodeSelected,

    /// A document with no trigger node cannot produce an execution order.
    #[error("flow has no trigger node")]
    NoTriggerNode,
}

/// A single field-level schema violation, reported by the registry's
/// `validate` and surfaced to the user at save time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// The offending data field.
    pub field: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldViolation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// All violations for one node, produced by document-level validation.
#[derive(Debug, Clone, Serialize)]
pub struct NodeViolation {
    /// The node whose data failed validation.
    pub node_id: String,
    /// The node's kind.
    pub kind: NodeKind,
    /// Field-level violations.
    pub violations: Vec<FieldViolation>,
}

/// Advisory diagnostics for loaded documents.
///
/// These describe violations of the soft invariants (trigger in-edges,
/// per-handle edge multiplicity, reachability). Documents persisted before
/// stricter rules were introduced must still load, so advisories warn but
/// never block deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Advisory {
    /// A trigger node carries an incoming edge.
    TriggerHasIncomingEdge { node_id: String },
    /// More than one outgoing edge shares the same source handle. The model
    /// permits this (the interpreter treats it as fan-out) but it is usually
    /// an authoring mistake.
    HandleFanOut {
        node_id: String,
        handle: Option<String>,
        count: usize,
    },
    /// A node is not reachable from any trigger node.
    UnreachableNode { node_id: String },
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Advisory::TriggerHasIncomingEdge { node_id } => {
                write!(f, "trigger node '{}' has an incoming edge", node_id)
            }
            Advisory::HandleFanOut {
                node_id,
                handle,
                count,
            } => match handle {
                Some(h) => write!(
                    f,
                    "node '{}' has {} outgoing edges on handle '{}'",
                    node_id, count, h
                ),
                None => write!(f, "node '{}' has {} outgoing edges", node_id, count),
            },
            Advisory::UnreachableNode { node_id } => {
                write!(f, "node '{}' is unreachable from any trigger", node_id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_error_display() {
        let err = FlowError::UnknownKind {
            kind: "carousel".into(),
        };
        assert_eq!(err.to_string(), "unknown node kind: 'carousel'");

        let err = FlowError::NodeNotFound { id: "msg-3".into() };
        assert_eq!(err.to_string(), "node not found: 'msg-3'");
    }

    #[test]
    fn invalid_handle_display() {
        let err = FlowError::InvalidHandle {
            kind: NodeKind::Message,
            handle: Some("true".into()),
        };
        assert!(err.to_string().contains("message"));
        assert!(err.to_string().contains("true"));
    }

    #[test]
    fn advisory_display() {
        let adv = Advisory::TriggerHasIncomingEdge {
            node_id: "trigger-1".into(),
        };
        assert_eq!(
            adv.to_string(),
            "trigger node 'trigger-1' has an incoming edge"
        );

        let adv = Advisory::HandleFanOut {
            node_id: "cond-1".into(),
            handle: Some("true".into()),
            count: 2,
        };
        assert!(adv.to_string().contains("handle 'true'"));
    }
}
