//! Node and edge entities of the flow graph.
//!
//! A [`Node`] is one step in a flow, tagged by [`NodeKind`] with a
//! kind-specific open data record. An [`Edge`] is a directed connection
//! between two nodes, optionally discriminated by a named source handle.
//!
//! `data` is deliberately an open record ([`NodeData`], a JSON object):
//! the registry validates it narrowly per kind, and unknown keys written by
//! newer editors are preserved verbatim on round-trip instead of stripped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::kind::NodeKind;

/// The open per-node data record. Keys beyond the kind's schema are carried
/// through untouched for forward compatibility, never interpreted.
pub type NodeData = serde_json::Map<String, Value>;

/// A 2D canvas coordinate.
///
/// Owned by the rendering collaborator; the core only stores and round-trips
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }
}

/// One step in a flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Opaque unique id, stable for the document's lifetime.
    pub id: String,
    /// The node kind, serialized under the wire key `type`.
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Canvas position.
    pub position: Position,
    /// Kind-specific data record.
    #[serde(default)]
    pub data: NodeData,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind, position: Position, data: NodeData) -> Self {
        Node {
            id: id.into(),
            kind,
            position,
            data,
        }
    }
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Derived deterministically from the endpoints; unique within a flow,
    /// not required to be globally meaningful.
    pub id: String,
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    /// Named source handle. Only conditional sources emit named handles
    /// (`"true"` / `"false"`); everything else uses the single unnamed
    /// handle (`None`).
    #[serde(
        rename = "sourceHandle",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub source_handle: Option<String>,
    /// Named target handle, stored for wire fidelity. The model defines no
    /// named input handles, so this is round-tripped but never interpreted.
    #[serde(
        rename = "targetHandle",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub target_handle: Option<String>,
}

impl Edge {
    /// Derives the conventional edge id for a source/handle/target triple.
    ///
    /// Distinct triples can collide when a node id itself contains the
    /// separator; `FlowDocument::connect` resolves such collisions with a
    /// numeric suffix.
    pub fn derive_id(source: &str, target: &str, source_handle: Option<&str>) -> String {
        match source_handle {
            Some(handle) => format!("e-{}-{}-{}", source, handle, target),
            None => format!("e-{}-{}", source, target),
        }
    }

    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Edge {
            id: Edge::derive_id(&source, &target, None),
            source,
            target,
            source_handle: None,
            target_handle: None,
        }
    }

    pub fn with_handle(
        source: impl Into<String>,
        target: impl Into<String>,
        handle: impl Into<String>,
    ) -> Self {
        let source = source.into();
        let target = target.into();
        let handle = handle.into();
        Edge {
            id: Edge::derive_id(&source, &target, Some(&handle)),
            source,
            target,
            source_handle: Some(handle),
            target_handle: None,
        }
    }
}
