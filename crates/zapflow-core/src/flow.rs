//! The persisted flow aggregate (wire shape).
//!
//! [`Flow`] is the document as it travels over the persistence boundary:
//! camelCase keys, optional id (absent until first save), node/edge arrays
//! in stable order. The editable in-memory form is
//! [`FlowDocument`](crate::document::FlowDocument); converting between the
//! two is the serialize/deserialize contract.

use serde::{Deserialize, Serialize};

use crate::node::{Edge, Node};

/// A persisted automation definition for one conversational scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Flow {
    /// Server-assigned id; `None` until the first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Binding to one external messaging account, or `None` for "any".
    #[serde(
        rename = "selectedInstance",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub selected_instance: Option<String>,
    /// Whether the external runtime will dispatch this flow.
    #[serde(rename = "isActive", default)]
    pub is_active: bool,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Flow {
    /// A new unsaved flow with the given name and no content.
    pub fn named(name: impl Into<String>) -> Self {
        Flow {
            name: name.into(),
            ..Flow::default()
        }
    }
}
