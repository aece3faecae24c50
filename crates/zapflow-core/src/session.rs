//! EditorSession: the single-node focus state machine.
//!
//! The editor holds exactly one node under edit at a time. `select` is
//! always legal (last-selected wins, no dirty-check) because every field
//! change is applied eagerly to the document — there is no commit step and
//! no undo stack. Shared editor state (current focus, loaded instances) is
//! modeled explicitly on the session instead of as ambient globals, so the
//! focus policy is testable in isolation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::FlowDocument;
use crate::error::FlowError;
use crate::node::NodeData;

/// The session's focus state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Focus {
    /// No node under edit.
    Idle,
    /// One node under edit, by id.
    Editing(String),
}

/// A loaded messaging-account binding shown in the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRef {
    #[serde(rename = "instanceName")]
    pub instance_name: String,
    pub status: String,
}

impl InstanceRef {
    /// Whether this instance is connected and usable for dispatch.
    pub fn is_open(&self) -> bool {
        self.status == "open"
    }
}

/// Interactive editing state for one authoring session.
#[derive(Debug, Clone)]
pub struct EditorSession {
    focus: Focus,
    instances: Vec<InstanceRef>,
}

impl Default for EditorSession {
    fn default() -> Self {
        EditorSession::new()
    }
}

impl EditorSession {
    pub fn new() -> Self {
        EditorSession {
            focus: Focus::Idle,
            instances: Vec::new(),
        }
    }

    pub fn focus(&self) -> &Focus {
        &self.focus
    }

    /// The id of the node under edit, if any.
    pub fn selected(&self) -> Option<&str> {
        match &self.focus {
            Focus::Idle => None,
            Focus::Editing(id) => Some(id),
        }
    }

    /// Focuses a node for editing. Always legal, even mid-edit of another
    /// node: last-selected wins.
    pub fn select(&mut self, node_id: impl Into<String>) {
        self.focus = Focus::Editing(node_id.into());
    }

    /// Drops focus (navigation away).
    pub fn deselect(&mut self) {
        self.focus = Focus::Idle;
    }

    /// Applies one field edit to the focused node, eagerly and
    /// synchronously. Legal only while editing.
    pub fn field_change(
        &mut self,
        doc: &mut FlowDocument,
        key: impl Into<String>,
        value: Value,
    ) -> Result<(), FlowError> {
        let node_id = match &self.focus {
            Focus::Editing(id) => id.clone(),
            Focus::Idle => return Err(FlowError::NoNodeSelected),
        };
        let mut partial = NodeData::new();
        partial.insert(key.into(), value);
        doc.update_node_data(&node_id, partial)
    }

    /// Removes a node through the session, dropping focus when the removed
    /// node was the one under edit.
    pub fn remove_node(&mut self, doc: &mut FlowDocument, node_id: &str) -> Result<(), FlowError> {
        doc.remove_node(node_id)?;
        if self.selected() == Some(node_id) {
            self.deselect();
        }
        Ok(())
    }

    /// Replaces the loaded instance list.
    pub fn set_instances(&mut self, instances: Vec<InstanceRef>) {
        self.instances = instances;
    }

    pub fn instances(&self) -> &[InstanceRef] {
        &self.instances
    }

    /// Instances whose connection is open, the only ones offered for
    /// execution.
    pub fn open_instances(&self) -> impl Iterator<Item = &InstanceRef> {
        self.instances.iter().filter(|i| i.is_open())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::NodeKind;
    use serde_json::json;

    #[test]
    fn starts_idle() {
        let session = EditorSession::new();
        assert_eq!(*session.focus(), Focus::Idle);
        assert!(session.selected().is_none());
    }

    #[test]
    fn last_selected_wins_without_dirty_check() {
        let mut session = EditorSession::new();
        session.select("message-1");
        session.select("delay-2");
        assert_eq!(session.selected(), Some("delay-2"));
    }

    #[test]
    fn field_change_applies_eagerly_to_the_document() {
        let mut doc = FlowDocument::new("f");
        let id = doc.add_node(NodeKind::Message).id.clone();

        let mut session = EditorSession::new();
        session.select(id.clone());
        session
            .field_change(&mut doc, "message", json!("Bom dia!"))
            .unwrap();

        // No commit step: the mutation is already visible.
        assert_eq!(doc.node(&id).unwrap().data["message"], "Bom dia!");
    }

    #[test]
    fn field_change_while_idle_is_illegal() {
        let mut doc = FlowDocument::new("f");
        let mut session = EditorSession::new();
        let err = session
            .field_change(&mut doc, "message", json!("x"))
            .unwrap_err();
        assert!(matches!(err, FlowError::NoNodeSelected));
    }

    #[test]
    fn removing_the_focused_node_deselects() {
        let mut doc = FlowDocument::new("f");
        let id = doc.add_node(NodeKind::Message).id.clone();

        let mut session = EditorSession::new();
        session.select(id.clone());
        session.remove_node(&mut doc, &id).unwrap();
        assert_eq!(*session.focus(), Focus::Idle);
    }

    #[test]
    fn removing_another_node_keeps_focus() {
        let mut doc = FlowDocument::new("f");
        let focused = doc.add_node(NodeKind::Message).id.clone();
        let other = doc.add_node(NodeKind::Delay).id.clone();

        let mut session = EditorSession::new();
        session.select(focused.clone());
        session.remove_node(&mut doc, &other).unwrap();
        assert_eq!(session.selected(), Some(focused.as_str()));
    }

    #[test]
    fn open_instances_filters_by_status() {
        let mut session = EditorSession::new();
        session.set_instances(vec![
            InstanceRef {
                instance_name: "vendas-01".into(),
                status: "open".into(),
            },
            InstanceRef {
                instance_name: "suporte".into(),
                status: "disconnected".into(),
            },
        ]);
        let open: Vec<_> = session.open_instances().collect();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].instance_name, "vendas-01");
    }
}
