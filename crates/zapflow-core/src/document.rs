//! FlowDocument: the in-memory graph and its invariant-preserving mutations.
//!
//! All editing goes through [`FlowDocument`] methods, which maintain the
//! structural invariants at every observable state:
//!
//! 1. Node ids are unique within the document.
//! 2. Every edge's source and target reference existing node ids
//!    (removal cascades).
//! 3. Trigger nodes never accept an incoming edge.
//! 4. Source handles must belong to the source kind's handle set.
//!
//! Invariants 1-2 are hard: [`FlowDocument::deserialize`] rejects documents
//! violating them before any document exists. Invariant 4 is enforced on
//! `connect`. Invariant 3 is advisory everywhere: `connect` accepts an edge
//! into a trigger and [`FlowDocument::advisories`] reports it, so documents
//! persisted before the stricter rules still open.
//!
//! Fan-out (several edges from one handle) and self-loops are permitted by
//! the model; the interpreter decides their meaning.

use indexmap::IndexMap;

use crate::error::{Advisory, FlowError, NodeViolation};
use crate::flow::Flow;
use crate::kind::NodeKind;
use crate::node::{Edge, Node, NodeData, Position};
use crate::registry;
use crate::topology;

/// Canvas position of the seeded trigger node.
const TRIGGER_POSITION: Position = Position { x: 100.0, y: 100.0 };

/// The editable in-memory flow graph.
///
/// Nodes and edges are kept in insertion-ordered maps keyed by id: lookups
/// are O(1) and re-serialization is stable.
#[derive(Debug, Clone)]
pub struct FlowDocument {
    /// Server-assigned id; `None` until the first save.
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub selected_instance: Option<String>,
    pub is_active: bool,
    nodes: IndexMap<String, Node>,
    edges: IndexMap<String, Edge>,
    /// Monotonic counter feeding node id synthesis.
    next_seq: u64,
}

impl FlowDocument {
    /// Creates an empty, unsaved document.
    pub fn new(name: impl Into<String>) -> Self {
        FlowDocument {
            id: None,
            name: name.into(),
            description: String::new(),
            selected_instance: None,
            is_active: false,
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
            next_seq: 1,
        }
    }

    /// Creates a fresh document seeded with one trigger node at the default
    /// position, the way every authoring session starts.
    pub fn new_with_trigger(name: impl Into<String>) -> Self {
        let mut doc = FlowDocument::new(name);
        let node = Node::new(
            "trigger-1",
            NodeKind::Trigger,
            TRIGGER_POSITION,
            registry::default_data(NodeKind::Trigger),
        );
        doc.next_seq = 2;
        doc.nodes.insert(node.id.clone(), node);
        doc
    }

    // -----------------------------------------------------------------------
    // Read-only accessors
    // -----------------------------------------------------------------------

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Looks up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Looks up an edge by id.
    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.get(id)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Adds a node of the given kind with synthesized id, provisional
    /// position, and registry defaults. Returns the created node.
    ///
    /// Id collisions against existing ids (possible after loading a document
    /// authored elsewhere) trigger regeneration, not failure.
    pub fn add_node(&mut self, kind: NodeKind) -> &Node {
        let id = loop {
            let candidate = format!("{}-{}", kind, self.next_seq);
            self.next_seq += 1;
            if !self.nodes.contains_key(&candidate) {
                break candidate;
            }
        };
        let node = Node::new(
            id.clone(),
            kind,
            self.provisional_position(),
            registry::default_data(kind),
        );
        self.nodes.insert(id.clone(), node);
        &self.nodes[&id]
    }

    /// Staggers new nodes across the canvas so they don't stack. Purely
    /// provisional; the rendering collaborator owns positions afterwards.
    fn provisional_position(&self) -> Position {
        let n = self.nodes.len() as u64;
        Position::new(100.0 + 60.0 * (n % 5) as f64, 100.0 + 60.0 * (n / 5) as f64)
    }

    /// Shallow-merges `partial` into an existing node's data: new keys
    /// overwrite, keys absent from `partial` are preserved.
    pub fn update_node_data(&mut self, node_id: &str, partial: NodeData) -> Result<(), FlowError> {
        let node = self
            .nodes
            .get_mut(node_id)
            .ok_or_else(|| FlowError::NodeNotFound { id: node_id.into() })?;
        for (key, value) in partial {
            node.data.insert(key, value);
        }
        Ok(())
    }

    /// Removes a node, cascading removal of every incident edge so no edge
    /// ever dangles. Errors (does not silently succeed) when the id is
    /// absent, including on a repeated call.
    pub fn remove_node(&mut self, node_id: &str) -> Result<Node, FlowError> {
        let node = self
            .nodes
            .shift_remove(node_id)
            .ok_or_else(|| FlowError::NodeNotFound { id: node_id.into() })?;
        self.edges
            .retain(|_, edge| edge.source != node_id && edge.target != node_id);
        Ok(node)
    }

    /// Connects two nodes, validating endpoints and the source handle.
    ///
    /// Conditional sources require `source_handle` to be exactly `"true"`
    /// or `"false"`; every other kind requires it to be absent. Self-loops
    /// are structurally permitted. Reconnecting an identical
    /// (source, handle, target) triple is idempotent.
    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
        source_handle: Option<&str>,
    ) -> Result<&Edge, FlowError> {
        let source_kind = match self.nodes.get(source) {
            Some(node) => node.kind,
            None => {
                return Err(FlowError::DanglingReference {
                    endpoint: "source",
                    id: source.into(),
                })
            }
        };
        if !self.nodes.contains_key(target) {
            return Err(FlowError::DanglingReference {
                endpoint: "target",
                id: target.into(),
            });
        }
        if !source_kind.accepts_handle(source_handle) {
            return Err(FlowError::InvalidHandle {
                kind: source_kind,
                handle: source_handle.map(String::from),
            });
        }

        // Idempotency is keyed on the triple, not the derived id: node ids
        // containing the separator can make two distinct triples derive the
        // same id ("x" --true--> "y" vs "x-true" ----> "y").
        if let Some(existing) = self.edges.values().find(|edge| {
            edge.source == source
                && edge.target == target
                && edge.source_handle.as_deref() == source_handle
        }) {
            let id = existing.id.clone();
            return Ok(&self.edges[&id]);
        }

        let base = Edge::derive_id(source, target, source_handle);
        let mut id = base.clone();
        let mut suffix = 2;
        while self.edges.contains_key(&id) {
            id = format!("{}-{}", base, suffix);
            suffix += 1;
        }
        let edge = Edge {
            id: id.clone(),
            source: source.into(),
            target: target.into(),
            source_handle: source_handle.map(String::from),
            target_handle: None,
        };
        self.edges.insert(id.clone(), edge);
        Ok(&self.edges[&id])
    }

    /// Removes one edge. No cascade.
    pub fn disconnect(&mut self, edge_id: &str) -> Result<Edge, FlowError> {
        self.edges
            .shift_remove(edge_id)
            .ok_or_else(|| FlowError::EdgeNotFound { id: edge_id.into() })
    }

    // -----------------------------------------------------------------------
    // Wire conversion
    // -----------------------------------------------------------------------

    /// Serializes to the persisted [`Flow`] shape, nodes and edges in
    /// insertion order.
    pub fn serialize(&self) -> Flow {
        Flow {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            selected_instance: self.selected_instance.clone(),
            is_active: self.is_active,
            nodes: self.nodes.values().cloned().collect(),
            edges: self.edges.values().cloned().collect(),
        }
    }

    /// Reconstructs a document from a persisted flow.
    ///
    /// Rejects documents violating the hard invariants (duplicate node or
    /// edge ids, edges referencing missing nodes) before any document
    /// exists; there is no partially-constructed state to observe. Soft
    /// invariant violations load fine and surface via [`advisories`].
    ///
    /// [`advisories`]: FlowDocument::advisories
    pub fn deserialize(flow: Flow) -> Result<FlowDocument, FlowError> {
        let mut nodes = IndexMap::with_capacity(flow.nodes.len());
        for node in flow.nodes {
            if nodes.insert(node.id.clone(), node.clone()).is_some() {
                return Err(FlowError::MalformedFlow {
                    reason: format!("duplicate node id '{}'", node.id),
                });
            }
        }

        let mut edges = IndexMap::with_capacity(flow.edges.len());
        for edge in flow.edges {
            for (endpoint, node_id) in [("source", &edge.source), ("target", &edge.target)] {
                if !nodes.contains_key(node_id) {
                    return Err(FlowError::MalformedFlow {
                        reason: format!(
                            "edge '{}' references missing {} node '{}'",
                            edge.id, endpoint, node_id
                        ),
                    });
                }
            }
            if edges.insert(edge.id.clone(), edge.clone()).is_some() {
                return Err(FlowError::MalformedFlow {
                    reason: format!("duplicate edge id '{}'", edge.id),
                });
            }
        }

        let next_seq = nodes.len() as u64 + 1;
        Ok(FlowDocument {
            id: flow.id,
            name: flow.name,
            description: flow.description,
            selected_instance: flow.selected_instance,
            is_active: flow.is_active,
            nodes,
            edges,
            next_seq,
        })
    }

    // -----------------------------------------------------------------------
    // Diagnostics
    // -----------------------------------------------------------------------

    /// Reports soft-invariant violations: trigger in-edges, per-handle
    /// fan-out, unreachable nodes. Advisory only — never blocks load or
    /// save.
    pub fn advisories(&self) -> Vec<Advisory> {
        let mut advisories = Vec::new();

        for edge in self.edges.values() {
            if let Some(target) = self.nodes.get(&edge.target) {
                if !target.kind.accepts_input() {
                    advisories.push(Advisory::TriggerHasIncomingEdge {
                        node_id: target.id.clone(),
                    });
                }
            }
        }

        // Outgoing-edge multiplicity per (source, handle).
        let mut counts: IndexMap<(&str, Option<&str>), usize> = IndexMap::new();
        for edge in self.edges.values() {
            *counts
                .entry((edge.source.as_str(), edge.source_handle.as_deref()))
                .or_insert(0) += 1;
        }
        for ((node_id, handle), count) in counts {
            if count > 1 {
                advisories.push(Advisory::HandleFanOut {
                    node_id: node_id.into(),
                    handle: handle.map(String::from),
                    count,
                });
            }
        }

        for node_id in topology::unreachable_nodes(self) {
            advisories.push(Advisory::UnreachableNode { node_id });
        }

        advisories
    }

    /// Validates every node's data against its kind's schema. Returns one
    /// entry per failing node; empty means the document may be saved.
    pub fn validate(&self) -> Vec<NodeViolation> {
        self.nodes
            .values()
            .filter_map(|node| {
                let violations = registry::validate(node.kind, &node.data);
                if violations.is_empty() {
                    None
                } else {
                    Some(NodeViolation {
                        node_id: node.id.clone(),
                        kind: node.kind,
                        violations,
                    })
                }
            })
            .collect()
    }
}
