//! Graph topology helpers: execution order and reachability.
//!
//! The external runtime walks a flow sequentially from its trigger node,
//! following the first outgoing edge in document order at each step.
//! [`execution_order`] reproduces that walk (cycle-safe, so a self-loop or
//! back-edge terminates instead of spinning). [`unreachable_nodes`] backs
//! the advisory diagnostics with a petgraph traversal from every trigger.

use std::collections::{HashMap, HashSet};

use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableGraph;
use petgraph::visit::Dfs;
use petgraph::Directed;

use crate::document::FlowDocument;
use crate::error::FlowError;
use crate::kind::NodeKind;

/// Builds a petgraph view of the document, returning the graph and the
/// node-id to index mapping.
fn build_graph(
    doc: &FlowDocument,
) -> (
    StableGraph<String, Option<String>, Directed, u32>,
    HashMap<String, NodeIndex<u32>>,
) {
    let mut graph = StableGraph::new();
    let mut indices = HashMap::with_capacity(doc.node_count());
    for node in doc.nodes() {
        let idx = graph.add_node(node.id.clone());
        indices.insert(node.id.clone(), idx);
    }
    for edge in doc.edges() {
        // Both endpoints exist: invariant 2 holds in every document.
        let source = indices[&edge.source];
        let target = indices[&edge.target];
        graph.add_edge(source, target, edge.source_handle.clone());
    }
    (graph, indices)
}

/// The sequential execution order the runtime would follow: start at the
/// first trigger node, then repeatedly take the first outgoing edge in
/// document order. Stops at the first already-visited node.
///
/// Fails with [`FlowError::NoTriggerNode`] when the document has no trigger.
pub fn execution_order(doc: &FlowDocument) -> Result<Vec<String>, FlowError> {
    let mut current = doc
        .nodes()
        .find(|node| node.kind == NodeKind::Trigger)
        .map(|node| node.id.clone())
        .ok_or(FlowError::NoTriggerNode)?;

    let mut order = Vec::new();
    let mut visited = HashSet::new();
    loop {
        if !visited.insert(current.clone()) {
            break;
        }
        order.push(current.clone());
        match doc.edges().find(|edge| edge.source == current) {
            Some(edge) => current = edge.target.clone(),
            None => break,
        }
    }
    Ok(order)
}

/// Node ids not reachable from any trigger node. Trigger nodes themselves
/// are always considered reachable (they are entry points).
pub fn unreachable_nodes(doc: &FlowDocument) -> Vec<String> {
    let (graph, indices) = build_graph(doc);

    let mut reached: HashSet<NodeIndex<u32>> = HashSet::new();
    for node in doc.nodes() {
        if node.kind == NodeKind::Trigger {
            let mut dfs = Dfs::new(&graph, indices[&node.id]);
            while let Some(idx) = dfs.next(&graph) {
                reached.insert(idx);
            }
        }
    }

    doc.nodes()
        .filter(|node| !reached.contains(&indices[&node.id]))
        .map(|node| node.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::NodeKind;

    #[test]
    fn execution_order_follows_first_outgoing_edge() {
        let mut doc = FlowDocument::new_with_trigger("f");
        let msg = doc.add_node(NodeKind::Message).id.clone();
        let delay = doc.add_node(NodeKind::Delay).id.clone();
        let media = doc.add_node(NodeKind::Media).id.clone();
        doc.connect("trigger-1", &msg, None).unwrap();
        doc.connect(&msg, &delay, None).unwrap();
        doc.connect(&delay, &media, None).unwrap();

        let order = execution_order(&doc).unwrap();
        assert_eq!(order, vec!["trigger-1".to_string(), msg, delay, media]);
    }

    #[test]
    fn execution_order_prefers_earlier_edge_on_fan_out() {
        let mut doc = FlowDocument::new_with_trigger("f");
        let m1 = doc.add_node(NodeKind::Message).id.clone();
        let m2 = doc.add_node(NodeKind::Message).id.clone();
        doc.connect("trigger-1", &m1, None).unwrap();
        doc.connect("trigger-1", &m2, None).unwrap();

        let order = execution_order(&doc).unwrap();
        assert_eq!(order, vec!["trigger-1".to_string(), m1]);
    }

    #[test]
    fn execution_order_terminates_on_cycles() {
        let mut doc = FlowDocument::new_with_trigger("f");
        let m1 = doc.add_node(NodeKind::Message).id.clone();
        let m2 = doc.add_node(NodeKind::Message).id.clone();
        doc.connect("trigger-1", &m1, None).unwrap();
        doc.connect(&m1, &m2, None).unwrap();
        doc.connect(&m2, &m1, None).unwrap();

        let order = execution_order(&doc).unwrap();
        assert_eq!(order, vec!["trigger-1".to_string(), m1, m2]);
    }

    #[test]
    fn execution_order_without_trigger_fails() {
        let mut doc = FlowDocument::new("f");
        doc.add_node(NodeKind::Message);
        let err = execution_order(&doc).unwrap_err();
        assert!(matches!(err, FlowError::NoTriggerNode));
    }

    #[test]
    fn unreachable_nodes_reports_orphans() {
        let mut doc = FlowDocument::new_with_trigger("f");
        let connected = doc.add_node(NodeKind::Message).id.clone();
        let orphan = doc.add_node(NodeKind::Message).id.clone();
        doc.connect("trigger-1", &connected, None).unwrap();

        let unreachable = unreachable_nodes(&doc);
        assert_eq!(unreachable, vec![orphan]);
    }

    #[test]
    fn conditional_branches_are_both_reachable() {
        let mut doc = FlowDocument::new_with_trigger("f");
        let cond = doc.add_node(NodeKind::Conditional).id.clone();
        let m1 = doc.add_node(NodeKind::Message).id.clone();
        let m2 = doc.add_node(NodeKind::Message).id.clone();
        doc.connect("trigger-1", &cond, None).unwrap();
        doc.connect(&cond, &m1, Some("true")).unwrap();
        doc.connect(&cond, &m2, Some("false")).unwrap();

        assert!(unreachable_nodes(&doc).is_empty());
    }
}
