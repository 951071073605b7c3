//! Graph core: petgraph directed multigraph keyed by concept id
//!
//! - Nodes are concept ids, edges carry [`EdgeAttrs`]
//! - Hierarchy edges point child → parent
//! - Parallel edges between the same pair are allowed (different type/group)
//! - Nothing is ever removed, so node and edge indices are stable and edge
//!   indices follow insertion order

use ahash::AHashMap;
use petgraph::graph::{DiGraph, EdgeIndex, EdgeReference, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::domain::{ConceptId, EdgeAttrs};

#[derive(Debug, Default)]
pub struct GraphCore {
    graph: DiGraph<ConceptId, EdgeAttrs>,

    /// Concept id → node index
    id_to_node: AHashMap<ConceptId, NodeIndex>,
}

impl GraphCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            graph: DiGraph::with_capacity(nodes, edges),
            id_to_node: AHashMap::with_capacity(nodes),
        }
    }

    /// Add a node for `id` unless it already exists
    pub(crate) fn add_concept(&mut self, id: ConceptId) -> NodeIndex {
        if let Some(&idx) = self.id_to_node.get(&id) {
            return idx;
        }
        let idx = self.graph.add_node(id);
        self.id_to_node.insert(id, idx);
        idx
    }

    /// Add an edge between two existing nodes
    pub(crate) fn add_relationship(
        &mut self,
        source: NodeIndex,
        target: NodeIndex,
        attrs: EdgeAttrs,
    ) -> EdgeIndex {
        self.graph.add_edge(source, target, attrs)
    }

    pub fn node_index(&self, id: ConceptId) -> Option<NodeIndex> {
        self.id_to_node.get(&id).copied()
    }

    pub fn concept_id(&self, idx: NodeIndex) -> ConceptId {
        self.graph[idx]
    }

    pub fn contains(&self, id: ConceptId) -> bool {
        self.id_to_node.contains_key(&id)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Concept ids in storage order
    pub fn concept_ids(&self) -> impl Iterator<Item = ConceptId> + '_ {
        self.graph.node_indices().map(move |idx| self.graph[idx])
    }

    /// All edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = EdgeReference<'_, EdgeAttrs>> {
        self.graph.edge_references()
    }

    /// Edges incident to `idx` in `direction`, in insertion order
    ///
    /// petgraph walks per-node adjacency lists newest-first, so the edges are
    /// re-sorted by index.
    pub fn edges_directed(
        &self,
        idx: NodeIndex,
        direction: Direction,
    ) -> Vec<EdgeReference<'_, EdgeAttrs>> {
        let mut edges: Vec<_> = self.graph.edges_directed(idx, direction).collect();
        edges.sort_by_key(|edge| edge.id());
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn attrs(type_id: ConceptId, group: u32) -> EdgeAttrs {
        EdgeAttrs {
            group,
            type_label: Arc::from(type_id.to_string()),
            type_id,
        }
    }

    #[test]
    fn test_empty_core() {
        let core = GraphCore::new();
        assert_eq!(core.node_count(), 0);
        assert_eq!(core.edge_count(), 0);
        assert!(!core.contains(1));
    }

    #[test]
    fn test_add_concept_is_idempotent() {
        let mut core = GraphCore::new();
        let a = core.add_concept(10);
        let b = core.add_concept(10);
        assert_eq!(a, b);
        assert_eq!(core.node_count(), 1);
        assert_eq!(core.concept_id(a), 10);
    }

    #[test]
    fn test_parallel_edges_kept() {
        let mut core = GraphCore::new();
        let a = core.add_concept(1);
        let b = core.add_concept(2);
        core.add_relationship(a, b, attrs(100, 0));
        core.add_relationship(a, b, attrs(200, 1));
        assert_eq!(core.edge_count(), 2);
    }

    #[test]
    fn test_edges_directed_insertion_order() {
        let mut core = GraphCore::new();
        let a = core.add_concept(1);
        let b = core.add_concept(2);
        let c = core.add_concept(3);
        core.add_relationship(a, b, attrs(100, 0));
        core.add_relationship(a, c, attrs(200, 0));
        core.add_relationship(a, b, attrs(300, 0));

        let types: Vec<ConceptId> = core
            .edges_directed(a, Direction::Outgoing)
            .iter()
            .map(|e| e.weight().type_id)
            .collect();
        assert_eq!(types, vec![100, 200, 300]);

        let incoming = core.edges_directed(b, Direction::Incoming);
        assert_eq!(incoming.len(), 2);
        assert!(incoming.iter().all(|e| e.source() == a));
    }
}
