//! Query engine: hierarchy and proximity queries over the graph core
//!
//! Stateless. Every hierarchy query only follows edges whose type id equals
//! the configured is-a type; all other edges are reachable only through
//! [`QueryEngine::get_inferred_relationships`].
//!
//! Closures and path search are explicit BFS with a visited set, so cyclic
//! input terminates and never yields duplicates.

use ahash::{AHashMap, AHashSet};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use super::topology::GraphCore;
use crate::config::HierarchyConfig;
use crate::domain::{
    ConceptDetails, ConceptId, ConceptStore, EdgeAttrs, Relationship, RelationshipGroup,
};
use crate::errors::{OntologyError, Result};

/// Set of concepts, ordered by id
pub type ConceptSet = BTreeSet<Arc<ConceptDetails>>;

pub struct QueryEngine<'g> {
    core: &'g GraphCore,
    details: &'g ConceptStore,
    is_a_type_id: ConceptId,
}

impl<'g> QueryEngine<'g> {
    pub fn new(core: &'g GraphCore, details: &'g ConceptStore, hierarchy: HierarchyConfig) -> Self {
        Self {
            core,
            details,
            is_a_type_id: hierarchy.is_a_type_id,
        }
    }

    pub fn is_a_type_id(&self) -> ConceptId {
        self.is_a_type_id
    }

    pub fn contains(&self, id: ConceptId) -> bool {
        self.core.contains(id)
    }

    pub fn get_concept_details(&self, id: ConceptId) -> Result<Arc<ConceptDetails>> {
        self.resolve(id)?;
        self.details_of_id(id)
    }

    /// Direct parents (targets of outgoing is-a edges)
    pub fn get_parents(&self, id: ConceptId) -> Result<Vec<Arc<ConceptDetails>>> {
        let idx = self.resolve(id)?;
        self.hierarchy_neighbours(idx, Direction::Outgoing)
            .into_iter()
            .map(|n| self.details_of(n))
            .collect()
    }

    /// Direct children (sources of incoming is-a edges)
    pub fn get_children(&self, id: ConceptId) -> Result<Vec<Arc<ConceptDetails>>> {
        let idx = self.resolve(id)?;
        self.hierarchy_neighbours(idx, Direction::Incoming)
            .into_iter()
            .map(|n| self.details_of(n))
            .collect()
    }

    /// All concepts reachable through is-a edges, excluding `id`
    pub fn get_ancestors(&self, id: ConceptId) -> Result<ConceptSet> {
        let idx = self.resolve(id)?;
        self.closure(idx, Direction::Outgoing)
    }

    /// All concepts that reach `id` through is-a edges, excluding `id`
    pub fn get_descendants(&self, id: ConceptId) -> Result<ConceptSet> {
        let idx = self.resolve(id)?;
        self.closure(idx, Direction::Incoming)
    }

    /// Direct parents and children
    pub fn get_neighbourhood(&self, id: ConceptId) -> Result<ConceptSet> {
        let idx = self.resolve(id)?;
        let mut set = ConceptSet::new();
        for direction in [Direction::Outgoing, Direction::Incoming] {
            for n in self.hierarchy_neighbours(idx, direction) {
                set.insert(self.details_of(n)?);
            }
        }
        Ok(set)
    }

    /// Outgoing non-hierarchy relationships bucketed by group number
    ///
    /// Groups are ordered by number. Every group-0 relationship is its own
    /// single-member group; members keep build insertion order.
    pub fn get_inferred_relationships(&self, id: ConceptId) -> Result<Vec<RelationshipGroup>> {
        let idx = self.resolve(id)?;
        let src = self.details_of(idx)?;

        let mut ungrouped = Vec::new();
        let mut grouped: BTreeMap<u32, Vec<Relationship>> = BTreeMap::new();

        for edge in self.core.edges_directed(idx, Direction::Outgoing) {
            let attrs = edge.weight();
            if attrs.type_id == self.is_a_type_id {
                continue;
            }
            let relationship =
                Relationship::new(Arc::clone(&src), self.details_of(edge.target())?, attrs);
            if attrs.group == 0 {
                ungrouped.push(RelationshipGroup::new(0, vec![relationship]));
            } else {
                grouped.entry(attrs.group).or_default().push(relationship);
            }
        }

        ungrouped.extend(
            grouped
                .into_iter()
                .map(|(group, members)| RelationshipGroup::new(group, members)),
        );
        Ok(ungrouped)
    }

    /// Shortest path from `from` to `to` over is-a edges in either direction
    ///
    /// Each returned relationship is oriented along the walk: `src` is the
    /// concept the step leaves, `tgt` the one it reaches, whatever the stored
    /// edge direction. `find_path(a, a)` is the empty path.
    pub fn find_path(&self, from: ConceptId, to: ConceptId) -> Result<Vec<Relationship>> {
        let start = self.resolve(from)?;
        let goal = self.resolve(to)?;
        if start == goal {
            return Ok(Vec::new());
        }

        // node -> (previous node, edge used to get here)
        let mut came_from: AHashMap<NodeIndex, (NodeIndex, &EdgeAttrs)> = AHashMap::new();
        let mut visited = AHashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        'search: while let Some(current) = queue.pop_front() {
            for (next, edge) in self.undirected_hierarchy_steps(current) {
                if visited.insert(next) {
                    came_from.insert(next, (current, edge));
                    if next == goal {
                        break 'search;
                    }
                    queue.push_back(next);
                }
            }
        }

        if !came_from.contains_key(&goal) {
            return Err(OntologyError::NoPathFound { from, to });
        }

        let mut path = Vec::new();
        let mut current = goal;
        while let Some(&(prev, attrs)) = came_from.get(&current) {
            path.push(Relationship::new(
                self.details_of(prev)?,
                self.details_of(current)?,
                attrs,
            ));
            if prev == start {
                break;
            }
            current = prev;
        }
        path.reverse();
        Ok(path)
    }

    // ── internals ───────────────────────────────────────────────────────────

    fn resolve(&self, id: ConceptId) -> Result<NodeIndex> {
        self.core
            .node_index(id)
            .ok_or(OntologyError::ConceptNotFound(id))
    }

    fn details_of_id(&self, id: ConceptId) -> Result<Arc<ConceptDetails>> {
        self.details
            .get(id)
            .cloned()
            .ok_or(OntologyError::ConceptNotFound(id))
    }

    fn details_of(&self, idx: NodeIndex) -> Result<Arc<ConceptDetails>> {
        self.details_of_id(self.core.concept_id(idx))
    }

    /// Distinct is-a neighbours in one direction, first-seen order
    fn hierarchy_neighbours(&self, idx: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut seen = AHashSet::new();
        self.core
            .edges_directed(idx, direction)
            .into_iter()
            .filter(|edge| edge.weight().type_id == self.is_a_type_id)
            .map(|edge| match direction {
                Direction::Outgoing => edge.target(),
                Direction::Incoming => edge.source(),
            })
            .filter(|n| *n != idx && seen.insert(*n))
            .collect()
    }

    /// Is-a steps from `idx` ignoring storage direction: parents first, then children
    fn undirected_hierarchy_steps(&self, idx: NodeIndex) -> Vec<(NodeIndex, &'g EdgeAttrs)> {
        let mut steps = Vec::new();
        for edge in self.core.edges_directed(idx, Direction::Outgoing) {
            if edge.weight().type_id == self.is_a_type_id {
                steps.push((edge.target(), edge.weight()));
            }
        }
        for edge in self.core.edges_directed(idx, Direction::Incoming) {
            if edge.weight().type_id == self.is_a_type_id {
                steps.push((edge.source(), edge.weight()));
            }
        }
        steps
    }

    fn closure(&self, start: NodeIndex, direction: Direction) -> Result<ConceptSet> {
        let mut visited = AHashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        let mut result = ConceptSet::new();
        while let Some(current) = queue.pop_front() {
            for next in self.hierarchy_neighbours(current, direction) {
                if visited.insert(next) {
                    result.insert(self.details_of(next)?);
                    queue.push_back(next);
                }
            }
        }
        Ok(result)
    }
}
