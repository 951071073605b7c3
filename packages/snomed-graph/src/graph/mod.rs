//! Ontology graph
//!
//! [`OntologyGraph`] owns the graph core, the concept detail store and the
//! hierarchy configuration. It is built once by [`GraphBuilder`] (from rows,
//! an RF2 release or a snapshot) and is read-only afterwards, so it can be
//! shared across threads without locking.
//!
//! ```rust,ignore
//! use snomed_graph::{OntologyConfig, OntologyGraph};
//!
//! let graph = OntologyGraph::from_rf2("SnomedCT_InternationalRF2_PRODUCTION_20240101T120000Z", OntologyConfig::default())?;
//! let ancestors = graph.get_ancestors(22298006)?;
//! graph.save("snomed.gml")?;
//! ```

pub mod builder;
pub mod topology;
pub mod query;
pub mod table;

pub use builder::{placeholder_details, BuildStats, GraphBuilder};
pub use topology::GraphCore;
pub use query::{ConceptSet, QueryEngine};
pub use table::{ConceptRecord, TableView};

use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::config::{HierarchyConfig, OntologyConfig};
use crate::domain::{
    ConceptDetails, ConceptId, ConceptStore, Relationship, RelationshipGroup, RelationshipRecord,
};
use crate::errors::Result;
use crate::infrastructure::{gml, Rf2Release};

/// Summary counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub concepts: usize,
    pub relationships: usize,
    pub hierarchy_edges: usize,
    pub inferred_edges: usize,
    pub relationship_types: usize,
}

#[derive(Debug)]
pub struct OntologyGraph {
    core: GraphCore,
    details: ConceptStore,
    hierarchy: HierarchyConfig,
    build_stats: BuildStats,
}

impl OntologyGraph {
    pub(crate) fn from_parts(
        core: GraphCore,
        details: ConceptStore,
        hierarchy: HierarchyConfig,
        build_stats: BuildStats,
    ) -> Self {
        Self {
            core,
            details,
            hierarchy,
            build_stats,
        }
    }

    // ── construction ────────────────────────────────────────────────────────

    /// Build from an RF2 release directory
    pub fn from_rf2(dir: impl AsRef<Path>, config: OntologyConfig) -> Result<Self> {
        let release = Rf2Release::open(dir, &config.descriptions)?;
        GraphBuilder::new(config).build_from(release)
    }

    /// Restore a graph written by [`OntologyGraph::save`]
    pub fn from_serialized(path: impl AsRef<Path>, config: OntologyConfig) -> Result<Self> {
        gml::load_from_path(path, &config)
    }

    /// Write a GML snapshot
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        gml::save_to_path(self, path)
    }

    // ── accessors ───────────────────────────────────────────────────────────

    pub fn query(&self) -> QueryEngine<'_> {
        QueryEngine::new(&self.core, &self.details, self.hierarchy)
    }

    pub fn core(&self) -> &GraphCore {
        &self.core
    }

    pub fn hierarchy(&self) -> HierarchyConfig {
        self.hierarchy
    }

    pub fn build_stats(&self) -> &BuildStats {
        &self.build_stats
    }

    /// Number of concepts
    pub fn len(&self) -> usize {
        self.core.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.core.edge_count()
    }

    pub fn contains(&self, id: ConceptId) -> bool {
        self.core.contains(id)
    }

    /// Concept details in storage order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ConceptDetails>> + '_ {
        self.core
            .concept_ids()
            .filter_map(move |id| self.details.get(id))
    }

    /// Distinct relationship type labels
    pub fn relationship_types(&self) -> BTreeSet<String> {
        self.core
            .edges()
            .map(|edge| edge.weight().type_label.to_string())
            .collect()
    }

    pub fn stats(&self) -> GraphStats {
        let is_a = self.hierarchy.is_a_type_id;
        let hierarchy_edges = self
            .core
            .edges()
            .filter(|edge| edge.weight().type_id == is_a)
            .count();

        GraphStats {
            concepts: self.len(),
            relationships: self.edge_count(),
            hierarchy_edges,
            inferred_edges: self.edge_count() - hierarchy_edges,
            relationship_types: self.relationship_types().len(),
        }
    }

    /// Node table sorted by id and edge table in storage order
    pub fn to_table_view(&self) -> TableView {
        let mut concepts: Vec<ConceptRecord> = self
            .iter()
            .map(|c| ConceptRecord::new(c.id, &c.fsn, &c.synonyms))
            .collect();
        concepts.sort_by_key(|c| c.id);

        let relationships = self
            .core
            .edges()
            .map(|edge| {
                let attrs = edge.weight();
                RelationshipRecord {
                    source: self.core.concept_id(edge.source()),
                    target: self.core.concept_id(edge.target()),
                    group: attrs.group,
                    type_label: attrs.type_label.to_string(),
                    type_id: attrs.type_id,
                }
            })
            .collect();

        TableView {
            concepts,
            relationships,
        }
    }

    // ── queries (see QueryEngine) ───────────────────────────────────────────

    pub fn get_concept_details(&self, id: ConceptId) -> Result<Arc<ConceptDetails>> {
        self.query().get_concept_details(id)
    }

    pub fn get_parents(&self, id: ConceptId) -> Result<Vec<Arc<ConceptDetails>>> {
        self.query().get_parents(id)
    }

    pub fn get_children(&self, id: ConceptId) -> Result<Vec<Arc<ConceptDetails>>> {
        self.query().get_children(id)
    }

    pub fn get_ancestors(&self, id: ConceptId) -> Result<ConceptSet> {
        self.query().get_ancestors(id)
    }

    pub fn get_descendants(&self, id: ConceptId) -> Result<ConceptSet> {
        self.query().get_descendants(id)
    }

    pub fn get_neighbourhood(&self, id: ConceptId) -> Result<ConceptSet> {
        self.query().get_neighbourhood(id)
    }

    pub fn get_inferred_relationships(&self, id: ConceptId) -> Result<Vec<RelationshipGroup>> {
        self.query().get_inferred_relationships(id)
    }

    pub fn find_path(&self, from: ConceptId, to: ConceptId) -> Result<Vec<Relationship>> {
        self.query().find_path(from, to)
    }
}

impl fmt::Display for OntologyGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SNOMED graph has {} vertices and {} edges",
            self.len(),
            self.edge_count()
        )
    }
}

impl<'a> IntoIterator for &'a OntologyGraph {
    type Item = &'a Arc<ConceptDetails>;
    type IntoIter = Box<dyn Iterator<Item = &'a Arc<ConceptDetails>> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::IS_A_TYPE_ID;
    use crate::domain::{ConceptRow, RelationshipRow};

    /// Root ← Child ← Grandchild, plus Child --foo--> Grandchild in group 1
    pub fn small_graph() -> OntologyGraph {
        let concepts = vec![
            ConceptRow::simple(1, "Root (body structure)", ["RootSyn"]),
            ConceptRow::simple(2, "Child (body structure)", ["ChildSyn"]),
            ConceptRow::simple(3, "Grandchild (body structure)", ["GrandChildSyn"]),
        ];
        let relationships = vec![
            RelationshipRow::new(2, 1, IS_A_TYPE_ID, 0).with_label("is a"),
            RelationshipRow::new(3, 2, IS_A_TYPE_ID, 0).with_label("is a"),
            RelationshipRow::new(2, 3, 999, 1).with_label("foo"),
        ];

        match GraphBuilder::default().build(concepts, relationships) {
            Ok(graph) => graph,
            Err(e) => panic!("fixture graph failed to build: {e}"),
        }
    }
}
