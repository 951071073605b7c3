//! Graph builder
//!
//! Turns concept rows and relationship rows into the graph core plus the
//! concept detail store in one sequential pass:
//!
//! 1. **Concepts**: aggregate description rows per concept id, pick exactly
//!    one fully specified name, collect synonyms, add the node
//! 2. **Relationships**: check endpoints against the dangling-reference
//!    policy, resolve the type label, add the edge
//!
//! Any error aborts the build; no partial graph is returned.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::topology::GraphCore;
use super::OntologyGraph;
use crate::config::{DanglingPolicy, DescriptionConfig, OntologyConfig};
use crate::domain::{
    strip_semantic_tag, ConceptDetails, ConceptId, ConceptRow, ConceptStore, DescriptionRow,
    EdgeAttrs, RelationshipRow, RowSource,
};
use crate::errors::{OntologyError, Result};

/// Counters collected during one build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    pub concepts: usize,
    pub relationships: usize,
    pub skipped_inactive_concepts: usize,
    pub skipped_inactive_relationships: usize,
    pub placeholder_concepts: usize,
    /// Relationship types whose label fell back to the identifier
    pub unresolved_type_labels: usize,
}

pub struct GraphBuilder {
    config: OntologyConfig,

    /// Labels for relationship types that are not graph concepts
    type_labels: AHashMap<ConceptId, String>,
}

impl GraphBuilder {
    pub fn new(config: OntologyConfig) -> Self {
        Self {
            config,
            type_labels: AHashMap::new(),
        }
    }

    /// Add labels for relationship types (later entries win)
    pub fn with_type_labels(mut self, labels: impl IntoIterator<Item = (ConceptId, String)>) -> Self {
        self.type_labels.extend(labels);
        self
    }

    pub fn config(&self) -> &OntologyConfig {
        &self.config
    }

    /// Build from any row source (RF2 release, snapshot, in-memory rows)
    pub fn build_from<S: RowSource>(self, source: S) -> Result<OntologyGraph> {
        let rows = source.into_rows()?;
        self.with_type_labels(rows.type_labels)
            .build(rows.concepts, rows.relationships)
    }

    /// Build the graph from concept rows and relationship rows
    pub fn build<C, R>(&self, concept_rows: C, relationship_rows: R) -> Result<OntologyGraph>
    where
        C: IntoIterator<Item = ConceptRow>,
        R: IntoIterator<Item = RelationshipRow>,
    {
        self.config.validate()?;

        let mut stats = BuildStats::default();
        let mut core = GraphCore::new();
        let mut details = ConceptStore::new();

        // Phase 1: concepts
        let concepts = self.aggregate_concepts(concept_rows, &mut stats);
        debug!("build: {} distinct active concepts", concepts.len());

        for (id, descriptions) in concepts {
            let concept = select_names(id, &descriptions, &self.config.descriptions)?;
            details.insert(concept);
            core.add_concept(id);
        }
        stats.concepts = core.node_count();

        // Phase 2: relationships
        let mut labels: AHashMap<ConceptId, Arc<str>> = AHashMap::new();
        for row in relationship_rows {
            if !row.active && self.config.builder.skip_inactive {
                stats.skipped_inactive_relationships += 1;
                continue;
            }

            let source = self.endpoint(&row, row.source, &mut core, &mut details, &mut stats)?;
            let target = self.endpoint(&row, row.target, &mut core, &mut details, &mut stats)?;

            let type_label = match row.type_label {
                Some(label) => Arc::from(label),
                None => self.resolve_label(row.type_id, &details, &mut labels, &mut stats),
            };

            core.add_relationship(
                source,
                target,
                EdgeAttrs {
                    group: row.group,
                    type_label,
                    type_id: row.type_id,
                },
            );
        }
        stats.relationships = core.edge_count();
        stats.concepts = core.node_count();

        info!(
            "build: {} concepts, {} relationships (skipped {} inactive concepts, {} inactive relationships, {} placeholders, {} unresolved type labels)",
            stats.concepts,
            stats.relationships,
            stats.skipped_inactive_concepts,
            stats.skipped_inactive_relationships,
            stats.placeholder_concepts,
            stats.unresolved_type_labels
        );

        Ok(OntologyGraph::from_parts(
            core,
            details,
            self.config.hierarchy,
            stats,
        ))
    }

    /// Merge description rows per concept id, keeping first-seen order
    fn aggregate_concepts<C>(
        &self,
        concept_rows: C,
        stats: &mut BuildStats,
    ) -> Vec<(ConceptId, Vec<DescriptionRow>)>
    where
        C: IntoIterator<Item = ConceptRow>,
    {
        let mut order: Vec<ConceptId> = Vec::new();
        let mut merged: AHashMap<ConceptId, Vec<DescriptionRow>> = AHashMap::new();

        for row in concept_rows {
            if !row.active && self.config.builder.skip_inactive {
                stats.skipped_inactive_concepts += 1;
                continue;
            }
            let entry = merged.entry(row.id).or_insert_with(|| {
                order.push(row.id);
                Vec::new()
            });
            entry.extend(row.descriptions);
        }

        order
            .into_iter()
            .filter_map(|id| merged.remove(&id).map(|descriptions| (id, descriptions)))
            .collect()
    }

    /// Node index for a relationship endpoint, applying the dangling policy
    fn endpoint(
        &self,
        row: &RelationshipRow,
        id: ConceptId,
        core: &mut GraphCore,
        details: &mut ConceptStore,
        stats: &mut BuildStats,
    ) -> Result<petgraph::graph::NodeIndex> {
        if let Some(idx) = core.node_index(id) {
            return Ok(idx);
        }

        match self.config.builder.dangling_references {
            DanglingPolicy::Reject => Err(OntologyError::DanglingEdgeReference {
                from: row.source,
                to: row.target,
                missing: id,
            }),
            DanglingPolicy::Placeholder => {
                warn!(
                    "build: relationship {} -> {} references unknown concept {}, adding placeholder",
                    row.source, row.target, id
                );
                details.insert(placeholder_details(id));
                stats.placeholder_concepts += 1;
                Ok(core.add_concept(id))
            }
        }
    }

    /// Label for a relationship type: side table, then graph concept, then the id
    fn resolve_label(
        &self,
        type_id: ConceptId,
        details: &ConceptStore,
        cache: &mut AHashMap<ConceptId, Arc<str>>,
        stats: &mut BuildStats,
    ) -> Arc<str> {
        if let Some(label) = cache.get(&type_id) {
            return Arc::clone(label);
        }

        let label: Arc<str> = if let Some(label) = self.type_labels.get(&type_id) {
            Arc::from(label.as_str())
        } else if let Some(concept) = details.get(type_id) {
            Arc::from(strip_semantic_tag(&concept.fsn))
        } else {
            warn!(
                "build: no label for relationship type {}, using the identifier",
                type_id
            );
            stats.unresolved_type_labels += 1;
            Arc::from(type_id.to_string())
        };

        cache.insert(type_id, Arc::clone(&label));
        label
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(OntologyConfig::default())
    }
}

/// Detail record for a concept that only appears as a relationship endpoint
pub fn placeholder_details(id: ConceptId) -> ConceptDetails {
    ConceptDetails::new(id, format!("{} (unknown)", id), Vec::new())
}

/// Pick the fully specified name and synonyms among a concept's descriptions
///
/// Exactly one distinct FSN term in the configured language is required.
fn select_names(
    id: ConceptId,
    descriptions: &[DescriptionRow],
    config: &DescriptionConfig,
) -> Result<ConceptDetails> {
    let in_language = |d: &&DescriptionRow| d.language_code.eq_ignore_ascii_case(&config.language);

    let mut fsns: Vec<&str> = Vec::new();
    let mut synonyms: Vec<String> = Vec::new();
    for description in descriptions.iter().filter(in_language) {
        if description.type_id == config.fsn_type_id {
            if !fsns.contains(&description.term.as_str()) {
                fsns.push(&description.term);
            }
        } else if description.type_id == config.synonym_type_id
            && !synonyms.contains(&description.term)
        {
            synonyms.push(description.term.clone());
        }
    }

    match fsns.as_slice() {
        [fsn] => Ok(ConceptDetails::new(id, *fsn, synonyms)),
        [] => Err(OntologyError::malformed(format!(
            "concept {} has no fully specified name in language '{}'",
            id, config.language
        ))),
        many => Err(OntologyError::malformed(format!(
            "concept {} has {} fully specified names: {}",
            id,
            many.len(),
            many.join(" / ")
        ))),
    }
}
