//! Source rows consumed by the graph builder
//!
//! Every construction path (in-memory rows, RF2 release files, GML snapshots)
//! ends up as [`SourceRows`]; the loaders only implement [`RowSource`].

use serde::{Deserialize, Serialize};

use super::concept::ConceptId;
use crate::config::DescriptionConfig;
use crate::errors::Result;

/// One description (name) of a concept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionRow {
    pub language_code: String,
    pub type_id: ConceptId,
    pub term: String,
}

/// One concept with all of its descriptions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptRow {
    pub id: ConceptId,
    pub active: bool,
    pub descriptions: Vec<DescriptionRow>,
}

impl ConceptRow {
    /// Active concept with one FSN and the given synonyms, typed per `descriptions`
    pub fn named(
        id: ConceptId,
        fsn: impl Into<String>,
        synonyms: impl IntoIterator<Item = impl Into<String>>,
        descriptions: &DescriptionConfig,
    ) -> Self {
        let mut rows = vec![DescriptionRow {
            language_code: descriptions.language.clone(),
            type_id: descriptions.fsn_type_id,
            term: fsn.into(),
        }];
        rows.extend(synonyms.into_iter().map(|term| DescriptionRow {
            language_code: descriptions.language.clone(),
            type_id: descriptions.synonym_type_id,
            term: term.into(),
        }));

        Self {
            id,
            active: true,
            descriptions: rows,
        }
    }

    /// [`ConceptRow::named`] with the default description types
    pub fn simple(
        id: ConceptId,
        fsn: impl Into<String>,
        synonyms: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::named(id, fsn, synonyms, &DescriptionConfig::default())
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// One relationship row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRow {
    pub source: ConceptId,
    pub target: ConceptId,
    pub type_id: ConceptId,
    pub group: u32,
    pub active: bool,
    /// Pre-resolved label; resolved by the builder when absent
    pub type_label: Option<String>,
}

impl RelationshipRow {
    pub fn new(source: ConceptId, target: ConceptId, type_id: ConceptId, group: u32) -> Self {
        Self {
            source,
            target,
            type_id,
            group,
            active: true,
            type_label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.type_label = Some(label.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Everything the builder needs for one build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRows {
    pub concepts: Vec<ConceptRow>,
    pub relationships: Vec<RelationshipRow>,
    /// Labels for relationship types that are not concepts of the graph
    pub type_labels: Vec<(ConceptId, String)>,
}

/// Anything that can produce builder input
pub trait RowSource {
    fn into_rows(self) -> Result<SourceRows>;
}

impl RowSource for SourceRows {
    fn into_rows(self) -> Result<SourceRows> {
        Ok(self)
    }
}
