//! Relationships (edges) and relationship groups

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::concept::{ConceptDetails, ConceptId};

/// Edge weight stored in the graph core
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeAttrs {
    /// Role group; 0 means ungrouped
    pub group: u32,
    pub type_label: Arc<str>,
    pub type_id: ConceptId,
}

/// One relationship joined with the details of both endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub src: Arc<ConceptDetails>,
    pub tgt: Arc<ConceptDetails>,
    pub group: u32,
    pub type_label: Arc<str>,
    pub type_id: ConceptId,
}

impl Relationship {
    pub fn new(src: Arc<ConceptDetails>, tgt: Arc<ConceptDetails>, attrs: &EdgeAttrs) -> Self {
        Self {
            src,
            tgt,
            group: attrs.group,
            type_label: Arc::clone(&attrs.type_label),
            type_id: attrs.type_id,
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ---[{}]---> [{}]", self.src, self.type_label, self.tgt)
    }
}

/// Relationships of one source concept sharing a group number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipGroup {
    pub group: u32,
    pub relationships: Vec<Relationship>,
}

impl RelationshipGroup {
    pub fn new(group: u32, relationships: Vec<Relationship>) -> Self {
        Self {
            group,
            relationships,
        }
    }

    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }
}

impl fmt::Display for RelationshipGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Group {}", self.group)?;
        for relationship in &self.relationships {
            write!(f, "\n\t{}", relationship)?;
        }
        Ok(())
    }
}

/// Flat relationship record for tabular export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub source: ConceptId,
    pub target: ConceptId,
    pub group: u32,
    #[serde(rename = "type")]
    pub type_label: String,
    pub type_id: ConceptId,
}
