//! Concept details and the concept detail store

use ahash::AHashMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::errors::{OntologyError, Result};

/// SNOMED CT identifier (SCTID)
pub type ConceptId = u64;

lazy_static! {
    /// Trailing parenthesized semantic tag: "Heart (organ)" -> "organ"
    static ref SEMANTIC_TAG: Regex = Regex::new(r"\(([^()]*)\)\s*$").unwrap();
}

/// Semantic tag of a fully specified name, if it has one
pub fn semantic_tag(fsn: &str) -> Option<&str> {
    SEMANTIC_TAG
        .captures(fsn)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Fully specified name without its semantic tag: "Is a (attribute)" -> "Is a"
pub fn strip_semantic_tag(fsn: &str) -> &str {
    match SEMANTIC_TAG.find(fsn) {
        Some(m) => {
            let stripped = fsn[..m.start()].trim_end();
            if stripped.is_empty() {
                fsn
            } else {
                stripped
            }
        }
        None => fsn,
    }
}

/// Human-readable details of one concept
///
/// Equality, ordering and hashing use `id` only: two records with the same
/// identifier are the same concept whatever names they carry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptDetails {
    pub id: ConceptId,
    /// Fully specified name
    pub fsn: String,
    /// Alternate names, in source order
    pub synonyms: Vec<String>,
}

impl ConceptDetails {
    pub fn new(id: ConceptId, fsn: impl Into<String>, synonyms: Vec<String>) -> Self {
        Self {
            id,
            fsn: fsn.into(),
            synonyms,
        }
    }

    /// Semantic tag of the fully specified name ("organ" for "Heart (organ)")
    pub fn hierarchy(&self) -> Result<&str> {
        semantic_tag(&self.fsn).ok_or(OntologyError::MissingSemanticTag(self.id))
    }
}

impl PartialEq for ConceptDetails {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConceptDetails {}

impl Hash for ConceptDetails {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for ConceptDetails {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ConceptDetails {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for ConceptDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.id, self.fsn)
    }
}

/// Concept id -> details side table. Filled by the builder, read-only afterwards.
#[derive(Debug, Default)]
pub struct ConceptStore {
    details: AHashMap<ConceptId, Arc<ConceptDetails>>,
}

impl ConceptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, details: ConceptDetails) -> Arc<ConceptDetails> {
        let details = Arc::new(details);
        self.details.insert(details.id, Arc::clone(&details));
        details
    }

    pub fn get(&self, id: ConceptId) -> Option<&Arc<ConceptDetails>> {
        self.details.get(&id)
    }

    pub fn contains(&self, id: ConceptId) -> bool {
        self.details.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.details.len()
    }

    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }
}
