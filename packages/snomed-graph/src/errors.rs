//! Error types for snomed-graph
//!
//! One error enum for the whole crate. Configuration problems keep their own
//! [`ConfigError`] and are wrapped here.

use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::ConceptId;

/// Main error type for graph construction, queries and snapshots
#[derive(Debug, Error)]
pub enum OntologyError {
    /// Query on an identifier that is not a node of the graph
    #[error("Concept not found: {0}")]
    ConceptNotFound(ConceptId),

    /// Path search between disconnected concepts
    #[error("No path found between {from} and {to}")]
    NoPathFound { from: ConceptId, to: ConceptId },

    /// Source rows cannot produce a graph (missing/ambiguous FSN, missing column, bad field)
    #[error("Malformed source: {0}")]
    MalformedSource(String),

    /// Relationship endpoint without a concept row (reject policy)
    #[error("Relationship {from} -> {to} references unknown concept {missing}")]
    DanglingEdgeReference {
        from: ConceptId,
        to: ConceptId,
        missing: ConceptId,
    },

    /// Structurally invalid snapshot document
    #[error("Corrupt snapshot (line {line}): {message}")]
    CorruptSnapshot { line: usize, message: String },

    /// Hierarchy tag requested on a name without a parenthesized suffix
    #[error("Concept {0} has no semantic tag in its fully specified name")]
    MissingSemanticTag(ConceptId),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl OntologyError {
    /// Create a malformed-source error
    pub fn malformed(msg: impl Into<String>) -> Self {
        OntologyError::MalformedSource(msg.into())
    }

    /// Create a corrupt-snapshot error at `line` (1-based)
    pub fn corrupt(line: usize, msg: impl Into<String>) -> Self {
        OntologyError::CorruptSnapshot {
            line,
            message: msg.into(),
        }
    }

    /// True for errors that only mean "nothing matched" rather than bad input
    pub fn is_lookup_miss(&self) -> bool {
        matches!(
            self,
            OntologyError::ConceptNotFound(_) | OntologyError::NoPathFound { .. }
        )
    }
}

/// Result type alias for snomed-graph operations
pub type Result<T> = std::result::Result<T, OntologyError>;
