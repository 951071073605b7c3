//! snomed-graph - in-memory SNOMED CT concept graph
//!
//! Builds a directed multigraph of concepts and relationships from an RF2
//! release (or from in-memory rows), answers hierarchy and proximity queries,
//! and persists the whole graph as a GML snapshot.
//!
//! ## Layout
//!
//! - `domain/`: concept details, relationships, builder input rows
//! - `graph/`: graph core, builder, query engine, table view
//! - `infrastructure/`: RF2 reader, GML snapshot codec
//! - `config/`: YAML configuration (schema v1)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use snomed_graph::{OntologyConfig, OntologyGraph};
//!
//! let graph = OntologyGraph::from_rf2("SnomedCT_InternationalRF2_PRODUCTION_20240101T120000Z", OntologyConfig::default())?;
//! println!("{}", graph);
//!
//! for parent in graph.get_parents(22298006)? {
//!     println!("{}", parent);
//! }
//! for group in graph.get_inferred_relationships(22298006)? {
//!     println!("{}", group);
//! }
//!
//! graph.save("snomed.gml")?;
//! let restored = OntologyGraph::from_serialized("snomed.gml", OntologyConfig::default())?;
//! ```

#![allow(clippy::new_without_default)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod domain;
pub mod errors;
pub mod graph;
pub mod infrastructure;

pub use config::{ConfigError, DanglingPolicy, OntologyConfig};
pub use domain::{
    ConceptDetails, ConceptId, ConceptRow, DescriptionRow, Relationship, RelationshipGroup,
    RelationshipRow, RowSource, SourceRows,
};
pub use errors::{OntologyError, Result};
pub use graph::{
    BuildStats, ConceptSet, GraphBuilder, GraphStats, OntologyGraph, QueryEngine, TableView,
};
pub use infrastructure::Rf2Release;
