//! Configuration
//!
//! Everything the builder and the query engine need to know about the
//! terminology release: which relationship type is "is a", which description
//! types carry the fully specified name and synonyms, and how to treat rows
//! that reference unknown concepts.
//!
//! ```rust,ignore
//! use snomed_graph::config::OntologyConfig;
//!
//! let config = OntologyConfig::default();
//! let config = OntologyConfig::from_yaml("snomed.yaml")?;
//! ```

pub mod error;
pub mod ontology_config;

pub use error::{ConfigError, ConfigResult};
pub use ontology_config::{
    BuilderConfig, DanglingPolicy, DescriptionConfig, HierarchyConfig, OntologyConfig,
    FSN_TYPE_ID, IS_A_TYPE_ID, SYNONYM_TYPE_ID,
};
