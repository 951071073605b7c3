//! Domain models
//!
//! - `ConceptDetails` / `ConceptStore`: node detail side table
//! - `EdgeAttrs`, `Relationship`, `RelationshipGroup`: edge model
//! - `ConceptRow`, `RelationshipRow`, `RowSource`: builder input

pub mod concept;
pub mod relationship;
pub mod rows;

pub use concept::{semantic_tag, strip_semantic_tag, ConceptDetails, ConceptId, ConceptStore};
pub use relationship::{EdgeAttrs, Relationship, RelationshipGroup, RelationshipRecord};
pub use rows::{ConceptRow, DescriptionRow, RelationshipRow, RowSource, SourceRows};
