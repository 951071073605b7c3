//! Tabular projections of the graph for downstream analytics

use serde::{Deserialize, Serialize};

use crate::domain::{semantic_tag, ConceptId, RelationshipRecord};

/// One row per concept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptRecord {
    pub id: ConceptId,
    pub fsn: String,
    /// Semantic tag, absent when the name has none
    pub hierarchy: Option<String>,
    pub synonyms: Vec<String>,
}

impl ConceptRecord {
    pub fn new(id: ConceptId, fsn: &str, synonyms: &[String]) -> Self {
        Self {
            id,
            fsn: fsn.to_string(),
            hierarchy: semantic_tag(fsn).map(str::to_string),
            synonyms: synonyms.to_vec(),
        }
    }
}

/// Node table (sorted by id) and edge table (storage order)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableView {
    pub concepts: Vec<ConceptRecord>,
    pub relationships: Vec<RelationshipRecord>,
}

impl TableView {
    pub fn concept(&self, id: ConceptId) -> Option<&ConceptRecord> {
        self.concepts
            .binary_search_by_key(&id, |c| c.id)
            .ok()
            .map(|pos| &self.concepts[pos])
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concept_record_hierarchy() {
        let record = ConceptRecord::new(1, "Heart (organ)", &["Cardiac".to_string()]);
        assert_eq!(record.hierarchy.as_deref(), Some("organ"));

        let record = ConceptRecord::new(2, "untagged", &[]);
        assert!(record.hierarchy.is_none());
    }

    #[test]
    fn test_lookup_and_json() {
        let view = TableView {
            concepts: vec![
                ConceptRecord::new(1, "A (a)", &[]),
                ConceptRecord::new(5, "B (b)", &[]),
            ],
            relationships: vec![RelationshipRecord {
                source: 5,
                target: 1,
                group: 0,
                type_label: "is a".to_string(),
                type_id: 116_680_003,
            }],
        };

        assert_eq!(view.concept(5).unwrap().fsn, "B (b)");
        assert!(view.concept(3).is_none());

        let json = view.to_json().unwrap();
        assert!(json.contains("\"type\": \"is a\""));
        let parsed: TableView = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, view);
    }
}
