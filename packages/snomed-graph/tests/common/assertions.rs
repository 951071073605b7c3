//! Assertions over query results

use snomed_graph::{ConceptId, ConceptSet, Relationship};

/// Ids of a concept set, ascending
pub fn ids(set: &ConceptSet) -> Vec<ConceptId> {
    set.iter().map(|c| c.id).collect()
}

pub fn assert_ids(set: &ConceptSet, expected: &[ConceptId]) {
    let mut expected = expected.to_vec();
    expected.sort_unstable();
    assert_eq!(ids(set), expected, "concept set mismatch");
}

/// Path is a chain of steps leading from `from` to `to`
pub fn assert_path_connects(path: &[Relationship], from: ConceptId, to: ConceptId) {
    assert!(!path.is_empty(), "expected a non-empty path from {from} to {to}");
    assert_eq!(path[0].src.id, from, "path starts at the wrong concept");
    assert_eq!(path[path.len() - 1].tgt.id, to, "path ends at the wrong concept");
    for window in path.windows(2) {
        assert_eq!(
            window[0].tgt.id, window[1].src.id,
            "path breaks between {} and {}",
            window[0], window[1]
        );
    }
}
