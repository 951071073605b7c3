//! Snapshot save/load through real files

mod common;

use common::*;
use pretty_assertions::assert_eq;
use snomed_graph::{
    ConceptRow, DanglingPolicy, GraphBuilder, OntologyConfig, OntologyError, OntologyGraph,
    RelationshipRow,
};
use std::fs;
use tempfile::TempDir;

fn roundtrip(graph: &OntologyGraph, config: OntologyConfig) -> OntologyGraph {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("graph.gml");
    graph.save(&path).unwrap();
    OntologyGraph::from_serialized(&path, config).unwrap()
}

#[test]
fn test_clinical_graph_roundtrip() {
    let graph = clinical_graph();
    let restored = roundtrip(&graph, OntologyConfig::default());

    assert_eq!(restored.to_string(), graph.to_string());
    assert_eq!(restored.to_table_view(), graph.to_table_view());
    assert_eq!(restored.stats(), graph.stats());

    for concept in &graph {
        let id = concept.id;
        assert_eq!(
            ids(&restored.get_ancestors(id).unwrap()),
            ids(&graph.get_ancestors(id).unwrap())
        );
        assert_eq!(
            restored.get_inferred_relationships(id).unwrap(),
            graph.get_inferred_relationships(id).unwrap()
        );
    }

    let path = restored.find_path(MYOCARDIAL_INFARCTION, INFARCT).unwrap();
    assert_path_connects(&path, MYOCARDIAL_INFARCTION, INFARCT);
    assert_eq!(path.len(), graph.find_path(MYOCARDIAL_INFARCTION, INFARCT).unwrap().len());
}

#[test]
fn test_awkward_text_roundtrip() {
    let names = [
        "Sjögren's syndrome (disorder)",
        "Quote \"inside\" & ampersand (qualifier value)",
        "Bracket ] [ and # hash (qualifier value)",
        "Tab\tand\nnewline (qualifier value)",
        "Entity-looking &amp; text (qualifier value)",
        "日本語の名前 (finding)",
    ];
    let concepts: Vec<ConceptRow> = names
        .iter()
        .enumerate()
        .map(|(i, name)| ConceptRow::simple(i as u64 + 1, *name, [format!("syn {}", name)]))
        .collect();
    let relationships = vec![
        RelationshipRow::new(2, 1, 7, 3).with_label("weird \"label\" & <more>"),
    ];
    let graph = GraphBuilder::default().build(concepts, relationships).unwrap();
    let restored = roundtrip(&graph, OntologyConfig::default());

    for (i, name) in names.iter().enumerate() {
        let details = restored.get_concept_details(i as u64 + 1).unwrap();
        assert_eq!(details.fsn, *name);
        assert_eq!(details.synonyms, vec![format!("syn {}", name)]);
    }
    let groups = restored.get_inferred_relationships(2).unwrap();
    assert_eq!(&*groups[0].relationships[0].type_label, "weird \"label\" & <more>");
    assert_eq!(groups[0].group, 3);
}

#[test]
fn test_empty_graph_roundtrip() {
    let graph = GraphBuilder::default()
        .build(Vec::<ConceptRow>::new(), Vec::<RelationshipRow>::new())
        .unwrap();
    let restored = roundtrip(&graph, OntologyConfig::default());
    assert!(restored.is_empty());
    assert_eq!(restored.edge_count(), 0);
}

#[test]
fn test_custom_hierarchy_type_survives() {
    let yaml = "version: 1\nhierarchy:\n  is_a_type_id: 42\n";
    let config = OntologyConfig::from_yaml_str(yaml).unwrap();

    let graph = GraphBuilder::new(config)
        .build(
            vec![
                ConceptRow::simple(1, "Parent (thing)", Vec::<String>::new()),
                ConceptRow::simple(2, "Child (thing)", Vec::<String>::new()),
            ],
            vec![RelationshipRow::new(2, 1, 42, 0).with_label("subtype of")],
        )
        .unwrap();

    // loaded with default config, the snapshot still knows 42 is the hierarchy
    let restored = roundtrip(&graph, OntologyConfig::default());
    assert_eq!(restored.hierarchy().is_a_type_id, 42);
    assert_eq!(restored.get_parents(2).unwrap()[0].id, 1);
    assert!(restored.get_inferred_relationships(2).unwrap().is_empty());
}

#[test]
fn test_placeholder_concepts_roundtrip() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("snomed.yaml");
    fs::write(
        &config_path,
        "version: 1\nbuilder:\n  dangling_references: placeholder\n",
    )
    .unwrap();
    let config = OntologyConfig::from_yaml(&config_path).unwrap();
    assert_eq!(config.builder.dangling_references, DanglingPolicy::Placeholder);

    let graph = GraphBuilder::new(config)
        .build(
            vec![ConceptRow::simple(1, "Known (thing)", Vec::<String>::new())],
            vec![RelationshipRow::new(1, 99, snomed_graph::config::IS_A_TYPE_ID, 0)],
        )
        .unwrap();
    assert_eq!(graph.get_concept_details(99).unwrap().fsn, "99 (unknown)");

    let restored = roundtrip(&graph, OntologyConfig::default());
    assert_eq!(restored.len(), 2);
    assert_eq!(restored.get_parents(1).unwrap()[0].fsn, "99 (unknown)");
}

#[test]
fn test_corrupt_snapshot_files() {
    let dir = TempDir::new().unwrap();
    let cases = [
        ("truncated.gml", "graph [\n  node [\n    id 1\n    label \"A (a)\"\n"),
        ("garbage.gml", "this is { not gml }\n"),
        ("no_label.gml", "graph [\n  node [ id 1 ]\n]\n"),
        (
            "dangling.gml",
            "graph [\n  node [ id 1 label \"A (a)\" ]\n  edge [ source 1 target 2 group 0 type \"t\" type_id 5 ]\n]\n",
        ),
    ];

    for (name, content) in cases {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        let err = OntologyGraph::from_serialized(&path, OntologyConfig::default()).unwrap_err();
        assert!(
            matches!(err, OntologyError::CorruptSnapshot { .. }),
            "{name}: unexpected error {err:?}"
        );
    }
}

#[test]
fn test_missing_snapshot_file() {
    let dir = TempDir::new().unwrap();
    let err = OntologyGraph::from_serialized(dir.path().join("absent.gml"), OntologyConfig::default())
        .unwrap_err();
    assert!(matches!(err, OntologyError::Io(_)));
}
