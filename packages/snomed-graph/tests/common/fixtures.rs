//! Test fixtures
//!
//! A small cardiology slice of SNOMED CT with real identifiers, and the path
//! to the dummy RF2 release under `tests/data`.

use snomed_graph::config::IS_A_TYPE_ID;
use snomed_graph::{ConceptId, ConceptRow, GraphBuilder, OntologyGraph, RelationshipRow};
use std::path::PathBuf;

pub const ROOT: ConceptId = 138_875_005;
pub const CLINICAL_FINDING: ConceptId = 404_684_003;
pub const DISEASE: ConceptId = 64_572_001;
pub const HEART_DISEASE: ConceptId = 56_265_001;
pub const ISCHEMIC_HEART_DISEASE: ConceptId = 414_545_008;
pub const MYOCARDIAL_DISEASE: ConceptId = 57_809_008;
pub const MYOCARDIAL_INFARCTION: ConceptId = 22_298_006;

pub const BODY_STRUCTURE: ConceptId = 123_037_004;
pub const HEART_STRUCTURE: ConceptId = 80_891_009;
pub const MYOCARDIUM_STRUCTURE: ConceptId = 74_281_007;
pub const ABNORMAL_STRUCTURE: ConceptId = 49_755_003;
pub const INFARCT: ConceptId = 55_641_003;

pub const QUALIFIER_VALUE: ConceptId = 362_981_000;
pub const SUDDEN_ONSET: ConceptId = 424_124_008;

pub const ATTRIBUTE: ConceptId = 410_662_002;
pub const IS_A: ConceptId = IS_A_TYPE_ID;
pub const FINDING_SITE: ConceptId = 363_698_007;
pub const ASSOCIATED_MORPHOLOGY: ConceptId = 116_676_008;
pub const CLINICAL_COURSE: ConceptId = 263_502_005;

/// Isolated concept with no relationships at all
pub const ORPHAN: ConceptId = 900_000_000_000_441_003;

pub fn clinical_concepts() -> Vec<ConceptRow> {
    vec![
        ConceptRow::simple(ROOT, "SNOMED CT Concept (SNOMED RT+CTV3)", ["SNOMED CT Concept"]),
        ConceptRow::simple(CLINICAL_FINDING, "Clinical finding (finding)", ["Clinical finding"]),
        ConceptRow::simple(DISEASE, "Disease (disorder)", ["Disease", "Disorder"]),
        ConceptRow::simple(HEART_DISEASE, "Heart disease (disorder)", ["Heart disease"]),
        ConceptRow::simple(
            ISCHEMIC_HEART_DISEASE,
            "Ischemic heart disease (disorder)",
            ["Ischaemic heart disease", "IHD"],
        ),
        ConceptRow::simple(MYOCARDIAL_DISEASE, "Myocardial disease (disorder)", ["Myocardial disease"]),
        ConceptRow::simple(
            MYOCARDIAL_INFARCTION,
            "Myocardial infarction (disorder)",
            ["Heart attack", "Cardiac infarction", "MI - Myocardial infarction"],
        ),
        ConceptRow::simple(BODY_STRUCTURE, "Body structure (body structure)", ["Body structure"]),
        ConceptRow::simple(HEART_STRUCTURE, "Heart structure (body structure)", ["Heart"]),
        ConceptRow::simple(MYOCARDIUM_STRUCTURE, "Myocardium structure (body structure)", ["Myocardium"]),
        ConceptRow::simple(
            ABNORMAL_STRUCTURE,
            "Morphologically abnormal structure (morphologic abnormality)",
            ["Morphologically abnormal structure"],
        ),
        ConceptRow::simple(INFARCT, "Infarct (morphologic abnormality)", ["Infarct"]),
        ConceptRow::simple(QUALIFIER_VALUE, "Qualifier value (qualifier value)", ["Qualifier value"]),
        ConceptRow::simple(
            SUDDEN_ONSET,
            "Sudden onset AND/OR short duration (qualifier value)",
            ["Sudden onset AND/OR short duration"],
        ),
        ConceptRow::simple(ATTRIBUTE, "Concept model attribute (attribute)", ["Attribute"]),
        ConceptRow::simple(IS_A, "Is a (attribute)", ["Is a"]),
        ConceptRow::simple(FINDING_SITE, "Finding site (attribute)", ["Finding site"]),
        ConceptRow::simple(ASSOCIATED_MORPHOLOGY, "Associated morphology (attribute)", ["Associated morphology"]),
        ConceptRow::simple(CLINICAL_COURSE, "Clinical course (attribute)", ["Clinical course"]),
        ConceptRow::simple(ORPHAN, "Orphan concept (foundation metadata concept)", Vec::<String>::new()),
    ]
}

pub fn clinical_relationships() -> Vec<RelationshipRow> {
    let is_a = |child, parent| RelationshipRow::new(child, parent, IS_A_TYPE_ID, 0);
    vec![
        is_a(CLINICAL_FINDING, ROOT),
        is_a(DISEASE, CLINICAL_FINDING),
        is_a(HEART_DISEASE, DISEASE),
        is_a(ISCHEMIC_HEART_DISEASE, HEART_DISEASE),
        is_a(MYOCARDIAL_DISEASE, HEART_DISEASE),
        is_a(MYOCARDIAL_INFARCTION, ISCHEMIC_HEART_DISEASE),
        is_a(MYOCARDIAL_INFARCTION, MYOCARDIAL_DISEASE),
        is_a(BODY_STRUCTURE, ROOT),
        is_a(HEART_STRUCTURE, BODY_STRUCTURE),
        is_a(MYOCARDIUM_STRUCTURE, HEART_STRUCTURE),
        is_a(ABNORMAL_STRUCTURE, BODY_STRUCTURE),
        is_a(INFARCT, ABNORMAL_STRUCTURE),
        is_a(QUALIFIER_VALUE, ROOT),
        is_a(SUDDEN_ONSET, QUALIFIER_VALUE),
        is_a(ATTRIBUTE, ROOT),
        is_a(IS_A, ATTRIBUTE),
        is_a(FINDING_SITE, ATTRIBUTE),
        is_a(ASSOCIATED_MORPHOLOGY, ATTRIBUTE),
        is_a(CLINICAL_COURSE, ATTRIBUTE),
        // defining attributes
        RelationshipRow::new(HEART_DISEASE, HEART_STRUCTURE, FINDING_SITE, 1),
        RelationshipRow::new(MYOCARDIAL_INFARCTION, MYOCARDIUM_STRUCTURE, FINDING_SITE, 1),
        RelationshipRow::new(MYOCARDIAL_INFARCTION, INFARCT, ASSOCIATED_MORPHOLOGY, 1),
        RelationshipRow::new(MYOCARDIAL_INFARCTION, SUDDEN_ONSET, CLINICAL_COURSE, 0),
    ]
}

pub fn clinical_graph() -> OntologyGraph {
    GraphBuilder::default()
        .build(clinical_concepts(), clinical_relationships())
        .expect("clinical fixture builds")
}

/// Dummy RF2 release: concepts 1 and 2 (3 retired), one relationship 1 -> 2 of type 999
pub fn rf2_release_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join("rf2")
        .join("SnomedCT_DummyRF2_PRODUCTION_20230101T000000Z")
}
