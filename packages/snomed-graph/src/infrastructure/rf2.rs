//! RF2 snapshot release reader
//!
//! Reads the three terminology files of an RF2 release
//! (`<release>/Snapshot/Terminology/sct2_{Concept,Description,Relationship}_Snapshot*.txt`)
//! into builder rows. Files are tab-separated with a header row; columns are
//! located by header name, so extra or reordered columns are fine.

use ahash::AHashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::DescriptionConfig;
use crate::domain::{
    strip_semantic_tag, ConceptId, ConceptRow, DescriptionRow, RelationshipRow, RowSource,
    SourceRows,
};
use crate::errors::{OntologyError, Result};

const CONCEPT_PREFIX: &str = "sct2_Concept_Snapshot";
const DESCRIPTION_PREFIX: &str = "sct2_Description_Snapshot";
const RELATIONSHIP_PREFIX: &str = "sct2_Relationship_Snapshot";

/// Located RF2 release, read lazily by [`RowSource::into_rows`]
#[derive(Debug, Clone)]
pub struct Rf2Release {
    root: PathBuf,
    concept_file: PathBuf,
    description_file: PathBuf,
    relationship_file: PathBuf,
    descriptions: DescriptionConfig,
}

impl Rf2Release {
    /// Locate the snapshot files of the release rooted at `dir`
    ///
    /// The description file is the one for `descriptions.language`.
    pub fn open(dir: impl AsRef<Path>, descriptions: &DescriptionConfig) -> Result<Self> {
        let root = dir.as_ref().to_path_buf();
        let terminology = root.join("Snapshot").join("Terminology");
        debug!("rf2: scanning {}", terminology.display());

        let description_prefix = format!("{}-{}", DESCRIPTION_PREFIX, descriptions.language);
        let mut concept_file = None;
        let mut description_file = None;
        let mut relationship_file = None;

        let mut entries: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(&terminology).follow_links(true).max_depth(1) {
            let entry = entry.map_err(io::Error::from)?;
            if entry.file_type().is_file() {
                entries.push(entry.into_path());
            }
        }
        entries.sort();

        for path in entries {
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            let slot = if name.starts_with(CONCEPT_PREFIX) {
                &mut concept_file
            } else if name.starts_with(&description_prefix) {
                &mut description_file
            } else if name.starts_with(RELATIONSHIP_PREFIX) {
                &mut relationship_file
            } else {
                continue;
            };
            if slot.is_none() {
                debug!("rf2: using {}", name);
                *slot = Some(path);
            }
        }

        let require = |file: Option<PathBuf>, prefix: &str| {
            file.ok_or_else(|| {
                OntologyError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no {}* file in {}", prefix, terminology.display()),
                ))
            })
        };

        Ok(Self {
            concept_file: require(concept_file, CONCEPT_PREFIX)?,
            description_file: require(description_file, &description_prefix)?,
            relationship_file: require(relationship_file, RELATIONSHIP_PREFIX)?,
            descriptions: descriptions.clone(),
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn concept_file(&self) -> &Path {
        &self.concept_file
    }

    pub fn description_file(&self) -> &Path {
        &self.description_file
    }

    pub fn relationship_file(&self) -> &Path {
        &self.relationship_file
    }

    /// Read all three files into builder rows
    ///
    /// Inactive descriptions are dropped here; inactive concepts and
    /// relationships are passed on flagged so the builder can count them.
    /// Descriptions of ids absent from the concept file become
    /// relationship-type labels.
    pub fn read(&self) -> Result<SourceRows> {
        let mut rows = SourceRows::default();
        let mut positions: AHashMap<ConceptId, usize> = AHashMap::new();

        let count = read_table(&self.concept_file, &["id", "active"], |row| {
            let id = row.id(0)?;
            let active = row.flag(1)?;
            // descriptions attach to the first active row of an id
            let settled = positions.get(&id).is_some_and(|&pos| rows.concepts[pos].active);
            if !settled {
                positions.insert(id, rows.concepts.len());
            }
            rows.concepts.push(ConceptRow {
                id,
                active,
                descriptions: Vec::new(),
            });
            Ok(())
        })?;
        info!("rf2: {} concept rows", count);

        let mut dropped = 0usize;
        let count = read_table(
            &self.description_file,
            &["active", "conceptId", "languageCode", "typeId", "term"],
            |row| {
                if !row.flag(0)? {
                    dropped += 1;
                    return Ok(());
                }
                let concept_id = row.id(1)?;
                let description = DescriptionRow {
                    language_code: row.text(2).to_string(),
                    type_id: row.id(3)?,
                    term: row.text(4).to_string(),
                };

                match positions.get(&concept_id) {
                    Some(&pos) => rows.concepts[pos].descriptions.push(description),
                    None if self.is_label(&description) => rows
                        .type_labels
                        .push((concept_id, strip_semantic_tag(&description.term).to_string())),
                    None => {}
                }
                Ok(())
            },
        )?;
        info!(
            "rf2: {} description rows ({} inactive dropped, {} type labels)",
            count,
            dropped,
            rows.type_labels.len()
        );

        let count = read_table(
            &self.relationship_file,
            &["active", "sourceId", "destinationId", "relationshipGroup", "typeId"],
            |row| {
                let group = u32::try_from(row.int(3)?)
                    .map_err(|_| row.malformed(3, "relationship group out of range"))?;
                let mut relationship =
                    RelationshipRow::new(row.id(1)?, row.id(2)?, row.id(4)?, group);
                relationship.active = row.flag(0)?;
                rows.relationships.push(relationship);
                Ok(())
            },
        )?;
        info!("rf2: {} relationship rows", count);

        Ok(rows)
    }

    fn is_label(&self, description: &DescriptionRow) -> bool {
        description.type_id == self.descriptions.fsn_type_id
            && description
                .language_code
                .eq_ignore_ascii_case(&self.descriptions.language)
    }
}

impl RowSource for Rf2Release {
    fn into_rows(self) -> Result<SourceRows> {
        self.read()
    }
}

// ── tab-separated tables ───────────────────────────────────────────────────

/// One data line with the requested columns resolved
struct Rf2Row<'a> {
    fields: Vec<&'a str>,
    columns: &'a [usize],
    names: &'a [&'a str],
    file: &'a str,
    line: usize,
}

impl<'a> Rf2Row<'a> {
    fn text(&self, col: usize) -> &'a str {
        self.fields.get(self.columns[col]).copied().unwrap_or("")
    }

    fn int(&self, col: usize) -> Result<u64> {
        let raw = self.text(col);
        raw.trim()
            .parse::<u64>()
            .map_err(|_| self.malformed(col, &format!("expected an integer, found {:?}", raw)))
    }

    fn id(&self, col: usize) -> Result<ConceptId> {
        self.int(col)
    }

    fn flag(&self, col: usize) -> Result<bool> {
        match self.text(col).trim() {
            "1" => Ok(true),
            "0" => Ok(false),
            other => Err(self.malformed(col, &format!("expected 0 or 1, found {:?}", other))),
        }
    }

    fn malformed(&self, col: usize, reason: &str) -> OntologyError {
        OntologyError::malformed(format!(
            "{} line {}, column '{}': {}",
            self.file, self.line, self.names[col], reason
        ))
    }
}

/// Stream a table, calling `visit` for each data line; returns the line count
fn read_table<F>(path: &Path, names: &[&str], mut visit: F) -> Result<usize>
where
    F: FnMut(&Rf2Row<'_>) -> Result<()>,
{
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut lines = BufReader::new(File::open(path)?).lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => return Err(OntologyError::malformed(format!("{} is empty", file_name))),
    };
    let header: Vec<&str> = header
        .trim_end_matches(['\r', '\n'])
        .trim_start_matches('\u{feff}')
        .split('\t')
        .collect();

    let columns = names
        .iter()
        .map(|name| {
            header.iter().position(|h| h == name).ok_or_else(|| {
                OntologyError::malformed(format!("{} has no '{}' column", file_name, name))
            })
        })
        .collect::<Result<Vec<usize>>>()?;

    let mut count = 0;
    for (offset, line) in lines.enumerate() {
        let line = line?;
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            continue;
        }
        let row = Rf2Row {
            fields: line.split('\t').collect(),
            columns: &columns,
            names,
            file: &file_name,
            line: offset + 2,
        };
        visit(&row)?;
        count += 1;
    }
    Ok(count)
}
