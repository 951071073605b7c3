//! GML snapshot codec
//!
//! Writes the whole graph as a Graph Modelling Language document and reads it
//! back through the regular builder, so a restored graph answers every query
//! exactly like the graph that was saved.
//!
//! ```text
//! graph [
//!   directed 1
//!   multigraph 1
//!   hierarchy_type_id 116680003
//!   node [
//!     id 22298006
//!     label "Myocardial infarction (disorder)"
//!     synonym "Heart attack"
//!   ]
//!   edge [
//!     source 22298006
//!     target 414545008
//!     group 0
//!     type "Is a"
//!     type_id 116680003
//!   ]
//! ]
//! ```
//!
//! Strings are double-quoted. `&`, `"` and every character outside printable
//! ASCII are written as character entities (`&amp;`, `&quot;`, `&#233;`).

use ahash::AHashSet;
use petgraph::visit::EdgeRef;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;
use tracing::{debug, info};

use crate::config::OntologyConfig;
use crate::domain::{ConceptId, ConceptRow, RelationshipRow, RowSource, SourceRows};
use crate::errors::{OntologyError, Result};
use crate::graph::{GraphBuilder, OntologyGraph};

// ═══════════════════════════════════════════════════════════════════════════
// Writer
// ═══════════════════════════════════════════════════════════════════════════

/// Write `graph` as GML
pub fn save<W: Write>(graph: &OntologyGraph, writer: W) -> Result<()> {
    let mut out = BufWriter::new(writer);
    let core = graph.core();

    writeln!(out, "graph [")?;
    writeln!(out, "  directed 1")?;
    writeln!(out, "  multigraph 1")?;
    writeln!(out, "  hierarchy_type_id {}", graph.hierarchy().is_a_type_id)?;

    for concept in graph.iter() {
        writeln!(out, "  node [")?;
        writeln!(out, "    id {}", concept.id)?;
        writeln!(out, "    label {}", quote(&concept.fsn))?;
        for synonym in &concept.synonyms {
            writeln!(out, "    synonym {}", quote(synonym))?;
        }
        writeln!(out, "  ]")?;
    }

    for edge in core.edges() {
        let attrs = edge.weight();
        writeln!(out, "  edge [")?;
        writeln!(out, "    source {}", core.concept_id(edge.source()))?;
        writeln!(out, "    target {}", core.concept_id(edge.target()))?;
        writeln!(out, "    group {}", attrs.group)?;
        writeln!(out, "    type {}", quote(&attrs.type_label))?;
        writeln!(out, "    type_id {}", attrs.type_id)?;
        writeln!(out, "  ]")?;
    }

    writeln!(out, "]")?;
    out.flush()?;

    info!(
        "snapshot: wrote {} nodes and {} edges",
        graph.len(),
        graph.edge_count()
    );
    Ok(())
}

pub fn save_to_path(graph: &OntologyGraph, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    debug!("snapshot: saving to {}", path.display());
    save(graph, File::create(path)?)
}

/// Quoted GML string with entity escaping
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        match ch {
            '&' => quoted.push_str("&amp;"),
            '"' => quoted.push_str("&quot;"),
            ' '..='~' => quoted.push(ch),
            other => quoted.push_str(&format!("&#{};", other as u32)),
        }
    }
    quoted.push('"');
    quoted
}

// ═══════════════════════════════════════════════════════════════════════════
// Reader
// ═══════════════════════════════════════════════════════════════════════════

/// Restore a graph from GML
///
/// The hierarchy type recorded in the snapshot overrides `config`.
pub fn load<R: Read>(reader: R, config: &OntologyConfig) -> Result<OntologyGraph> {
    let mut bytes = Vec::new();
    BufReader::new(reader).read_to_end(&mut bytes)?;
    let text = String::from_utf8(bytes).map_err(|e| {
        let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
        let line = 1 + valid.iter().filter(|&&b| b == b'\n').count();
        OntologyError::corrupt(line, "snapshot is not valid UTF-8")
    })?;

    let snapshot = GmlSnapshot::parse(&text, config)?;
    let mut config = config.clone();
    if let Some(is_a) = snapshot.hierarchy_type_id {
        config.hierarchy.is_a_type_id = is_a;
    }

    let rows = snapshot.into_rows()?;
    info!(
        "snapshot: read {} nodes and {} edges",
        rows.concepts.len(),
        rows.relationships.len()
    );

    GraphBuilder::new(config)
        .build_from(rows)
        .map_err(|e| match e {
            OntologyError::Io(_) | OntologyError::CorruptSnapshot { .. } => e,
            other => OntologyError::corrupt(0, other.to_string()),
        })
}

pub fn load_from_path(path: impl AsRef<Path>, config: &OntologyConfig) -> Result<OntologyGraph> {
    let path = path.as_ref();
    debug!("snapshot: loading from {}", path.display());
    load(File::open(path)?, config)
}

/// Decoded snapshot, ready to hand to the builder
#[derive(Debug, Clone)]
pub struct GmlSnapshot {
    pub hierarchy_type_id: Option<ConceptId>,
    rows: SourceRows,
}

impl GmlSnapshot {
    /// Parse and validate a GML document
    ///
    /// Node records become concept rows typed per `config.descriptions`; edge
    /// records become relationship rows with their stored labels.
    pub fn parse(text: &str, config: &OntologyConfig) -> Result<Self> {
        let document = Parser::new(text).parse_document()?;

        let mut graphs = document.into_iter().filter(|entry| entry.key == "graph");
        let graph = graphs
            .next()
            .ok_or_else(|| OntologyError::corrupt(1, "no top-level 'graph' record"))?;
        if let Some(extra) = graphs.next() {
            return Err(OntologyError::corrupt(extra.line, "more than one 'graph' record"));
        }
        let entries = graph.value.into_list(graph.line, "graph")?;

        let mut hierarchy_type_id = None;
        let mut rows = SourceRows::default();
        let mut node_ids: AHashSet<ConceptId> = AHashSet::new();
        let mut edges = Vec::new();

        for entry in entries {
            match entry.key.as_str() {
                "node" => {
                    let line = entry.line;
                    let record = Record::new(entry.value.into_list(line, "node")?, line);
                    let id = record.id("id")?;
                    if !node_ids.insert(id) {
                        return Err(OntologyError::corrupt(line, format!("duplicate node id {}", id)));
                    }
                    let label = record.string("label")?;
                    let synonyms = record.strings("synonym")?;
                    rows.concepts
                        .push(ConceptRow::named(id, label, synonyms, &config.descriptions));
                }
                "edge" => {
                    let line = entry.line;
                    let record = Record::new(entry.value.into_list(line, "edge")?, line);
                    let group = u32::try_from(record.int("group")?).map_err(|_| {
                        OntologyError::corrupt(line, "'group' out of range")
                    })?;
                    let row = RelationshipRow::new(
                        record.id("source")?,
                        record.id("target")?,
                        record.id("type_id")?,
                        group,
                    )
                    .with_label(record.string("type")?);
                    edges.push((line, row));
                }
                "hierarchy_type_id" => {
                    hierarchy_type_id = Some(to_id(entry.value.into_int(entry.line, "hierarchy_type_id")?, entry.line)?);
                }
                // directed, multigraph and anything a GML producer adds
                _ => {}
            }
        }

        for (line, row) in edges {
            for endpoint in [row.source, row.target] {
                if !node_ids.contains(&endpoint) {
                    return Err(OntologyError::corrupt(
                        line,
                        format!("edge references undeclared node {}", endpoint),
                    ));
                }
            }
            rows.relationships.push(row);
        }

        Ok(Self {
            hierarchy_type_id,
            rows,
        })
    }
}

impl RowSource for GmlSnapshot {
    fn into_rows(self) -> Result<SourceRows> {
        Ok(self.rows)
    }
}

// ── record access ──────────────────────────────────────────────────────────

struct Record {
    entries: Vec<Entry>,
    line: usize,
}

impl Record {
    fn new(entries: Vec<Entry>, line: usize) -> Self {
        Self { entries, line }
    }

    fn single(&self, key: &str) -> Result<&Entry> {
        let mut matches = self.entries.iter().filter(|e| e.key == key);
        let first = matches
            .next()
            .ok_or_else(|| OntologyError::corrupt(self.line, format!("missing '{}'", key)))?;
        if let Some(dup) = matches.next() {
            return Err(OntologyError::corrupt(dup.line, format!("repeated '{}'", key)));
        }
        Ok(first)
    }

    fn int(&self, key: &str) -> Result<i128> {
        let entry = self.single(key)?;
        match &entry.value {
            Value::Int(v) => Ok(*v),
            _ => Err(OntologyError::corrupt(entry.line, format!("'{}' must be an integer", key))),
        }
    }

    fn id(&self, key: &str) -> Result<ConceptId> {
        let line = self.single(key)?.line;
        to_id(self.int(key)?, line)
    }

    fn string(&self, key: &str) -> Result<String> {
        let entry = self.single(key)?;
        match &entry.value {
            Value::Str(s) => Ok(s.clone()),
            _ => Err(OntologyError::corrupt(entry.line, format!("'{}' must be a string", key))),
        }
    }

    fn strings(&self, key: &str) -> Result<Vec<String>> {
        self.entries
            .iter()
            .filter(|e| e.key == key)
            .map(|e| match &e.value {
                Value::Str(s) => Ok(s.clone()),
                _ => Err(OntologyError::corrupt(e.line, format!("'{}' must be a string", key))),
            })
            .collect()
    }
}

fn to_id(value: i128, line: usize) -> Result<ConceptId> {
    ConceptId::try_from(value)
        .map_err(|_| OntologyError::corrupt(line, format!("identifier {} out of range", value)))
}

// ── generic GML tree ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Int(i128),
    Str(String),
    List(Vec<Entry>),
}

impl Value {
    fn into_list(self, line: usize, key: &str) -> Result<Vec<Entry>> {
        match self {
            Value::List(entries) => Ok(entries),
            _ => Err(OntologyError::corrupt(line, format!("'{}' must be a [ ... ] record", key))),
        }
    }

    fn into_int(self, line: usize, key: &str) -> Result<i128> {
        match self {
            Value::Int(v) => Ok(v),
            _ => Err(OntologyError::corrupt(line, format!("'{}' must be an integer", key))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    key: String,
    value: Value,
    line: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Key(String),
    Int(i128),
    Str(String),
    Open,
    Close,
}

/// Deepest `[ ... ]` nesting accepted; snapshots use three levels
const MAX_DEPTH: usize = 32;

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            line: 1,
            depth: 0,
        }
    }

    fn parse_document(&mut self) -> Result<Vec<Entry>> {
        let entries = self.parse_list(false)?;
        Ok(entries)
    }

    /// Key/value pairs up to `]` (nested) or end of input (top level)
    fn parse_list(&mut self, nested: bool) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();
        loop {
            let (token, line) = match self.next_token()? {
                Some(t) => t,
                None if nested => {
                    return Err(OntologyError::corrupt(self.line, "unexpected end of input, missing ']'"))
                }
                None => return Ok(entries),
            };

            let key = match token {
                Token::Key(key) => key,
                Token::Close if nested => return Ok(entries),
                Token::Close => return Err(OntologyError::corrupt(line, "unbalanced ']'")),
                other => {
                    return Err(OntologyError::corrupt(line, format!("expected a key, found {:?}", other)))
                }
            };

            let value = match self.next_token()? {
                Some((Token::Int(v), _)) => Value::Int(v),
                Some((Token::Str(s), _)) => Value::Str(s),
                Some((Token::Open, l)) => {
                    if self.depth == MAX_DEPTH {
                        return Err(OntologyError::corrupt(l, "nesting too deep"));
                    }
                    self.depth += 1;
                    let entries = self.parse_list(true)?;
                    self.depth -= 1;
                    Value::List(entries)
                }
                Some((other, l)) => {
                    return Err(OntologyError::corrupt(
                        l,
                        format!("expected a value for '{}', found {:?}", key, other),
                    ))
                }
                None => {
                    return Err(OntologyError::corrupt(self.line, format!("missing value for '{}'", key)))
                }
            };

            entries.push(Entry { key, value, line });
        }
    }

    fn next_token(&mut self) -> Result<Option<(Token, usize)>> {
        self.skip_whitespace_and_comments();
        let line = self.line;
        let ch = match self.chars.peek() {
            Some(&c) => c,
            None => return Ok(None),
        };

        let token = match ch {
            '[' => {
                self.chars.next();
                Token::Open
            }
            ']' => {
                self.chars.next();
                Token::Close
            }
            '"' => {
                self.chars.next();
                Token::Str(self.read_string(line)?)
            }
            c if c == '-' || c == '+' || c.is_ascii_digit() => Token::Int(self.read_int(line)?),
            c if c.is_ascii_alphabetic() || c == '_' => Token::Key(self.read_key()),
            other => {
                return Err(OntologyError::corrupt(line, format!("unexpected character {:?}", other)))
            }
        };
        Ok(Some((token, line)))
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c == '\n' {
                self.line += 1;
                self.chars.next();
            } else if c.is_whitespace() {
                self.chars.next();
            } else if c == '#' {
                while let Some(&c) = self.chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.chars.next();
                }
            } else {
                break;
            }
        }
    }

    fn read_key(&mut self) -> String {
        let mut key = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                key.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        key
    }

    fn read_int(&mut self, line: usize) -> Result<i128> {
        let mut digits = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() || ((c == '-' || c == '+') && digits.is_empty()) {
                digits.push(c);
                self.chars.next();
            } else if c.is_whitespace() || c == '[' || c == ']' {
                break;
            } else {
                return Err(OntologyError::corrupt(
                    line,
                    format!("invalid integer near {:?}", format!("{}{}", digits, c)),
                ));
            }
        }
        digits
            .parse::<i128>()
            .map_err(|_| OntologyError::corrupt(line, format!("invalid integer {:?}", digits)))
    }

    /// Body of a quoted string, opening quote already consumed
    fn read_string(&mut self, line: usize) -> Result<String> {
        let mut value = String::new();
        loop {
            match self.chars.next() {
                None => return Err(OntologyError::corrupt(line, "unterminated string")),
                Some('"') => return Ok(value),
                Some('&') => value.push(self.read_entity()?),
                Some('\n') => {
                    self.line += 1;
                    value.push('\n');
                }
                Some(c) => value.push(c),
            }
        }
    }

    /// Character entity after '&', up to and including ';'
    fn read_entity(&mut self) -> Result<char> {
        let mut name = String::new();
        loop {
            match self.chars.next() {
                Some(';') => break,
                Some(c) if c.is_ascii_alphanumeric() || c == '#' => {
                    if name.len() > 10 {
                        return Err(OntologyError::corrupt(self.line, "unterminated character entity"));
                    }
                    name.push(c);
                }
                _ => return Err(OntologyError::corrupt(self.line, "unterminated character entity")),
            }
        }

        let decoded = match name.as_str() {
            "amp" => Some('&'),
            "quot" => Some('"'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "apos" => Some('\''),
            _ => {
                let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                    u32::from_str_radix(hex, 16).ok()
                } else if let Some(dec) = name.strip_prefix('#') {
                    dec.parse::<u32>().ok()
                } else {
                    None
                };
                code.and_then(char::from_u32)
            }
        };

        decoded.ok_or_else(|| OntologyError::corrupt(self.line, format!("unknown character entity '&{};'", name)))
    }
}
