//! Core data structures for the reference-list pipeline.
//!
//! Defines the source kinds, decoded field values, records, insertion-ordered
//! record sets and parse statistics shared by the parser, the table builder
//! and the pathway resolver.

use crate::constants::{
    DATABASES_FILE, FAMILIES_FILE, JOIN_SEPARATOR, PATHWAYS_FILE, SPECIES_FILE, SUBCELLULAR_FILE,
    TISSUES_FILE,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Reference lists published alongside UniProtKB
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Databases,
    Species,
    Families,
    Pathways,
    Subcellular,
    Tissues,
}

impl SourceKind {
    pub const ALL: [SourceKind; 6] = [
        SourceKind::Databases,
        SourceKind::Species,
        SourceKind::Families,
        SourceKind::Pathways,
        SourceKind::Subcellular,
        SourceKind::Tissues,
    ];

    /// File name of the list under the UniProt docs directory
    pub fn file_name(&self) -> &'static str {
        match self {
            SourceKind::Databases => DATABASES_FILE,
            SourceKind::Species => SPECIES_FILE,
            SourceKind::Families => FAMILIES_FILE,
            SourceKind::Pathways => PATHWAYS_FILE,
            SourceKind::Subcellular => SUBCELLULAR_FILE,
            SourceKind::Tissues => TISSUES_FILE,
        }
    }

    /// Lowercase name used for cache files and CLI arguments
    pub fn slug(&self) -> &'static str {
        match self {
            SourceKind::Databases => "databases",
            SourceKind::Species => "species",
            SourceKind::Families => "families",
            SourceKind::Pathways => "pathways",
            SourceKind::Subcellular => "subcellular",
            SourceKind::Tissues => "tissues",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Databases => "Databases",
            SourceKind::Species => "Species",
            SourceKind::Families => "Families",
            SourceKind::Pathways => "Pathways",
            SourceKind::Subcellular => "Subcellular locations",
            SourceKind::Tissues => "Tissues",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Decoded payload of one tag within one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Single(value) => value.is_empty(),
            FieldValue::List(values) => values.iter().all(|v| v.is_empty()),
        }
    }

    /// Flatten into a single cell value
    pub fn join(&self, separator: &str) -> String {
        match self {
            FieldValue::Single(value) => value.clone(),
            FieldValue::List(values) => values.join(separator),
        }
    }

    pub fn as_list(&self) -> &[String] {
        match self {
            FieldValue::Single(value) => std::slice::from_ref(value),
            FieldValue::List(values) => values,
        }
    }
}

/// One logical record keyed by its primary identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Vec::new(),
        }
    }

    pub fn get(&self, tag: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(t, _)| t == tag).map(|(_, v)| v)
    }

    /// Single-valued view of a field; lists are joined with a space
    pub fn get_text(&self, tag: &str) -> Option<String> {
        self.get(tag).map(|v| v.join(JOIN_SEPARATOR))
    }

    pub fn has(&self, tag: &str) -> bool {
        self.get(tag).is_some_and(|v| !v.is_empty())
    }

    /// Set or overwrite a single-valued field
    pub fn set(&mut self, tag: &str, value: impl Into<String>) {
        let value = FieldValue::Single(value.into());
        match self.fields.iter_mut().find(|(t, _)| t == tag) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((tag.to_string(), value)),
        }
    }

    /// Append to a free-text field with the given separator
    pub fn append(&mut self, tag: &str, value: &str, separator: &str) {
        match self.fields.iter_mut().find(|(t, _)| t == tag) {
            Some((_, FieldValue::Single(existing))) => {
                existing.push_str(separator);
                existing.push_str(value);
            }
            Some((_, FieldValue::List(values))) => values.push(value.to_string()),
            None => self
                .fields
                .push((tag.to_string(), FieldValue::Single(value.to_string()))),
        }
    }

    /// Push onto a list-valued field
    pub fn push(&mut self, tag: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(t, _)| t == tag) {
            Some((_, FieldValue::List(values))) => values.push(value),
            Some((_, slot)) => {
                let previous = slot.join(JOIN_SEPARATOR);
                *slot = FieldValue::List(vec![previous, value]);
            }
            None => self.fields.push((tag.to_string(), FieldValue::List(vec![value]))),
        }
    }
}

/// Insertion-ordered mapping from primary identifier to record
///
/// Inserting an identifier that is already present replaces the earlier
/// record in place; no merge is attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Record>", into = "Vec<Record>")]
pub struct RecordSet {
    records: Vec<Record>,
    index: HashMap<String, usize>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, returning the record it replaced if the id was taken
    pub fn insert(&mut self, record: Record) -> Option<Record> {
        match self.index.get(&record.id) {
            Some(&position) => Some(std::mem::replace(&mut self.records[position], record)),
            None => {
                self.index.insert(record.id.clone(), self.records.len());
                self.records.push(record);
                None
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    pub fn remove(&mut self, id: &str) -> Option<Record> {
        let position = self.index.remove(id)?;
        let removed = self.records.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.id.as_str())
    }
}

impl FromIterator<Record> for RecordSet {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut set = RecordSet::new();
        for record in iter {
            set.insert(record);
        }
        set
    }
}

impl From<Vec<Record>> for RecordSet {
    fn from(records: Vec<Record>) -> Self {
        records.into_iter().collect()
    }
}

impl From<RecordSet> for Vec<Record> {
    fn from(set: RecordSet) -> Self {
        set.records
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Counters collected during one parse
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Physical lines consumed
    pub lines_read: usize,
    /// Lines inside the data region that matched no rule
    pub lines_ignored: usize,
    /// Records opened by a start-boundary marker
    pub records_opened: usize,
    /// Records still open at end of input and kept anyway
    pub finalized_at_eof: usize,
    /// Records lost to a later record with the same identifier
    pub duplicates_replaced: usize,
    /// Pre-scan estimate used as the progress denominator
    pub expected_records: usize,
}

/// Result of one full pass over a payload
#[derive(Debug, Clone, Default)]
pub struct ParseOutput {
    pub records: RecordSet,
    pub stats: ParseStats,
}
