//! Format descriptions for the six UniProt reference lists
//!
//! Every list is described by a [`FormatSpec`]: which lines delimit the data
//! region, how a line is split into tag and value, which tag opens a record,
//! what closes it and how repeated tags accumulate. The state machine in
//! [`super::machine`] is the only consumer; nothing here holds state.

use crate::constants::{
    PATHWAY_HEADER_RULE_LEN, RECORD_TERMINATOR, SPECIES_FILE, TAG_VALUE_COLUMN, columns, markers,
};
use crate::models::SourceKind;
use regex::Regex;
use std::sync::LazyLock;

static FAMILY_MEMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(markers::FAMILY_MEMBER_PATTERN).expect("family member pattern is valid")
});

/// How repeated occurrences of a tag within one record combine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Every occurrence overwrites the previous value
    Single,
    /// Consecutive occurrences join with a space; a later, non-consecutive
    /// occurrence overwrites
    Joined,
    /// Every occurrence is kept in order
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagRule {
    pub tag: &'static str,
    pub cardinality: Cardinality,
}

const fn single(tag: &'static str) -> TagRule {
    TagRule {
        tag,
        cardinality: Cardinality::Single,
    }
}

const fn joined(tag: &'static str) -> TagRule {
    TagRule {
        tag,
        cardinality: Cardinality::Joined,
    }
}

const fn list(tag: &'static str) -> TagRule {
    TagRule {
        tag,
        cardinality: Cardinality::List,
    }
}

/// Line that switches the data region on or off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionMarker {
    /// Any line containing the substring
    Contains(&'static str),
    /// A line made of exactly this many underscores
    UnderscoreRule(usize),
}

impl RegionMarker {
    pub fn matches(&self, line: &str) -> bool {
        match self {
            RegionMarker::Contains(needle) => line.contains(needle),
            RegionMarker::UnderscoreRule(len) => {
                line.len() == *len && line.bytes().all(|b| b == b'_')
            }
        }
    }
}

/// Where records may appear in the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataRegion {
    /// From the first line to the end
    Whole,
    /// From the start marker to the end
    After(RegionMarker),
    /// From the start marker until the end marker; may be re-entered
    Between(RegionMarker, RegionMarker),
}

impl DataRegion {
    pub fn starts_open(&self) -> bool {
        matches!(self, DataRegion::Whole)
    }

    pub fn start(&self) -> Option<RegionMarker> {
        match self {
            DataRegion::Whole => None,
            DataRegion::After(start) | DataRegion::Between(start, _) => Some(*start),
        }
    }

    pub fn end(&self) -> Option<RegionMarker> {
        match self {
            DataRegion::Between(_, end) => Some(*end),
            _ => None,
        }
    }
}

/// What finalises the current record, besides end of input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseRule {
    /// Only the next start marker
    NextOpen,
    /// A `//` line
    Terminator,
    /// A blank line (or the next start marker)
    BlankLine,
}

/// How a physical line is split into tag and value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSyntax {
    /// `TT   value`, value from column 5
    Tagged,
    /// `Key: value`
    KeyColon,
    /// `CODE K TAXON: N=name` with continuation lines
    SpeciesColumns,
    /// Family header line followed by `ENTRY_NAME (ACC)` member lines
    FamilyBlocks,
}

/// Row order used when the record set is turned into a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrder {
    Insertion,
    /// Primary identifiers compared as integers
    Numeric,
    /// Primary identifiers compared as strings
    Lexical,
}

/// One classified line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    Blank,
    Terminator,
    /// Start of a new record, with the fields carried on the same line
    Open {
        id: String,
        fields: Vec<(&'static str, String)>,
    },
    /// Field values for the current record
    Fields(Vec<(&'static str, String)>),
    Unknown,
}

/// Complete description of one reference-list format
#[derive(Debug, Clone)]
pub struct FormatSpec {
    pub kind: SourceKind,
    pub syntax: LineSyntax,
    pub region: DataRegion,
    /// Lines containing this substring are skipped before classification
    pub skip_containing: Option<&'static str>,
    pub open_tag: &'static str,
    pub tags: &'static [TagRule],
    pub close: CloseRule,
    /// Fields seen before the open tag are held and attached on open
    pub buffer_before_open: bool,
    /// Tags whose value loses its trailing period
    pub strip_period: &'static [&'static str],
    /// Primary identifiers removed once the pass completes
    pub drop_ids: &'static [&'static str],
    pub columns: &'static [&'static str],
    pub row_order: RowOrder,
}

const DATABASE_TAGS: &[TagRule] = &[
    single("AC"),
    single("Abbrev"),
    single("Name"),
    single("Server"),
    single("Db_URL"),
    single("Cat"),
];

const SPECIES_TAGS: &[TagRule] = &[
    single(columns::TAXON_NODE),
    single(columns::CODE),
    single(columns::TAXONOMY),
    single(columns::SCIENTIFIC_NAME),
];

const FAMILY_TAGS: &[TagRule] = &[
    single(columns::FAMILY),
    list(columns::ENTRY_NAMES),
    list(columns::ACCESSIONS),
];

const PATHWAY_TAGS: &[TagRule] = &[
    joined("ID"),
    joined("AC"),
    joined("CL"),
    joined("DE"),
    joined("SY"),
    joined("HI"),
    joined("HP"),
    joined("DR"),
];

const SUBCELLULAR_TAGS: &[TagRule] = &[
    single("ID"),
    single("IT"),
    single("IO"),
    single("AC"),
    joined("DE"),
    list("SY"),
    list("SL"),
    list("HI"),
    list("HP"),
    list("KW"),
    list("GO"),
    list("AN"),
    list("RX"),
    list("WW"),
];

const TISSUE_TAGS: &[TagRule] = &[single("ID"), single("AC")];

impl FormatSpec {
    /// Format description for a reference list
    pub fn for_kind(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Databases => Self {
                kind,
                syntax: LineSyntax::KeyColon,
                region: DataRegion::Whole,
                skip_containing: Some(markers::DATABASES_SKIP),
                open_tag: "AC",
                tags: DATABASE_TAGS,
                close: CloseRule::NextOpen,
                buffer_before_open: false,
                strip_period: &[],
                drop_ids: &[],
                columns: columns::DATABASES,
                row_order: RowOrder::Insertion,
            },
            SourceKind::Species => Self {
                kind,
                syntax: LineSyntax::SpeciesColumns,
                region: DataRegion::Between(
                    RegionMarker::Contains(markers::SPECIES_START),
                    RegionMarker::Contains(markers::SPECIES_END),
                ),
                skip_containing: Some(SPECIES_FILE),
                open_tag: columns::TAXON_NODE,
                tags: SPECIES_TAGS,
                close: CloseRule::NextOpen,
                buffer_before_open: false,
                strip_period: &[],
                drop_ids: &[markers::SPECIES_ROOT_TAXON],
                columns: columns::SPECIES,
                row_order: RowOrder::Numeric,
            },
            SourceKind::Families => Self {
                kind,
                syntax: LineSyntax::FamilyBlocks,
                region: DataRegion::Whole,
                skip_containing: None,
                open_tag: columns::FAMILY,
                tags: FAMILY_TAGS,
                close: CloseRule::BlankLine,
                buffer_before_open: false,
                strip_period: &[],
                drop_ids: &[],
                columns: columns::FAMILIES,
                row_order: RowOrder::Insertion,
            },
            SourceKind::Pathways => Self {
                kind,
                syntax: LineSyntax::Tagged,
                region: DataRegion::After(RegionMarker::UnderscoreRule(PATHWAY_HEADER_RULE_LEN)),
                skip_containing: None,
                open_tag: "ID",
                tags: PATHWAY_TAGS,
                close: CloseRule::Terminator,
                buffer_before_open: false,
                strip_period: &["ID"],
                drop_ids: &[],
                columns: columns::PATHWAYS,
                row_order: RowOrder::Insertion,
            },
            SourceKind::Subcellular => Self {
                kind,
                syntax: LineSyntax::Tagged,
                region: DataRegion::After(RegionMarker::Contains(markers::LIST_START)),
                skip_containing: None,
                open_tag: "AC",
                tags: SUBCELLULAR_TAGS,
                close: CloseRule::Terminator,
                buffer_before_open: true,
                strip_period: &["ID"],
                drop_ids: &[],
                columns: columns::SUBCELLULAR,
                row_order: RowOrder::Lexical,
            },
            SourceKind::Tissues => Self {
                kind,
                syntax: LineSyntax::Tagged,
                region: DataRegion::After(RegionMarker::Contains(markers::LIST_START)),
                skip_containing: None,
                open_tag: "AC",
                tags: TISSUE_TAGS,
                close: CloseRule::Terminator,
                buffer_before_open: true,
                strip_period: &["ID"],
                drop_ids: &[],
                columns: columns::TISSUES,
                row_order: RowOrder::Lexical,
            },
        }
    }

    /// Look up the rule for a tag, returning the canonical static tag
    pub fn rule(&self, tag: &str) -> Option<&TagRule> {
        self.tags.iter().find(|rule| rule.tag == tag)
    }

    pub fn cardinality(&self, tag: &str) -> Cardinality {
        self.rule(tag)
            .map(|rule| rule.cardinality)
            .unwrap_or(Cardinality::Single)
    }

    /// Apply the per-tag value cleanup
    pub fn clean_value<'v>(&self, tag: &str, value: &'v str) -> &'v str {
        if self.strip_period.contains(&tag) {
            value.trim_end_matches('.')
        } else {
            value
        }
    }

    /// Classify one line of the data region
    pub fn classify(&self, line: &str) -> LineClass {
        if line.trim().is_empty() {
            return LineClass::Blank;
        }
        if line.trim_end() == RECORD_TERMINATOR {
            return LineClass::Terminator;
        }

        match self.syntax {
            LineSyntax::Tagged => self.classify_tagged(line),
            LineSyntax::KeyColon => self.classify_key_colon(line),
            LineSyntax::SpeciesColumns => classify_species(line),
            LineSyntax::FamilyBlocks => classify_family(line),
        }
    }

    fn classify_tagged(&self, line: &str) -> LineClass {
        let Some(tag) = line.get(..2) else {
            return LineClass::Unknown;
        };
        // The tag must be followed by padding, not more letters
        if line.as_bytes().get(2).is_some_and(|b| *b != b' ') {
            return LineClass::Unknown;
        }
        let Some(rule) = self.rule(tag) else {
            return LineClass::Unknown;
        };
        let value = line.get(TAG_VALUE_COLUMN..).unwrap_or("").trim_end();
        self.tag_value(rule.tag, value)
    }

    fn classify_key_colon(&self, line: &str) -> LineClass {
        let Some((key, value)) = line.split_once(':') else {
            return LineClass::Unknown;
        };
        // Keys start in the first column; indented legend lines are not data
        let Some(rule) = self.rule(key.trim_end()) else {
            return LineClass::Unknown;
        };
        self.tag_value(rule.tag, value.trim())
    }

    fn tag_value(&self, tag: &'static str, value: &str) -> LineClass {
        let value = self.clean_value(tag, value).to_string();
        if tag == self.open_tag {
            LineClass::Open {
                id: value.clone(),
                fields: vec![(tag, value)],
            }
        } else {
            LineClass::Fields(vec![(tag, value)])
        }
    }
}

fn scientific_name(text: &str) -> Option<String> {
    text.find(markers::SPECIES_NAME_PREFIX)
        .map(|idx| text[idx + markers::SPECIES_NAME_PREFIX.len()..].trim().to_string())
}

/// `AADNV V  648330: N=Aedes albopictus densovirus`
fn classify_species(line: &str) -> LineClass {
    if let Some((prefix, rest)) = line.split_once(':') {
        let tokens: Vec<&str> = prefix.split_whitespace().collect();
        if let [code, kingdom, taxon] = tokens.as_slice() {
            if taxon.parse::<u64>().is_ok() {
                let mut fields = vec![
                    (columns::TAXON_NODE, taxon.to_string()),
                    (columns::CODE, code.to_string()),
                    (columns::TAXONOMY, kingdom.to_string()),
                ];
                if let Some(name) = scientific_name(rest) {
                    fields.push((columns::SCIENTIFIC_NAME, name));
                }
                return LineClass::Open {
                    id: taxon.to_string(),
                    fields,
                };
            }
        }
    }

    // Continuation lines carry C= and S=; only N= is kept
    match scientific_name(line) {
        Some(name) => LineClass::Fields(vec![(columns::SCIENTIFIC_NAME, name)]),
        None => LineClass::Unknown,
    }
}

fn classify_family(line: &str) -> LineClass {
    let members: Vec<(&'static str, String)> = FAMILY_MEMBER
        .captures_iter(line)
        .flat_map(|caps| {
            [
                (columns::ENTRY_NAMES, caps[1].to_string()),
                (columns::ACCESSIONS, caps[2].to_string()),
            ]
        })
        .collect();

    if !members.is_empty() {
        return LineClass::Fields(members);
    }

    if line.contains(markers::FAMILY_HEADER) {
        let name = line.trim().to_string();
        return LineClass::Open {
            id: name.clone(),
            fields: vec![(columns::FAMILY, name)],
        };
    }

    LineClass::Unknown
}
