//! Test fixtures and helpers for the reference-list parsers
//!
//! The payloads live in `tests/fixtures/` so the integration tests parse the
//! very same text.

use crate::models::{ParseOutput, SourceKind};
use crate::parser::parse_reference;

mod format_tests;

pub const DBXREF: &str = include_str!("../../../tests/fixtures/dbxref.txt");
pub const SPECLIST: &str = include_str!("../../../tests/fixtures/speclist.txt");
pub const SIMILAR: &str = include_str!("../../../tests/fixtures/similar.txt");
pub const PATHLIST: &str = include_str!("../../../tests/fixtures/pathlist.txt");
pub const SUBCELL: &str = include_str!("../../../tests/fixtures/subcell.txt");
pub const TISSLIST: &str = include_str!("../../../tests/fixtures/tisslist.txt");

/// Parse a payload and collect every progress notification
pub fn parse_with_progress(kind: SourceKind, text: &str) -> (ParseOutput, Vec<u8>) {
    let mut seen: Vec<u8> = Vec::new();
    let output = parse_reference(kind, text, &mut seen, None).unwrap();
    (output, seen)
}

/// Collect the text value of a field for a record
pub fn field(output: &ParseOutput, id: &str, tag: &str) -> Option<String> {
    output.records.get(id).and_then(|r| r.get_text(tag))
}
