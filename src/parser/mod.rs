//! Parsers for the UniProt reference lists
//!
//! The six lists (database cross-references, species codes, protein
//! families, pathways, subcellular locations and tissues) share one
//! line-driven state machine. They differ only in configuration:
//!
//! - [`format`] - tag tables, data-region markers and record boundaries
//! - [`machine`] - the record accumulator that applies them
//!
//! ## Usage
//!
//! ```rust
//! use uniprot_filters::models::SourceKind;
//! use uniprot_filters::parser::parse_reference;
//! use uniprot_filters::progress::NoProgress;
//!
//! let text = "____\nID   Acinus.\nAC   TS-0001\n//\n";
//! let output = parse_reference(SourceKind::Tissues, text, &mut NoProgress, None).unwrap();
//! assert_eq!(output.records.len(), 1);
//! ```

pub mod format;
pub mod machine;

#[cfg(test)]
mod tests;

pub use format::{Cardinality, FormatSpec, LineClass, RowOrder};
pub use machine::{RecordAccumulator, parse_text};

use crate::error::Result;
use crate::models::{ParseOutput, SourceKind};
use crate::progress::{ProgressObserver, estimate_expected};
use tokio_util::sync::CancellationToken;

/// Pre-scan then parse a complete reference-list payload
pub fn parse_reference<O: ProgressObserver + ?Sized>(
    kind: SourceKind,
    text: &str,
    observer: &mut O,
    cancel: Option<&CancellationToken>,
) -> Result<ParseOutput> {
    let spec = FormatSpec::for_kind(kind);
    let expected = estimate_expected(kind, text);
    parse_text(&spec, text, expected, observer, cancel)
}
