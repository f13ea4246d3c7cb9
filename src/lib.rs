//! UniProt Filters Library
//!
//! Reads the reference lists published with UniProtKB (cross-referenced
//! databases, species codes, protein families, pathways, subcellular
//! locations and tissues) and turns them into tables usable as search
//! filters.
//!
//! This library provides tools for:
//! - Parsing the flat-text lists with one configurable state machine
//! - Building key-indexed tables with `NA` placeholders and polars export
//! - Resolving the pathway hierarchy into a forest
//! - Caching parsed lists as Parquet between runs
//! - Querying UniProtKB and downloading selected entries

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod fetch;
pub mod models;
pub mod parser;
pub mod pathways;
pub mod progress;
pub mod search;
pub mod sources;
pub mod table;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Result, UniprotError};
pub use models::{FieldValue, Record, RecordSet, SourceKind};
pub use pathways::PathwayForest;
pub use sources::{ParsedSource, parse_source};
pub use table::Table;
