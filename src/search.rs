//! UniProtKB search
//!
//! Builds the REST query from a free-text term and the optional filters,
//! reads the hit count from the search endpoint, then streams the full TSV
//! result from the stream endpoint into a polars DataFrame.

use crate::config::AppConfig;
use crate::constants::{DEFAULT_SEARCH_FIELDS, TOTAL_RESULTS_HEADER};
use crate::error::{Result, UniprotError};
use crate::fetch::Fetcher;
use crate::pathways::capitalize;
use crate::progress::{ProgressObserver, ProgressTracker};
use futures::StreamExt;
use polars::prelude::{Column, CsvParseOptions, CsvReadOptions, DataFrame, SerReader};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const ENCODED_SPACE: &str = "%20";
const AND: &str = "%20AND%20";
const FIELD_SEPARATOR: &str = "%2C";
const REVIEWED_COLUMN: &str = "Reviewed";

/// Experimental method used to resolve a structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum StructureMethod {
    /// Electron microscopy
    Em,
    /// Fiber diffraction
    Fiber,
    /// Infrared spectroscopy
    Ir,
    Models,
    Nmr,
    /// Neutron diffraction
    Neutron,
    XRay,
}

impl StructureMethod {
    pub fn query_value(&self) -> &'static str {
        match self {
            StructureMethod::Em => "em",
            StructureMethod::Fiber => "fiber",
            StructureMethod::Ir => "ir",
            StructureMethod::Models => "models",
            StructureMethod::Nmr => "nmr",
            StructureMethod::Neutron => "neutron",
            StructureMethod::XRay => "x-ray",
        }
    }
}

/// Optional restrictions added to a search term
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Cross-referenced database abbreviation
    pub database: Option<String>,
    /// NCBI taxonomy identifier
    pub organism: Option<String>,
    pub method: Option<StructureMethod>,
    /// Minimum mass in Da; zero means no bound
    pub min_mass: Option<u64>,
    /// Minimum sequence length; zero means no bound
    pub min_length: Option<u64>,
    pub gene: Option<String>,
    /// Subcellular location name
    pub location: Option<String>,
    pub tissue: Option<String>,
    pub reviewed: Option<bool>,
}

/// Build the encoded query string for a term and its filters
pub fn build_query(term: &str, filters: &SearchFilters) -> Result<String> {
    let term = term.trim();
    if term.is_empty() {
        return Err(UniprotError::EmptyQuery);
    }

    let mut query = encode(term);
    let mut and = |clause: String| {
        query.push_str(AND);
        query.push_str(&clause);
    };

    if let Some(database) = non_empty(&filters.database) {
        and(format!("database:{}", encode(database)));
    }
    if let Some(organism) = non_empty(&filters.organism) {
        and(format!("organism_id:{}", encode(organism)));
    }
    if let Some(method) = filters.method {
        and(format!("method:{}", method.query_value()));
    }
    if let Some(mass) = filters.min_mass.filter(|m| *m > 0) {
        and(format!("mass:[{}%20TO%20*]", mass));
    }
    if let Some(length) = filters.min_length.filter(|l| *l > 0) {
        and(format!("length:[{}%20TO%20*]", length));
    }
    if let Some(gene) = non_empty(&filters.gene) {
        and(format!("gene:{}", encode(gene)));
    }
    if let Some(location) = non_empty(&filters.location) {
        and(format!("locations%3A(location%3A{})", encode(location)));
    }
    if let Some(tissue) = non_empty(&filters.tissue) {
        and(format!("tissue:{}", encode(tissue)));
    }
    if let Some(reviewed) = filters.reviewed {
        and(format!("reviewed:{}", reviewed));
    }

    Ok(query)
}

fn encode(value: &str) -> String {
    value.trim().replace(' ', ENCODED_SPACE)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Full request URL for an endpoint, requesting TSV with the default fields
/// followed by any extra columns
pub fn search_url(endpoint: &str, query: &str, extra_fields: &[String]) -> String {
    let mut fields = DEFAULT_SEARCH_FIELDS.join(FIELD_SEPARATOR);
    for field in extra_fields {
        fields.push_str(FIELD_SEPARATOR);
        fields.push_str(field);
    }
    format!(
        "{}?compressed=false&download=false&fields={}&format=tsv&query={}",
        endpoint, fields, query
    )
}

/// Outcome of one search
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub query: String,
    /// Hit count announced by the search endpoint
    pub total: usize,
    pub frame: DataFrame,
}

/// Run a search end to end
pub async fn run_search<O: ProgressObserver + ?Sized>(
    fetcher: &Fetcher,
    config: &AppConfig,
    term: &str,
    filters: &SearchFilters,
    extra_fields: &[String],
    observer: &mut O,
    cancel: Option<&CancellationToken>,
) -> Result<SearchResult> {
    let query = build_query(term, filters)?;
    let count_url = search_url(&config.search_url, &query, extra_fields);
    info!("Searching UniProtKB for '{}'", term.trim());
    debug!("Search URL: {}", count_url);

    let response = fetcher.get(&count_url).await?;
    let total = response
        .headers()
        .get(TOTAL_RESULTS_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<usize>().ok())
        .ok_or(UniprotError::NoRecords)?;
    drop(response);
    if total == 0 {
        return Err(UniprotError::NoRecords);
    }
    info!("{} records match", total);

    let stream_url = search_url(&config.stream_url, &query, extra_fields);
    let response = fetcher.get(&stream_url).await?;
    let mut stream = response.bytes_stream();

    let mut buffer = Vec::new();
    let mut tracker = ProgressTracker::new(total, observer);
    tracker.start();
    let mut header_seen = false;

    while let Some(chunk) = stream.next().await {
        if cancel.is_some_and(|token| token.is_cancelled()) {
            return Err(UniprotError::cancelled(format!(
                "search abandoned after {} rows",
                tracker.processed()
            )));
        }
        let chunk = chunk.map_err(|e| UniprotError::fetch(stream_url.as_str(), e))?;
        for _ in chunk.iter().filter(|b| **b == b'\n') {
            if header_seen {
                tracker.advance();
            } else {
                header_seen = true;
            }
        }
        buffer.extend_from_slice(&chunk);
    }

    let frame = frame_from_tsv(buffer)?;
    debug!("Search result frame: {:?}", frame.shape());

    Ok(SearchResult {
        query,
        total,
        frame,
    })
}

/// Parse a TSV search payload and normalise the `Reviewed` column
pub fn frame_from_tsv(bytes: Vec<u8>) -> Result<DataFrame> {
    let mut frame = CsvReadOptions::default()
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_separator(b'\t'))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;

    if frame.height() == 0 {
        return Err(UniprotError::NoRecords);
    }

    if let Ok(column) = frame.column(REVIEWED_COLUMN) {
        let values: Vec<Option<String>> = column
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|value| value.map(capitalize))
            .collect();
        frame.with_column(Column::new(REVIEWED_COLUMN.into(), values))?;
    }

    Ok(frame)
}
