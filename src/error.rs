//! Error handling for UniProt reference-list and search operations.
//!
//! Transport failures are kept distinct from everything that happens after
//! the bytes arrive. Malformed lines inside a payload are never errors: the
//! parsers skip them.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UniprotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Invalid payload from {source_name}: {reason}")]
    InvalidFormat { source_name: String, reason: String },

    #[error("Cache entry is unreadable: {path} - {reason}")]
    CorruptCache { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Query cannot be empty")]
    EmptyQuery,

    #[error("No records found")]
    NoRecords,

    #[error("Operation cancelled: {reason}")]
    Cancelled { reason: String },
}

impl UniprotError {
    /// Wrap a transport-level failure for the given URL
    pub fn fetch(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Fetch {
            url: url.into(),
            source,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self::Cancelled {
            reason: reason.into(),
        }
    }

    /// True when the failure happened before any payload was received
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::HttpStatus { .. })
    }
}

pub type Result<T> = std::result::Result<T, UniprotError>;
