//! Download of selected UniProtKB entries
//!
//! Every accession is saved as `<dir>/<accession>.<ext>`. Files already on
//! disk are left alone, and an accession whose download fails is recorded
//! and skipped so the remaining ones still run.

use crate::config::AppConfig;
use crate::error::{Result, UniprotError};
use crate::fetch::Fetcher;
use crate::progress::{ProgressObserver, ProgressTracker};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// File formats offered by the entry endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Fasta,
    Gff,
    Rdf,
    Txt,
    Xml,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Fasta => "fasta",
            ExportFormat::Gff => "gff",
            ExportFormat::Rdf => "rdf",
            ExportFormat::Txt => "txt",
            ExportFormat::Xml => "xml",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Summary of one export run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    pub downloaded: Vec<String>,
    /// Already present on disk
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
    pub bytes_written: u64,
}

impl ExportReport {
    pub fn total(&self) -> usize {
        self.downloaded.len() + self.skipped.len() + self.failed.len()
    }
}

/// `<dir>/<accession>.<ext>`
pub fn target_path(dir: &Path, accession: &str, format: ExportFormat) -> PathBuf {
    dir.join(format!("{}.{}", accession, format.extension()))
}

/// `<base>/<accession>.<ext>`
pub fn entry_url(base: &str, accession: &str, format: ExportFormat) -> String {
    format!(
        "{}/{}.{}",
        base.trim_end_matches('/'),
        accession,
        format.extension()
    )
}

/// Accessions whose target file does not exist yet
pub fn pending_accessions<'a>(
    dir: &Path,
    accessions: &'a [String],
    format: ExportFormat,
) -> Vec<&'a str> {
    accessions
        .iter()
        .map(String::as_str)
        .filter(|acc| !target_path(dir, acc, format).exists())
        .collect()
}

/// Download every accession into the configured export directory
pub async fn export_entries<O: ProgressObserver + ?Sized>(
    fetcher: &Fetcher,
    config: &AppConfig,
    accessions: &[String],
    format: ExportFormat,
    observer: &mut O,
    cancel: Option<&CancellationToken>,
) -> Result<ExportReport> {
    let dir = &config.export_dir;
    tokio::fs::create_dir_all(dir).await?;

    let mut report = ExportReport::default();
    let mut tracker = ProgressTracker::new(accessions.len(), observer);
    tracker.start();

    for accession in accessions {
        if cancel.is_some_and(|token| token.is_cancelled()) {
            return Err(UniprotError::cancelled(format!(
                "export abandoned after {} of {} entries",
                tracker.processed(),
                accessions.len()
            )));
        }

        let target = target_path(dir, accession, format);
        if target.exists() {
            debug!("{} already exported, skipping", target.display());
            report.skipped.push(accession.clone());
        } else {
            let url = entry_url(&config.entry_url, accession, format);
            match fetcher.download_to(&url, &target).await {
                Ok(bytes) => {
                    report.bytes_written += bytes;
                    report.downloaded.push(accession.clone());
                }
                Err(e) if e.is_transport() => {
                    warn!("Failed to export {}: {}", accession, e);
                    report.failed.push(accession.clone());
                }
                Err(e) => return Err(e),
            }
        }
        tracker.advance();
    }

    info!(
        "Exported {} entries as {} ({} skipped, {} failed)",
        report.downloaded.len(),
        format,
        report.skipped.len(),
        report.failed.len()
    );
    Ok(report)
}
