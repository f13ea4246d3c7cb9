//! On-disk cache of parsed reference lists
//!
//! Layout under the cache directory:
//!
//! - `<source>.parquet` - the table of each source, all-string columns
//! - `pathways.json` - the resolved pathway forest
//! - `updates.json` - when each source was last stored
//!
//! Clearing the cache removes the tables and the forest but keeps the update
//! log, so `status` can still report when a source was last fetched.

use crate::constants::UPDATE_LOG_FILE;
use crate::error::{Result, UniprotError};
use crate::models::SourceKind;
use crate::parser::FormatSpec;
use crate::pathways::PathwayForest;
use crate::sources::ParsedSource;
use crate::table::Table;
use chrono::{DateTime, Utc};
use polars::prelude::{ParquetReader, ParquetWriter, SerReader};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const FOREST_FILE: &str = "pathways.json";

/// Source label to time of last store
pub type UpdateLog = BTreeMap<String, DateTime<Utc>>;

/// A source read back from the cache
#[derive(Debug, Clone)]
pub struct CachedSource {
    pub kind: SourceKind,
    pub table: Table,
    pub forest: Option<PathwayForest>,
    pub updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct Cache {
    dir: PathBuf,
}

impl Cache {
    /// Open the cache, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn table_path(&self, kind: SourceKind) -> PathBuf {
        self.dir.join(format!("{}.parquet", kind.slug()))
    }

    fn forest_path(&self) -> PathBuf {
        self.dir.join(FOREST_FILE)
    }

    fn log_path(&self) -> PathBuf {
        self.dir.join(UPDATE_LOG_FILE)
    }

    pub fn contains(&self, kind: SourceKind) -> bool {
        self.table_path(kind).exists()
            && (kind != SourceKind::Pathways || self.forest_path().exists())
    }

    /// Persist a parsed source and stamp the update log
    pub fn store(&self, parsed: &ParsedSource) -> Result<DateTime<Utc>> {
        let path = self.table_path(parsed.kind);
        let mut df = parsed.table.to_dataframe()?;
        let file = File::create(&path)?;
        ParquetWriter::new(file).finish(&mut df)?;
        debug!("Wrote {} rows to {}", df.height(), path.display());

        if let Some(forest) = &parsed.forest {
            let file = File::create(self.forest_path())?;
            serde_json::to_writer(file, forest)?;
        }

        let now = Utc::now();
        let mut log = self.updates()?;
        log.insert(parsed.kind.label().to_string(), now);
        self.write_log(&log)?;

        info!("Cached {} ({} entries)", parsed.kind.label(), parsed.entry_count());
        Ok(now)
    }

    /// Read a source back, or `None` when it has not been cached
    pub fn load(&self, kind: SourceKind) -> Result<Option<CachedSource>> {
        if !self.contains(kind) {
            return Ok(None);
        }

        let path = self.table_path(kind);
        let df = ParquetReader::new(File::open(&path)?)
            .finish()
            .map_err(|e| UniprotError::CorruptCache {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        let key = FormatSpec::for_kind(kind).open_tag;
        let table = Table::from_dataframe(&df, key).map_err(|e| UniprotError::CorruptCache {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let forest = match kind {
            SourceKind::Pathways => {
                let path = self.forest_path();
                let file = File::open(&path)?;
                let forest = serde_json::from_reader(file).map_err(|e| {
                    UniprotError::CorruptCache {
                        path,
                        reason: e.to_string(),
                    }
                })?;
                Some(forest)
            }
            _ => None,
        };

        let updated = self.updates()?.get(kind.label()).copied();
        debug!("Loaded {} from cache: {} rows", kind, table.len());

        Ok(Some(CachedSource {
            kind,
            table,
            forest,
            updated,
        }))
    }

    /// Update log; empty when nothing was ever stored
    pub fn updates(&self) -> Result<UpdateLog> {
        let path = self.log_path();
        if !path.exists() {
            return Ok(UpdateLog::new());
        }
        let contents = std::fs::read_to_string(&path)?;
        serde_json::from_str(&contents).map_err(|e| UniprotError::CorruptCache {
            path,
            reason: e.to_string(),
        })
    }

    fn write_log(&self, log: &UpdateLog) -> Result<()> {
        let contents = serde_json::to_string_pretty(log)?;
        std::fs::write(self.log_path(), contents)?;
        Ok(())
    }

    /// Remove every cached table and the forest, returning how many files
    /// were deleted
    pub fn clear(&self) -> Result<usize> {
        let mut removed = 0;
        let targets = SourceKind::ALL
            .iter()
            .map(|kind| self.table_path(*kind))
            .chain(std::iter::once(self.forest_path()));

        for path in targets {
            if path.exists() {
                std::fs::remove_file(&path)?;
                removed += 1;
            }
        }

        info!("Cleared {} cached files from {}", removed, self.dir.display());
        Ok(removed)
    }
}
