//! One-call parsing of a reference-list payload
//!
//! Runs the pre-scan, the main pass and the table builder, and resolves the
//! pathway forest when the source is the pathway list. Nothing is handed to
//! the caller until every step has completed.
//!
//! [`load_source`] puts the cache in front of the fetch and parse.

use crate::cache::Cache;
use crate::config::AppConfig;
use crate::error::{Result, UniprotError};
use crate::fetch::Fetcher;
use crate::models::{ParseStats, SourceKind};
use crate::parser::{FormatSpec, parse_reference};
use crate::pathways::PathwayForest;
use crate::progress::{ProgressObserver, ProgressTracker};
use crate::table::Table;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Terminal result of parsing one reference list
#[derive(Debug, Clone)]
pub struct ParsedSource {
    pub kind: SourceKind,
    pub table: Table,
    /// Present for [`SourceKind::Pathways`] only
    pub forest: Option<PathwayForest>,
    pub stats: ParseStats,
}

impl ParsedSource {
    /// Number of rows in the finished table
    pub fn entry_count(&self) -> usize {
        self.table.len()
    }
}

/// Parse a complete payload into its table (and forest, for pathways)
pub fn parse_source<O: ProgressObserver + ?Sized>(
    kind: SourceKind,
    text: &str,
    observer: &mut O,
    cancel: Option<&CancellationToken>,
) -> Result<ParsedSource> {
    let output = parse_reference(kind, text, observer, cancel)?;
    let spec = FormatSpec::for_kind(kind);
    let table = Table::build(&spec, &output.records);

    let forest = match kind {
        SourceKind::Pathways => Some(PathwayForest::resolve(&output.records)),
        _ => None,
    };

    info!("Parsed {}: {} entries", kind.label(), table.len());

    Ok(ParsedSource {
        kind,
        table,
        forest,
        stats: output.stats,
    })
}

/// Where a loaded source was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cache,
    Remote,
}

#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub parsed: ParsedSource,
    pub origin: Origin,
    pub updated: Option<DateTime<Utc>>,
}

/// Return a source from the cache, or fetch, parse and cache it
///
/// `force` skips the cache lookup. A cached source carries empty parse
/// statistics since no parse ran.
pub async fn load_source<O: ProgressObserver + ?Sized>(
    kind: SourceKind,
    fetcher: &Fetcher,
    config: &AppConfig,
    cache: &Cache,
    force: bool,
    observer: &mut O,
    cancel: Option<&CancellationToken>,
) -> Result<LoadedSource> {
    if !force {
        if let Some(cached) = cache.load(kind)? {
            debug!("Using cached {}", kind.label());
            // A cache hit is one step: report the start, then completion
            let mut tracker = ProgressTracker::new(1, observer);
            tracker.start();
            tracker.advance();
            return Ok(LoadedSource {
                parsed: ParsedSource {
                    kind,
                    table: cached.table,
                    forest: cached.forest,
                    stats: ParseStats::default(),
                },
                origin: Origin::Cache,
                updated: cached.updated,
            });
        }
    }

    if cancel.is_some_and(|token| token.is_cancelled()) {
        return Err(UniprotError::cancelled(format!("{} not loaded", kind.label())));
    }

    let text = fetcher.fetch_text(&config.source_location(kind)).await?;
    let parsed = parse_source(kind, &text, observer, cancel)?;
    let updated = cache.store(&parsed)?;

    Ok(LoadedSource {
        parsed,
        origin: Origin::Remote,
        updated: Some(updated),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use tempfile::tempdir;

    #[test]
    fn test_only_pathways_carry_a_forest() {
        let tissues = "____\nID   Acinus.\nAC   TS-0001\n//\n";
        let parsed = parse_source(SourceKind::Tissues, tissues, &mut NoProgress, None).unwrap();
        assert!(parsed.forest.is_none());
        assert_eq!(parsed.entry_count(), 1);

        let pathways = format!("{}\nID   Root pathway.\nAC   UPA00001\n//\n", "_".repeat(75));
        let parsed = parse_source(SourceKind::Pathways, &pathways, &mut NoProgress, None).unwrap();
        let forest = parsed.forest.unwrap();
        assert_eq!(forest.roots().len(), 1);
    }

    #[tokio::test]
    async fn test_load_source_prefers_cache_unless_forced() {
        let dir = tempdir().unwrap();
        let list = dir.path().join("tisslist.txt");
        std::fs::write(&list, "____\nID   Acinus.\nAC   TS-0001\n//\n").unwrap();

        let config = AppConfig::default()
            .with_source(SourceKind::Tissues, list.to_string_lossy())
            .with_cache_dir(dir.path().join("cache"));
        let fetcher = Fetcher::new(&config).unwrap();
        let cache = Cache::open(config.cache_dir()).unwrap();

        let first = load_source(SourceKind::Tissues, &fetcher, &config, &cache, false, &mut NoProgress, None)
            .await
            .unwrap();
        assert_eq!(first.origin, Origin::Remote);
        assert_eq!(first.parsed.stats.records_opened, 1);

        // The list changes on disk but the cached copy is served
        std::fs::write(&list, "____\nID   Acinus.\nAC   TS-0001\n//\nID   Adipocyte.\nAC   TS-0002\n//\n").unwrap();
        let mut seen: Vec<u8> = Vec::new();
        let second = load_source(SourceKind::Tissues, &fetcher, &config, &cache, false, &mut seen, None)
            .await
            .unwrap();
        assert_eq!(second.origin, Origin::Cache);
        assert_eq!(second.parsed.table, first.parsed.table);
        assert_eq!(seen, vec![0, 100]);

        let forced = load_source(SourceKind::Tissues, &fetcher, &config, &cache, true, &mut NoProgress, None)
            .await
            .unwrap();
        assert_eq!(forced.origin, Origin::Remote);
        assert_eq!(forced.parsed.entry_count(), 2);
    }
}
