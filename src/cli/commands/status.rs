//! Status and clear-cache commands

use super::shared::{CommandStats, load_config, open_cache};
use crate::cli::args::Args;
use crate::models::SourceKind;
use anyhow::Result;
use colored::*;
use std::time::Instant;

/// List every source with its cache state and last update time
pub fn run_status(args: &Args) -> Result<CommandStats> {
    let start_time = Instant::now();
    let config = load_config(args)?;
    let cache = open_cache(&config)?;
    let updates = cache.updates()?;

    println!("{}", "Reference lists".bright_green().bold());
    println!("  {} {}", "Cache:".bright_cyan(), cache.dir().display());

    let mut stats = CommandStats::default();
    for kind in SourceKind::ALL {
        let state = if cache.contains(kind) {
            stats.sources_loaded += 1;
            let size = std::fs::metadata(cache.table_path(kind))
                .map(|m| m.len())
                .unwrap_or(0);
            stats.bytes_written += size;
            format!("cached, {}", CommandStats::format_size(size))
                .bright_white()
                .to_string()
        } else {
            "not cached".dimmed().to_string()
        };
        let updated = updates
            .get(kind.label())
            .map(|stamp| stamp.to_rfc3339())
            .unwrap_or_else(|| "never".to_string());

        println!(
            "  {:<24} {:<22} {} {}",
            format!("{}:", kind.label()).bright_cyan(),
            state,
            "updated".dimmed(),
            updated
        );
    }

    stats.elapsed = start_time.elapsed();
    Ok(stats)
}

/// Remove the cached tables; the update log survives
pub fn run_clear_cache(args: &Args) -> Result<CommandStats> {
    let start_time = Instant::now();
    let config = load_config(args)?;
    let cache = open_cache(&config)?;
    let removed = cache.clear()?;

    println!(
        "{} {} files from {}",
        "Removed".bright_green().bold(),
        removed.to_string().bright_white().bold(),
        cache.dir().display()
    );

    Ok(CommandStats {
        entries: removed,
        elapsed: start_time.elapsed(),
        ..CommandStats::default()
    })
}
