//! Refresh command: fetch, parse and cache reference lists

use super::shared::{CommandStats, load_config, open_cache, source_bar};
use crate::cli::args::{Args, RefreshArgs};
use crate::error::UniprotError;
use crate::fetch::Fetcher;
use crate::sources::{Origin, load_source};
use anyhow::Result;
use colored::*;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Load each requested source in turn
///
/// A source that fails to download or parse is reported and the remaining
/// sources still run. Cancellation stops the whole command.
pub async fn run_refresh(
    args: &Args,
    refresh: &RefreshArgs,
    token: CancellationToken,
) -> Result<CommandStats> {
    let start_time = Instant::now();
    let config = load_config(args)?;
    let fetcher = Fetcher::new(&config)?;
    let cache = open_cache(&config)?;
    let sources = refresh.get_sources();

    info!(
        "Refreshing {} sources{}",
        sources.len(),
        if refresh.force { " (forced)" } else { "" }
    );

    let mut stats = CommandStats::default();
    let mut rows = Vec::new();

    for kind in sources {
        let mut bar = source_bar(args, kind);
        match load_source(kind, &fetcher, &config, &cache, refresh.force, &mut bar, Some(&token)).await
        {
            Ok(loaded) => {
                let count = loaded.parsed.entry_count();
                let origin = match loaded.origin {
                    Origin::Cache => "cached",
                    Origin::Remote => "fetched",
                };
                bar.finish_with_message(format!("{} entries ({})", count, origin));
                stats.sources_loaded += 1;
                stats.entries += count;
                rows.push((kind, count, origin));
            }
            Err(e @ UniprotError::Cancelled { .. }) => {
                bar.abandon_with_message("cancelled");
                return Err(e.into());
            }
            Err(e) => {
                bar.abandon_with_message("failed");
                warn!("Failed to refresh {}: {}", kind.label(), e);
                stats.failures.push((kind.label().to_string(), e.to_string()));
            }
        }
    }

    stats.elapsed = start_time.elapsed();

    println!("\n{}", "Refresh Summary".bright_green().bold());
    for (kind, count, origin) in &rows {
        println!(
            "  {:<24} {:>8} {}",
            format!("{}:", kind.label()).bright_cyan(),
            count.to_string().bright_white().bold(),
            origin
        );
    }
    stats.print_failures();
    println!(
        "  {} {:.2}s",
        "Time elapsed:".bright_cyan(),
        stats.elapsed.as_secs_f64()
    );

    if stats.sources_loaded == 0 && stats.has_failures() {
        anyhow::bail!("No source could be refreshed");
    }
    Ok(stats)
}
