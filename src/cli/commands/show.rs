//! Show command: print or save one reference-list table

use super::shared::{CommandStats, load_config, open_cache, source_bar};
use crate::cli::args::{Args, ShowArgs};
use crate::fetch::Fetcher;
use crate::sources::load_source;
use anyhow::{Context, Result};
use colored::*;
use std::fs::File;
use std::io::BufWriter;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

pub async fn run_show(args: &Args, show: &ShowArgs, token: CancellationToken) -> Result<CommandStats> {
    let start_time = Instant::now();
    let config = load_config(args)?;
    let fetcher = Fetcher::new(&config)?;
    let cache = open_cache(&config)?;

    let mut bar = source_bar(args, show.source);
    let loaded = load_source(show.source, &fetcher, &config, &cache, show.force, &mut bar, Some(&token)).await?;
    bar.finish_and_clear();

    let table = &loaded.parsed.table;
    let mut stats = CommandStats {
        sources_loaded: 1,
        entries: table.len(),
        ..CommandStats::default()
    };

    match &show.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            table.write_tsv(BufWriter::new(file))?;
            stats.bytes_written = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
            println!(
                "{} {} rows to {}",
                "Wrote".bright_green(),
                table.len().to_string().bright_white().bold(),
                path.display()
            );
        }
        None => {
            let frame = table.head(show.limit).to_dataframe()?;
            println!(
                "{} ({} of {} entries)",
                show.source.label().bright_green().bold(),
                frame.height(),
                table.len()
            );
            if let Some(updated) = loaded.updated {
                println!("  {} {}", "Updated:".bright_cyan(), updated.to_rfc3339());
            }
            println!("{}", frame);
        }
    }

    stats.elapsed = start_time.elapsed();
    Ok(stats)
}
