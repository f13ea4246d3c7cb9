//! Search command: query UniProtKB with the reference-list filters

use super::shared::{CommandStats, load_config};
use crate::cli::args::{Args, SearchArgs};
use crate::fetch::Fetcher;
use crate::progress::create_source_bar;
use crate::search;
use anyhow::{Context, Result};
use colored::*;
use indicatif::ProgressBar;
use polars::prelude::{CsvWriter, SerWriter};
use std::fs::File;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

pub async fn run_search(
    args: &Args,
    search_args: &SearchArgs,
    token: CancellationToken,
) -> Result<CommandStats> {
    let start_time = Instant::now();
    let config = load_config(args)?;
    let fetcher = Fetcher::new(&config)?;

    let mut bar = if args.show_progress() {
        create_source_bar("UniProtKB search")
    } else {
        ProgressBar::hidden()
    };
    let result = search::run_search(
        &fetcher,
        &config,
        &search_args.term,
        &search_args.filters(),
        &search_args.fields,
        &mut bar,
        Some(&token),
    )
    .await;
    let mut result = match result {
        Ok(result) => {
            bar.finish_and_clear();
            result
        }
        Err(e) => {
            bar.abandon();
            return Err(e.into());
        }
    };

    let rows = result.frame.height();
    let mut stats = CommandStats {
        entries: rows,
        ..CommandStats::default()
    };

    println!(
        "{} {} of {} records",
        "Found".bright_green().bold(),
        rows.to_string().bright_white().bold(),
        result.total
    );

    match &search_args.output {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            CsvWriter::new(&mut file)
                .include_header(true)
                .with_separator(b'\t')
                .finish(&mut result.frame)?;
            stats.bytes_written = file.metadata().map(|m| m.len()).unwrap_or(0);
            println!(
                "  {} {} ({})",
                "Saved to".bright_cyan(),
                path.display(),
                CommandStats::format_size(stats.bytes_written)
            );
        }
        None => println!("{}", result.frame),
    }

    stats.elapsed = start_time.elapsed();
    Ok(stats)
}
