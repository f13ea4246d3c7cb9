//! Export command: download UniProtKB entries to disk

use super::shared::{CommandStats, load_config};
use crate::cli::args::{Args, ExportArgs};
use crate::export::{export_entries, pending_accessions};
use crate::fetch::Fetcher;
use crate::progress::create_source_bar;
use anyhow::Result;
use colored::*;
use indicatif::ProgressBar;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub async fn run_export(
    args: &Args,
    export: &ExportArgs,
    token: CancellationToken,
) -> Result<CommandStats> {
    let start_time = Instant::now();
    let mut config = load_config(args)?;
    if let Some(dir) = &export.output_dir {
        config = config.with_export_dir(dir.clone());
    }
    let fetcher = Fetcher::new(&config)?;

    let pending = pending_accessions(&config.export_dir, &export.accessions, export.format);
    info!(
        "{} of {} accessions to download into {}",
        pending.len(),
        export.accessions.len(),
        config.export_dir.display()
    );

    let mut bar = if args.show_progress() {
        create_source_bar(&format!("Export ({})", export.format))
    } else {
        ProgressBar::hidden()
    };
    let report = export_entries(
        &fetcher,
        &config,
        &export.accessions,
        export.format,
        &mut bar,
        Some(&token),
    )
    .await;
    let report = match report {
        Ok(report) => {
            bar.finish_and_clear();
            report
        }
        Err(e) => {
            bar.abandon();
            return Err(e.into());
        }
    };

    let mut stats = CommandStats {
        entries: report.downloaded.len(),
        bytes_written: report.bytes_written,
        failures: report
            .failed
            .iter()
            .map(|acc| (acc.clone(), "download failed".to_string()))
            .collect(),
        ..CommandStats::default()
    };

    println!("\n{}", "Export Summary".bright_green().bold());
    println!(
        "  {} {}",
        "Downloaded:".bright_cyan(),
        report.downloaded.len().to_string().bright_white().bold()
    );
    println!(
        "  {} {}",
        "Already present:".bright_cyan(),
        report.skipped.len().to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Written:".bright_cyan(),
        CommandStats::format_size(report.bytes_written)
    );
    stats.print_failures();

    stats.elapsed = start_time.elapsed();
    if report.failed.len() == report.total() && !report.failed.is_empty() {
        anyhow::bail!("None of the {} accessions could be exported", report.total());
    }
    Ok(stats)
}
