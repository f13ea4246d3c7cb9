//! Shared components for CLI commands
//!
//! Logging setup, configuration loading and the statistics every command
//! reports back to `main`.

use crate::cache::Cache;
use crate::cli::args::Args;
use crate::config::AppConfig;
use crate::models::SourceKind;
use crate::progress::create_source_bar;
use anyhow::{Context, Result};
use colored::*;
use indicatif::ProgressBar;
use std::time::Duration;
use tracing::{debug, info};

/// Statistics reported by every command
#[derive(Debug, Clone, Default)]
pub struct CommandStats {
    /// Reference lists loaded or refreshed
    pub sources_loaded: usize,
    /// Rows across every loaded table, search result or export
    pub entries: usize,
    /// Sources or accessions that failed
    pub failures: Vec<(String, String)>,
    pub bytes_written: u64,
    pub elapsed: Duration,
}

impl CommandStats {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Format a byte count in human-readable form
    pub fn format_size(bytes: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = bytes as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", bytes, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Print the failure list, if any, in red
    pub fn print_failures(&self) {
        if !self.has_failures() {
            return;
        }
        println!(
            "  {} {}",
            "Failed:".bright_red(),
            self.failures.len().to_string().bright_red().bold()
        );
        for (name, reason) in &self.failures {
            println!("    {} {}", name.bright_red(), reason);
        }
    }
}

/// Set up structured logging
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("uniprot_filters={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

/// Load configuration using layered approach (file -> env -> args)
pub fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = AppConfig::load(args.config_file.as_deref())
        .context("Failed to load configuration")?;

    if let Some(dir) = &args.cache_dir {
        config = config.with_cache_dir(dir.clone());
    }
    if let Some(secs) = args.timeout_secs {
        config = config.with_timeout_secs(secs);
    }
    config.validate()?;

    info!("Cache directory: {}", config.cache_dir().display());
    Ok(config)
}

pub fn open_cache(config: &AppConfig) -> Result<Cache> {
    let dir = config.cache_dir();
    Cache::open(&dir).with_context(|| format!("Failed to open cache at {}", dir.display()))
}

/// Progress bar for a source, hidden in quiet mode
pub fn source_bar(args: &Args, kind: SourceKind) -> ProgressBar {
    if args.show_progress() {
        create_source_bar(kind.label())
    } else {
        ProgressBar::hidden()
    }
}
