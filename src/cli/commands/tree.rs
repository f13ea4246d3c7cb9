//! Tree command: print the pathway hierarchy

use super::shared::{CommandStats, load_config, open_cache, source_bar};
use crate::cli::args::{Args, TreeArgs};
use crate::fetch::Fetcher;
use crate::models::SourceKind;
use crate::sources::load_source;
use anyhow::{Context, Result};
use colored::*;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

pub async fn run_tree(args: &Args, tree: &TreeArgs, token: CancellationToken) -> Result<CommandStats> {
    let start_time = Instant::now();
    let config = load_config(args)?;
    let fetcher = Fetcher::new(&config)?;
    let cache = open_cache(&config)?;

    let mut bar = source_bar(args, SourceKind::Pathways);
    let loaded = load_source(
        SourceKind::Pathways,
        &fetcher,
        &config,
        &cache,
        tree.force,
        &mut bar,
        Some(&token),
    )
    .await?;
    bar.finish_and_clear();

    let forest = loaded
        .parsed
        .forest
        .context("Pathway list was loaded without its hierarchy")?;

    print!("{}", forest.render(tree.depth));

    if !forest.orphans().is_empty() {
        println!(
            "\n{} {}",
            "Unresolved parents:".bright_yellow(),
            forest.orphans().len()
        );
        for id in forest.orphans() {
            println!("  {}", forest.node(*id).display_name());
        }
    }

    Ok(CommandStats {
        sources_loaded: 1,
        entries: forest.len(),
        elapsed: start_time.elapsed(),
        ..CommandStats::default()
    })
}
