//! Command implementations for the uniprot-filters CLI
//!
//! Each subcommand lives in its own module. Every command receives the
//! cancellation token created by `main` and stops at the next line, chunk or
//! accession once Ctrl-C has been pressed.

pub mod export;
pub mod refresh;
pub mod search;
pub mod shared;
pub mod show;
pub mod status;
pub mod tree;

pub use shared::CommandStats;

use crate::cli::args::{Args, Commands};
use anyhow::Result;
use tokio_util::sync::CancellationToken;

/// Main command runner
///
/// Sets up logging once, then dispatches to the subcommand handler.
pub async fn run(args: Args, token: CancellationToken) -> Result<CommandStats> {
    shared::setup_logging(&args);

    let Some(command) = args.command.clone() else {
        return Ok(CommandStats::default());
    };

    match command {
        Commands::Refresh(refresh_args) => refresh::run_refresh(&args, &refresh_args, token).await,
        Commands::Show(show_args) => show::run_show(&args, &show_args, token).await,
        Commands::Tree(tree_args) => tree::run_tree(&args, &tree_args, token).await,
        Commands::Search(search_args) => search::run_search(&args, &search_args, token).await,
        Commands::Export(export_args) => export::run_export(&args, &export_args, token).await,
        Commands::Status => status::run_status(&args),
        Commands::ClearCache => status::run_clear_cache(&args),
    }
}
