use clap::{CommandFactory, Parser};
use std::process;
use tokio_util::sync::CancellationToken;
use uniprot_filters::cli::{args::Args, commands};

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        let cancellation_token = CancellationToken::new();

        let shutdown_signal = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("Failed to install CTRL+C signal handler: {}", e);
                std::future::pending::<()>().await;
            }
            cancellation_token.cancel();
        };

        tokio::select! {
            result = commands::run(args, cancellation_token.clone()) => result,
            _ = shutdown_signal => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                Err(uniprot_filters::UniprotError::cancelled("interrupted by user").into())
            }
        }
    });

    match result {
        Ok(stats) if stats.has_failures() => process::exit(2),
        Ok(_) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("uniprot-filters - UniProtKB reference lists and search");
    println!("======================================================");
    println!();
    let _ = Args::command().print_help();
    println!();
    println!("EXAMPLES:");
    println!("    # Download and cache every reference list:");
    println!("    uniprot-filters refresh");
    println!();
    println!("    # Print the first species codes:");
    println!("    uniprot-filters show species --limit 10");
    println!();
    println!("    # Pathway hierarchy, two levels deep:");
    println!("    uniprot-filters tree --depth 2");
    println!();
    println!("    # Reviewed human insulin entries with an X-ray structure:");
    println!("    uniprot-filters search insulin --organism 9606 --method x-ray --reviewed true");
    println!();
    println!("    # Download two entries as FASTA:");
    println!("    uniprot-filters export P01308 P68871 --format fasta");
}
