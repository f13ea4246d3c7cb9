//! Command-line argument definitions for uniprot-filters
//!
//! Defines the CLI interface using the clap derive API. Verbosity, the
//! config file and the cache location are global and apply to every
//! subcommand.

use crate::export::ExportFormat;
use crate::models::SourceKind;
use crate::search::{SearchFilters, StructureMethod};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the UniProt reference-list tool
#[derive(Debug, Clone, Parser)]
#[command(
    name = "uniprot-filters",
    version,
    about = "Parse UniProtKB reference lists and search UniProtKB with them",
    long_about = "Downloads and parses the reference lists published with UniProtKB \
                  (databases, species, families, pathways, subcellular locations and \
                  tissues), caches them as Parquet tables, and uses them to build \
                  filtered UniProtKB searches and entry exports."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file (TOML format)
    ///
    /// Defaults to <config dir>/uniprot-filters/config.toml when present.
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Override the cache directory
    #[arg(long = "cache-dir", value_name = "PATH", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long = "timeout", value_name = "SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true
    )]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose", global = true)]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Download and parse reference lists into the cache
    Refresh(RefreshArgs),
    /// Print the table of one reference list
    Show(ShowArgs),
    /// Print the pathway hierarchy
    Tree(TreeArgs),
    /// Search UniProtKB
    Search(SearchArgs),
    /// Download UniProtKB entries
    Export(ExportArgs),
    /// Show what is cached and when it was last updated
    Status,
    /// Remove cached tables, keeping the update log
    ClearCache,
}

#[derive(Debug, Clone, Parser)]
pub struct RefreshArgs {
    /// Sources to refresh; all of them when omitted
    #[arg(value_enum, value_name = "SOURCE")]
    pub sources: Vec<SourceKind>,

    /// Fetch even when a cached copy exists
    #[arg(short = 'f', long = "force")]
    pub force: bool,
}

impl RefreshArgs {
    pub fn get_sources(&self) -> Vec<SourceKind> {
        if self.sources.is_empty() {
            SourceKind::ALL.to_vec()
        } else {
            let mut sources = Vec::new();
            for kind in &self.sources {
                if !sources.contains(kind) {
                    sources.push(*kind);
                }
            }
            sources
        }
    }
}

#[derive(Debug, Clone, Parser)]
pub struct ShowArgs {
    #[arg(value_enum, value_name = "SOURCE")]
    pub source: SourceKind,

    /// Number of rows to print
    #[arg(short = 'n', long = "limit", default_value_t = 20)]
    pub limit: usize,

    /// Write the whole table as TSV instead of printing it
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Fetch even when a cached copy exists
    #[arg(short = 'f', long = "force")]
    pub force: bool,
}

#[derive(Debug, Clone, Parser)]
pub struct TreeArgs {
    /// Stop descending below this depth (roots are depth 0)
    #[arg(short = 'd', long = "depth", value_name = "N")]
    pub depth: Option<usize>,

    /// Fetch even when a cached copy exists
    #[arg(short = 'f', long = "force")]
    pub force: bool,
}

#[derive(Debug, Clone, Parser)]
pub struct SearchArgs {
    /// Free-text search term
    #[arg(value_name = "TERM")]
    pub term: String,

    /// Cross-referenced database abbreviation, e.g. PDB
    #[arg(long)]
    pub database: Option<String>,

    /// NCBI taxonomy identifier
    #[arg(long)]
    pub organism: Option<String>,

    /// Structure determination method
    #[arg(long, value_enum)]
    pub method: Option<StructureMethod>,

    /// Minimum mass in Da
    #[arg(long = "min-mass", value_name = "DA")]
    pub min_mass: Option<u64>,

    /// Minimum sequence length
    #[arg(long = "min-length", value_name = "AA")]
    pub min_length: Option<u64>,

    #[arg(long)]
    pub gene: Option<String>,

    /// Subcellular location name
    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub tissue: Option<String>,

    /// Restrict to reviewed (true) or unreviewed (false) entries
    #[arg(long)]
    pub reviewed: Option<bool>,

    /// Extra result columns, e.g. cc_function (repeatable)
    #[arg(long = "field", value_name = "NAME")]
    pub fields: Vec<String>,

    /// Write the result as TSV
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl SearchArgs {
    pub fn filters(&self) -> SearchFilters {
        SearchFilters {
            database: self.database.clone(),
            organism: self.organism.clone(),
            method: self.method,
            min_mass: self.min_mass,
            min_length: self.min_length,
            gene: self.gene.clone(),
            location: self.location.clone(),
            tissue: self.tissue.clone(),
            reviewed: self.reviewed,
        }
    }
}

#[derive(Debug, Clone, Parser)]
pub struct ExportArgs {
    /// UniProtKB accessions to download
    #[arg(value_name = "ACCESSION", required = true)]
    pub accessions: Vec<String>,

    #[arg(long, value_enum, default_value_t = ExportFormat::Fasta)]
    pub format: ExportFormat,

    /// Target directory; the configured export directory when omitted
    #[arg(short = 'o', long = "output-dir", value_name = "PATH")]
    pub output_dir: Option<PathBuf>,
}

impl Args {
    /// Get the log level based on verbosity settings
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level() {
        let mut args = Args::parse_from(["uniprot-filters", "status"]);
        assert_eq!(args.get_log_level(), "warn");

        args.verbose = 1;
        assert_eq!(args.get_log_level(), "info");
        args.verbose = 2;
        assert_eq!(args.get_log_level(), "debug");
        args.verbose = 3;
        assert_eq!(args.get_log_level(), "trace");

        args.quiet = true;
        assert_eq!(args.get_log_level(), "error");
        assert!(!args.show_progress());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::parse_from(["uniprot-filters", "status", "-vv", "--cache-dir", "/tmp/c"]);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.cache_dir, Some(PathBuf::from("/tmp/c")));
        assert!(matches!(args.command, Some(Commands::Status)));
    }

    #[test]
    fn test_refresh_defaults_to_all_sources() {
        let args = Args::parse_from(["uniprot-filters", "refresh"]);
        let Some(Commands::Refresh(refresh)) = args.command else {
            panic!("expected refresh");
        };
        assert_eq!(refresh.get_sources(), SourceKind::ALL.to_vec());
        assert!(!refresh.force);
    }

    #[test]
    fn test_refresh_sources_are_deduplicated() {
        let args = Args::parse_from(["uniprot-filters", "refresh", "pathways", "tissues", "pathways", "--force"]);
        let Some(Commands::Refresh(refresh)) = args.command else {
            panic!("expected refresh");
        };
        assert_eq!(
            refresh.get_sources(),
            vec![SourceKind::Pathways, SourceKind::Tissues]
        );
        assert!(refresh.force);
    }

    #[test]
    fn test_search_filters_from_args() {
        let args = Args::parse_from([
            "uniprot-filters",
            "search",
            "insulin",
            "--organism",
            "9606",
            "--method",
            "x-ray",
            "--min-mass",
            "5000",
            "--reviewed",
            "true",
            "--field",
            "cc_function",
        ]);
        let Some(Commands::Search(search)) = args.command else {
            panic!("expected search");
        };
        let filters = search.filters();
        assert_eq!(filters.organism.as_deref(), Some("9606"));
        assert_eq!(filters.method, Some(StructureMethod::XRay));
        assert_eq!(filters.min_mass, Some(5000));
        assert_eq!(filters.reviewed, Some(true));
        assert_eq!(search.fields, vec!["cc_function"]);
    }

    #[test]
    fn test_export_requires_accessions() {
        assert!(Args::try_parse_from(["uniprot-filters", "export"]).is_err());

        let args = Args::parse_from(["uniprot-filters", "export", "P01308", "--format", "xml"]);
        let Some(Commands::Export(export)) = args.command else {
            panic!("expected export");
        };
        assert_eq!(export.accessions, vec!["P01308"]);
        assert_eq!(export.format, ExportFormat::Xml);
    }

    #[test]
    fn test_subcommand_names() {
        assert!(matches!(
            Args::parse_from(["uniprot-filters", "clear-cache"]).command,
            Some(Commands::ClearCache)
        ));
        let args = Args::parse_from(["uniprot-filters", "show", "species", "-n", "5"]);
        let Some(Commands::Show(show)) = args.command else {
            panic!("expected show");
        };
        assert_eq!(show.source, SourceKind::Species);
        assert_eq!(show.limit, 5);
    }
}
