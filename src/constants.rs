//! Application constants for the UniProt filter tool
//!
//! Endpoint URLs, reference-list markers, tag tables and placeholder values
//! shared by the parsers, the search client and the CLI.

// =============================================================================
// Endpoints
// =============================================================================

/// Directory holding the UniProtKB documentation lists
pub const UNIPROT_DOCS_BASE_URL: &str =
    "https://ftp.uniprot.org/pub/databases/uniprot/current_release/knowledgebase/complete/docs";

pub const DATABASES_FILE: &str = "dbxref.txt";
pub const SPECIES_FILE: &str = "speclist.txt";
pub const FAMILIES_FILE: &str = "similar.txt";
pub const PATHWAYS_FILE: &str = "pathlist.txt";
pub const SUBCELLULAR_FILE: &str = "subcell.txt";
pub const TISSUES_FILE: &str = "tisslist.txt";

/// UniProtKB REST search endpoint (paged, returns `X-Total-Results`)
pub const UNIPROT_SEARCH_URL: &str = "https://rest.uniprot.org/uniprotkb/search";

/// UniProtKB REST stream endpoint (whole result in one response)
pub const UNIPROT_STREAM_URL: &str = "https://rest.uniprot.org/uniprotkb/stream";

/// Base URL for single-entry downloads, `<base>/<accession>.<ext>`
pub const UNIPROT_ENTRY_URL: &str = "https://rest.uniprot.org/uniprotkb";

/// Header carrying the hit count of a search
pub const TOTAL_RESULTS_HEADER: &str = "X-Total-Results";

/// Columns always requested from the search endpoint
pub const DEFAULT_SEARCH_FIELDS: &[&str] = &[
    "accession",
    "reviewed",
    "id",
    "protein_name",
    "gene_names",
    "organism_name",
    "length",
    "mass",
];

pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const USER_AGENT: &str = concat!("uniprot-filters/", env!("CARGO_PKG_VERSION"));

// =============================================================================
// Placeholders and separators
// =============================================================================

/// Value substituted for any field left empty after parsing
pub const MISSING_VALUE: &str = "NA";

/// Separator used when a list-valued field is flattened into a table cell
pub const LIST_SEPARATOR: &str = "; ";

/// Separator between consecutive lines of a joined free-text field
pub const JOIN_SEPARATOR: &str = " ";

// =============================================================================
// Reference-list markers
// =============================================================================

/// Record terminator of the two-letter tagged lists
pub const RECORD_TERMINATOR: &str = "//";

/// Exact header terminator of pathlist.txt (75 underscores)
pub const PATHWAY_HEADER_RULE_LEN: usize = 75;

/// Column at which the value of a `TT   value` line starts
pub const TAG_VALUE_COLUMN: usize = 5;

/// `//` occurrences in pathlist.txt that belong to the header, not to records
pub const PATHWAY_HEADER_TERMINATORS: usize = 4;

pub mod markers {
    pub const DATABASES_SKIP: &str = "dbxref.txt";
    pub const DATABASES_COUNT: &str = "Abbrev:";

    pub const SPECIES_START: &str = "_____";
    pub const SPECIES_END: &str = "-----";
    pub const SPECIES_NAME_PREFIX: &str = "N=";
    pub const SPECIES_COUNT_PATTERN: &str =
        r"Total number of identification codes currently defined: ([0-9]+?)[.]";
    /// Taxonomy root, dropped from the species table
    pub const SPECIES_ROOT_TAXON: &str = "1";

    pub const FAMILY_HEADER: &str = "family";
    pub const FAMILY_COUNT: &str = " family";
    pub const FAMILY_MEMBER_PATTERN: &str = r"([A-Z0-9]+_[A-Z0-9]+)\s*\(([A-Z0-9]+)\)";

    pub const LIST_START: &str = "____";
}

// =============================================================================
// Tag tables and column names
// =============================================================================

pub mod columns {
    pub const DATABASES: &[&str] = &["AC", "Abbrev", "Name", "Server", "Db_URL", "Cat"];

    pub const TAXON_NODE: &str = "Taxon Node";
    pub const CODE: &str = "Code";
    pub const TAXONOMY: &str = "Taxonomy";
    pub const SCIENTIFIC_NAME: &str = "Scientific name";
    pub const SPECIES: &[&str] = &[TAXON_NODE, CODE, TAXONOMY, SCIENTIFIC_NAME];

    pub const FAMILY: &str = "Family";
    pub const ENTRY_NAMES: &str = "Entry names";
    pub const ACCESSIONS: &str = "Accessions";
    pub const FAMILIES: &[&str] = &[FAMILY, ENTRY_NAMES, ACCESSIONS];

    pub const PATHWAYS: &[&str] = &["ID", "AC", "CL", "DE", "SY", "HI", "HP", "DR"];

    pub const SUBCELLULAR: &[&str] = &[
        "ID", "IT", "IO", "AC", "DE", "SY", "SL", "HI", "HP", "KW", "GO", "AN", "RX", "WW",
    ];

    pub const TISSUES: &[&str] = &["ID", "AC"];
}

// =============================================================================
// Cache layout
// =============================================================================

pub const CACHE_DIR_NAME: &str = "uniprot-filters";
pub const UPDATE_LOG_FILE: &str = "updates.json";
pub const DEFAULT_EXPORT_DIR: &str = "export";
pub const CONFIG_FILE_NAME: &str = "config.toml";
