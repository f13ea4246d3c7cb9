//! Line classification tests

use crate::constants::columns;
use crate::models::SourceKind;
use crate::parser::format::{Cardinality, DataRegion, FormatSpec, LineClass, RegionMarker};

#[test]
fn test_tagged_open_line_strips_period() {
    let spec = FormatSpec::for_kind(SourceKind::Pathways);

    let class = spec.classify("ID   Amino-acid biosynthesis.");
    assert_eq!(
        class,
        LineClass::Open {
            id: "Amino-acid biosynthesis".to_string(),
            fields: vec![("ID", "Amino-acid biosynthesis".to_string())],
        }
    );
}

#[test]
fn test_tagged_field_keeps_period_on_other_tags() {
    let spec = FormatSpec::for_kind(SourceKind::Pathways);

    let class = spec.classify("HI   Amino-acid biosynthesis; UPA00031.");
    assert_eq!(
        class,
        LineClass::Fields(vec![("HI", "Amino-acid biosynthesis; UPA00031.".to_string())])
    );
}

#[test]
fn test_tagged_rejects_unknown_and_malformed_tags() {
    let spec = FormatSpec::for_kind(SourceKind::Subcellular);

    assert_eq!(spec.classify("XX   something"), LineClass::Unknown);
    assert_eq!(spec.classify("IDENTIFIER"), LineClass::Unknown);
    assert_eq!(spec.classify("I"), LineClass::Unknown);
}

#[test]
fn test_terminator_requires_whole_line() {
    let spec = FormatSpec::for_kind(SourceKind::Subcellular);

    assert_eq!(spec.classify("//"), LineClass::Terminator);
    assert_eq!(spec.classify("//  "), LineClass::Terminator);
    // URLs contain the marker but never end a record
    assert_eq!(
        spec.classify("WW   https://en.wikipedia.org/wiki/Acrosome"),
        LineClass::Fields(vec![("WW", "https://en.wikipedia.org/wiki/Acrosome".to_string())])
    );
}

#[test]
fn test_blank_lines() {
    let spec = FormatSpec::for_kind(SourceKind::Families);
    assert_eq!(spec.classify(""), LineClass::Blank);
    assert_eq!(spec.classify("    "), LineClass::Blank);
}

#[test]
fn test_key_colon_trims_key_and_value() {
    let spec = FormatSpec::for_kind(SourceKind::Databases);

    assert_eq!(
        spec.classify("AC  : DB-0022"),
        LineClass::Open {
            id: "DB-0022".to_string(),
            fields: vec![("AC", "DB-0022".to_string())],
        }
    );
    assert_eq!(
        spec.classify("Cat   : 2D gel databases"),
        LineClass::Fields(vec![("Cat", "2D gel databases".to_string())])
    );
    assert_eq!(spec.classify("LinkTp: Explicit"), LineClass::Unknown);
    assert_eq!(spec.classify("no colon at all"), LineClass::Unknown);
}

#[test]
fn test_key_colon_rejects_indented_keys() {
    let spec = FormatSpec::for_kind(SourceKind::Databases);

    assert_eq!(
        spec.classify("  AC  : Accession number of the entry"),
        LineClass::Unknown
    );
    assert_eq!(spec.classify("\tName  : Full name"), LineClass::Unknown);
}

#[test]
fn test_key_colon_splits_on_first_colon_only() {
    let spec = FormatSpec::for_kind(SourceKind::Databases);

    assert_eq!(
        spec.classify("Server: https://web.expasy.org/abcd/"),
        LineClass::Fields(vec![("Server", "https://web.expasy.org/abcd/".to_string())])
    );
}

#[test]
fn test_species_open_line() {
    let spec = FormatSpec::for_kind(SourceKind::Species);

    let class = spec.classify("HUMAN E    9606: N=Homo sapiens");
    assert_eq!(
        class,
        LineClass::Open {
            id: "9606".to_string(),
            fields: vec![
                (columns::TAXON_NODE, "9606".to_string()),
                (columns::CODE, "HUMAN".to_string()),
                (columns::TAXONOMY, "E".to_string()),
                (columns::SCIENTIFIC_NAME, "Homo sapiens".to_string()),
            ],
        }
    );
}

#[test]
fn test_species_continuation_lines() {
    let spec = FormatSpec::for_kind(SourceKind::Species);

    assert_eq!(spec.classify("                 C=Human"), LineClass::Unknown);
    assert_eq!(spec.classify("                 S=Man"), LineClass::Unknown);
    assert_eq!(
        spec.classify("                 N=Homo sapiens"),
        LineClass::Fields(vec![(columns::SCIENTIFIC_NAME, "Homo sapiens".to_string())])
    );
}

#[test]
fn test_species_requires_numeric_taxon() {
    let spec = FormatSpec::for_kind(SourceKind::Species);

    assert_eq!(
        spec.classify("ABCDE X  TAXON: C=Common name"),
        LineClass::Unknown
    );
}

#[test]
fn test_family_header_and_members() {
    let spec = FormatSpec::for_kind(SourceKind::Families);

    assert_eq!(
        spec.classify("14-3-3 family"),
        LineClass::Open {
            id: "14-3-3 family".to_string(),
            fields: vec![(columns::FAMILY, "14-3-3 family".to_string())],
        }
    );
    assert_eq!(
        spec.classify("     1433B_BOVIN (P29358), 1433B_HUMAN (P31946),"),
        LineClass::Fields(vec![
            (columns::ENTRY_NAMES, "1433B_BOVIN".to_string()),
            (columns::ACCESSIONS, "P29358".to_string()),
            (columns::ENTRY_NAMES, "1433B_HUMAN".to_string()),
            (columns::ACCESSIONS, "P31946".to_string()),
        ])
    );
    assert_eq!(spec.classify("I. Protein families"), LineClass::Unknown);
}

#[test]
fn test_region_markers() {
    let rule = RegionMarker::UnderscoreRule(75);
    assert!(rule.matches(&"_".repeat(75)));
    assert!(!rule.matches(&"_".repeat(76)));
    assert!(!rule.matches(&"_".repeat(74)));

    let contains = RegionMarker::Contains("____");
    assert!(contains.matches("_____ _ _______"));
    assert!(!contains.matches("___"));
}

#[test]
fn test_region_shapes() {
    assert!(DataRegion::Whole.starts_open());
    assert!(DataRegion::Whole.start().is_none());

    let between = DataRegion::Between(RegionMarker::Contains("a"), RegionMarker::Contains("b"));
    assert!(!between.starts_open());
    assert_eq!(between.end(), Some(RegionMarker::Contains("b")));
}

#[test]
fn test_cardinality_tables() {
    let pathways = FormatSpec::for_kind(SourceKind::Pathways);
    assert_eq!(pathways.cardinality("DE"), Cardinality::Joined);
    assert_eq!(pathways.cardinality("HI"), Cardinality::Joined);

    let subcell = FormatSpec::for_kind(SourceKind::Subcellular);
    assert_eq!(subcell.cardinality("DE"), Cardinality::Joined);
    assert_eq!(subcell.cardinality("GO"), Cardinality::List);
    assert_eq!(subcell.cardinality("ID"), Cardinality::Single);
    assert!(subcell.buffer_before_open);

    for kind in SourceKind::ALL {
        let spec = FormatSpec::for_kind(kind);
        assert!(spec.rule(spec.open_tag).is_some(), "{kind} open tag has a rule");
        assert!(spec.columns.contains(&spec.open_tag), "{kind} open tag is a column");
    }
}
