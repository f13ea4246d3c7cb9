//! Pathway hierarchy resolution and cache round trip on the bundled sample

use uniprot_filters::cache::Cache;
use uniprot_filters::models::SourceKind;
use uniprot_filters::pathways::Relation;
use uniprot_filters::progress::NoProgress;
use uniprot_filters::sources::parse_source;

const PATHLIST: &str = include_str!("fixtures/pathlist.txt");

#[test]
fn test_pathway_forest_from_sample() {
    let parsed = parse_source(SourceKind::Pathways, PATHLIST, &mut NoProgress, None).unwrap();
    let forest = parsed.forest.unwrap();

    assert_eq!(forest.len(), 5);
    let roots: Vec<&str> = forest
        .roots()
        .iter()
        .map(|id| forest.node(*id).id.as_str())
        .collect();
    assert_eq!(roots, vec!["Amino-acid biosynthesis", "Amino-acid degradation"]);
    assert!(forest.orphans().is_empty());

    // Two parents, so it appears under both roots
    assert_eq!(
        forest.parent_ids("L-glutamate metabolism"),
        vec!["Amino-acid biosynthesis", "Amino-acid degradation"]
    );
    assert_eq!(
        forest.child_ids("Amino-acid biosynthesis"),
        vec!["L-arginine biosynthesis", "L-glutamate metabolism"]
    );

    let ornithine = forest
        .find("L-arginine biosynthesis via L-ornithine")
        .unwrap();
    assert_eq!(forest.node(ornithine).parents().len(), 1);
    assert_eq!(forest.node(ornithine).parents()[0].1, Relation::PartOf);

    // Accessions resolve to the same node
    assert_eq!(forest.find("UPA00158"), Some(ornithine));
}

#[test]
fn test_rendered_tree() {
    let parsed = parse_source(SourceKind::Pathways, PATHLIST, &mut NoProgress, None).unwrap();
    let forest = parsed.forest.unwrap();

    let expected = "\
Amino-acid biosynthesis
  L-arginine biosynthesis
    L-arginine biosynthesis via L-ornithine (part of)
  L-glutamate metabolism
Amino-acid degradation
  L-glutamate metabolism
";
    assert_eq!(forest.render(None), expected);

    let shallow = forest.render(Some(0));
    assert_eq!(shallow, "Amino-acid biosynthesis\nAmino-acid degradation\n");
}

#[test]
fn test_cache_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let cache = Cache::open(dir.path()).unwrap();
    let parsed = parse_source(SourceKind::Pathways, PATHLIST, &mut NoProgress, None).unwrap();

    cache.store(&parsed).unwrap();
    let cached = cache.load(SourceKind::Pathways).unwrap().unwrap();

    assert_eq!(cached.table, parsed.table);
    assert_eq!(cached.forest, parsed.forest);
    assert!(cached.updated.is_some());
    assert!(cache.table_path(SourceKind::Pathways).exists());
}
