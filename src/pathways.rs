//! Pathway hierarchy resolution
//!
//! The flat pathway records carry their parents as free text in two fields:
//! `HI` ("is a") and `HP` ("part of"). After the flat pass these references
//! are resolved into a multi-parent forest. Nodes live in one arena and every
//! edge is a [`NodeId`], so a pathway with several parents is stored once and
//! linked from each of them.

use crate::models::RecordSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write as _;
use tracing::{debug, warn};

/// Index of a node in the forest arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

/// Kind of hierarchy edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    /// From an `HI` line
    IsA,
    /// From an `HP` line
    PartOf,
}

impl Relation {
    fn tag(self) -> &'static str {
        match self {
            Relation::IsA => "HI",
            Relation::PartOf => "HP",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathwayNode {
    pub id: String,
    pub accession: Option<String>,
    parents: Vec<(NodeId, Relation)>,
    children: Vec<(NodeId, Relation)>,
    /// Whether the record carried any `HI` or `HP` text
    referenced: bool,
}

impl PathwayNode {
    pub fn parents(&self) -> &[(NodeId, Relation)] {
        &self.parents
    }

    pub fn is_root(&self) -> bool {
        !self.referenced
    }

    /// Label used when rendering the hierarchy
    pub fn display_name(&self) -> String {
        display_name(&self.id)
    }
}

/// One line of a rendered hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeLine {
    pub depth: usize,
    pub node: NodeId,
    /// Edge from the parent; `None` for roots
    pub relation: Option<Relation>,
}

/// Rooted multi-parent view over the pathway records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathwayForest {
    nodes: Vec<PathwayNode>,
    by_id: HashMap<String, NodeId>,
    by_accession: HashMap<String, NodeId>,
    roots: Vec<NodeId>,
    orphans: Vec<NodeId>,
}

impl PathwayForest {
    /// Resolve parent references of a finalised pathway record set
    ///
    /// Reference text is split on `;` and `.`; every piece naming a known
    /// pathway identifier or accession, other than the node itself, becomes
    /// a parent. A node with neither `HI` nor `HP` is a root. A node whose
    /// references name nothing known is an orphan and is not promoted.
    pub fn resolve(records: &RecordSet) -> Self {
        let mut forest = PathwayForest::default();

        for record in records {
            let node = NodeId(forest.nodes.len());
            let accession = record.get_text("AC").filter(|ac| !ac.is_empty());
            if let Some(ac) = &accession {
                forest.by_accession.insert(ac.clone(), node);
            }
            forest.by_id.insert(record.id.clone(), node);
            forest.nodes.push(PathwayNode {
                id: record.id.clone(),
                accession,
                parents: Vec::new(),
                children: Vec::new(),
                referenced: false,
            });
        }

        for (index, record) in records.iter().enumerate() {
            let child = NodeId(index);
            for relation in [Relation::IsA, Relation::PartOf] {
                let Some(text) = record.get_text(relation.tag()) else {
                    continue;
                };
                if text.trim().is_empty() {
                    continue;
                }
                forest.nodes[index].referenced = true;

                for parent in forest.lookup_references(&text, child) {
                    forest.link(parent, child, relation);
                }
            }
        }

        let names: Vec<String> = forest.nodes.iter().map(|n| n.id.clone()).collect();
        for node in &mut forest.nodes {
            node.children.sort_by(|(a, _), (b, _)| names[a.0].cmp(&names[b.0]));
        }

        forest.collect_roots();
        forest
    }

    fn lookup_references(&self, text: &str, own: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        for token in text.split([';', '.']).map(str::trim) {
            if token.is_empty() {
                continue;
            }
            let hit = self
                .by_id
                .get(token)
                .or_else(|| self.by_accession.get(token))
                .copied();
            if let Some(parent) = hit {
                if parent != own && !found.contains(&parent) {
                    found.push(parent);
                }
            }
        }
        found
    }

    fn link(&mut self, parent: NodeId, child: NodeId, relation: Relation) {
        if self.nodes[child.0].parents.contains(&(parent, relation)) {
            return;
        }
        self.nodes[child.0].parents.push((parent, relation));
        self.nodes[parent.0].children.push((child, relation));
    }

    fn collect_roots(&mut self) {
        let nodes = &self.nodes;
        let mut roots: Vec<NodeId> = (0..nodes.len())
            .map(NodeId)
            .filter(|id| nodes[id.0].is_root())
            .collect();
        roots.sort_by(|a, b| nodes[a.0].id.cmp(&nodes[b.0].id));

        let orphans: Vec<NodeId> = (0..nodes.len())
            .map(NodeId)
            .filter(|id| nodes[id.0].referenced && nodes[id.0].parents.is_empty())
            .collect();

        for orphan in &orphans {
            warn!("Pathway '{}' references no known parent", nodes[orphan.0].id);
        }
        debug!(
            "Resolved pathway forest: {} nodes, {} roots, {} orphans",
            nodes.len(),
            roots.len(),
            orphans.len()
        );

        self.roots = roots;
        self.orphans = orphans;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &PathwayNode {
        &self.nodes[id.0]
    }

    /// Look a node up by pathway identifier or accession
    pub fn find(&self, key: &str) -> Option<NodeId> {
        self.by_id
            .get(key)
            .or_else(|| self.by_accession.get(key))
            .copied()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn orphans(&self) -> &[NodeId] {
        &self.orphans
    }

    /// Identifiers of the direct parents of a pathway
    pub fn parent_ids(&self, key: &str) -> Vec<&str> {
        self.find(key)
            .map(|id| {
                self.node(id)
                    .parents
                    .iter()
                    .map(|(parent, _)| self.nodes[parent.0].id.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Identifiers of the direct children of a pathway
    pub fn child_ids(&self, key: &str) -> Vec<&str> {
        self.find(key)
            .map(|id| {
                self.node(id)
                    .children
                    .iter()
                    .map(|(child, _)| self.nodes[child.0].id.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Depth-first walk from every root
    ///
    /// A node reachable through several parents is visited under each of
    /// them. A node already on the current path is not descended into again,
    /// so reference cycles terminate. `max_depth` of `Some(0)` yields only
    /// the roots.
    pub fn walk(&self, max_depth: Option<usize>) -> Vec<TreeLine> {
        let mut lines = Vec::new();
        let mut path = Vec::new();
        for &root in &self.roots {
            self.walk_from(root, None, 0, max_depth, &mut path, &mut lines);
        }
        lines
    }

    fn walk_from(
        &self,
        node: NodeId,
        relation: Option<Relation>,
        depth: usize,
        max_depth: Option<usize>,
        path: &mut Vec<NodeId>,
        lines: &mut Vec<TreeLine>,
    ) {
        lines.push(TreeLine {
            depth,
            node,
            relation,
        });
        if max_depth.is_some_and(|max| depth >= max) {
            return;
        }

        path.push(node);
        for &(child, edge) in &self.nodes[node.0].children {
            if path.contains(&child) {
                warn!(
                    "Pathway cycle through '{}' not followed",
                    self.nodes[child.0].id
                );
                continue;
            }
            self.walk_from(child, Some(edge), depth + 1, max_depth, path, lines);
        }
        path.pop();
    }

    /// Indented text rendering of the forest
    pub fn render(&self, max_depth: Option<usize>) -> String {
        let mut out = String::new();
        for line in self.walk(max_depth) {
            let node = self.node(line.node);
            let marker = match line.relation {
                Some(Relation::PartOf) => " (part of)",
                _ => "",
            };
            let _ = writeln!(
                out,
                "{}{}{}",
                "  ".repeat(line.depth),
                node.display_name(),
                marker
            );
        }
        out
    }
}

/// Normalise a pathway name for display
///
/// The first letter is capitalised unless the name already starts with an
/// upper-case letter. Names containing a nucleic-acid token such as `tRNA`
/// or `mRNA` keep that token intact and only the text before it is
/// capitalised.
pub fn display_name(name: &str) -> String {
    if let Some(split) = nucleic_acid_split(name) {
        let (head, tail) = name.split_at(split);
        return format!("{}{}", capitalize(head), tail);
    }

    match name.chars().next() {
        None => String::new(),
        Some(first) if first.is_uppercase() => name.to_string(),
        Some(_) => capitalize(name),
    }
}

/// Byte offset of the word character preceding the last `DNA`/`RNA` token
/// that has one
fn nucleic_acid_split(name: &str) -> Option<usize> {
    let mut best = None;
    for (position, _) in name.match_indices("NA") {
        if position == 0 {
            continue;
        }
        let before = &name[..position];
        let Some(letter) = before.chars().next_back() else {
            continue;
        };
        if letter != 'D' && letter != 'R' {
            continue;
        }
        let token_start = position - 1;
        let Some(prefix) = name[..token_start].chars().next_back() else {
            continue;
        };
        if prefix.is_alphanumeric() || prefix == '_' {
            best = Some(token_start - prefix.len_utf8());
        }
    }
    best
}

/// First character upper-cased, the rest lower-cased
pub(crate) fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
    }
}
