use lazy_static::lazy_static;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use regex::Regex;
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::BufRead;

lazy_static! {
    static ref RE_TAG: Regex = Regex::new(r"^([A-Za-z_]+):\s*(.*?)\s*$").unwrap();
}

//----------------------------
// OboTerm
//----------------------------
/// The parts of an OBO `[Term]` stanza used for ancestor closure
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OboTerm {
    pub id: String,
    pub alt_ids: Vec<String>,
    pub is_a: Vec<String>,
    pub namespace: Option<String>,
    pub is_obsolete: bool,
}

// `GO:0008150 ! biological_process` -> `GO:0008150`
fn strip_comment(value: &str) -> &str {
    value
        .split('!')
        .next()
        .unwrap_or("")
        .split_whitespace()
        .next()
        .unwrap_or("")
}

/// Reads `[Term]` stanzas of an OBO file. Other stanzas and the header are
/// ignored.
pub fn read_obo<R: BufRead>(reader: R) -> anyhow::Result<Vec<OboTerm>> {
    let mut terms = vec![];
    let mut current: Option<OboTerm> = None;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();

        if line.starts_with('[') {
            if let Some(term) = current.take() {
                terms.push(term);
            }
            if line == "[Term]" {
                current = Some(OboTerm::default());
            }
            continue;
        }

        let term = match current.as_mut() {
            Some(t) => t,
            None => continue,
        };
        let caps = match RE_TAG.captures(line) {
            Some(c) => c,
            None => continue,
        };
        let value = &caps[2];
        match &caps[1] {
            "id" => term.id = strip_comment(value).to_string(),
            "alt_id" => term.alt_ids.push(strip_comment(value).to_string()),
            "is_a" => term.is_a.push(strip_comment(value).to_string()),
            "namespace" => term.namespace = Some(value.to_string()),
            "is_obsolete" => term.is_obsolete = value == "true",
            _ => {}
        }
    }
    if let Some(term) = current.take() {
        terms.push(term);
    }

    terms.retain(|t| !t.id.is_empty());
    Ok(terms)
}

/// Live terms per namespace; terms without one are counted under `-`
pub fn namespace_counts(terms: &[OboTerm]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for term in terms.iter().filter(|t| !t.is_obsolete) {
        let ns = term.namespace.as_deref().unwrap_or("-");
        *counts.entry(ns.to_string()).or_insert(0) += 1;
    }
    counts
}

//----------------------------
// OntologyGraph
//----------------------------
/// Immutable snapshot of an `is_a` hierarchy.
///
/// Edges point from child to parent. Queries only borrow the graph, so one
/// snapshot can be shared by any number of threads.
#[derive(Debug, Clone, Default)]
pub struct OntologyGraph {
    graph: DiGraph<String, ()>,
    index_of: HashMap<String, NodeIndex>,
}

impl OntologyGraph {
    /// Builds the graph; obsolete terms are left out.
    ///
    /// ```
    /// # use genefeat::libs::ontology::{OboTerm, OntologyGraph};
    /// let terms = vec![
    ///     OboTerm { id: "GO:1".into(), ..Default::default() },
    ///     OboTerm { id: "GO:2".into(), is_a: vec!["GO:1".into()], ..Default::default() },
    ///     OboTerm {
    ///         id: "GO:3".into(),
    ///         alt_ids: vec!["GO:30".into()],
    ///         is_a: vec!["GO:2".into()],
    ///         ..Default::default()
    ///     },
    /// ];
    /// let graph = OntologyGraph::from_terms(&terms);
    /// let anc: Vec<String> = graph.ancestors("GO:30").into_iter().collect();
    /// assert_eq!(anc, vec!["GO:1", "GO:2", "GO:3", "GO:30"]);
    /// ```
    pub fn from_terms(terms: &[OboTerm]) -> Self {
        let mut og = Self::default();

        for term in terms.iter().filter(|t| !t.is_obsolete) {
            let node = og.node(&term.id);
            for alt in &term.alt_ids {
                og.index_of.entry(alt.clone()).or_insert(node);
            }
        }
        for term in terms.iter().filter(|t| !t.is_obsolete) {
            let child = og.node(&term.id);
            for parent in &term.is_a {
                let parent = og.node(parent);
                if og.graph.find_edge(child, parent).is_none() {
                    og.graph.add_edge(child, parent, ());
                }
            }
        }

        og
    }

    /// Reads an OBO file (`stdin` and `.gz` accepted)
    pub fn from_obo(infile: &str) -> anyhow::Result<Self> {
        let terms = read_obo(intspan::reader(infile))?;
        let og = Self::from_terms(&terms);
        log::info!(
            "{}: {} terms, {} is_a edges",
            infile,
            og.len(),
            og.graph.edge_count()
        );
        log::debug!(
            "{}: {}",
            infile,
            namespace_counts(&terms)
                .iter()
                .map(|(ns, n)| format!("{}={}", ns, n))
                .join(", ")
        );
        Ok(og)
    }

    fn node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.index_of.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(id.to_string());
        self.index_of.insert(id.to_string(), idx);
        idx
    }

    /// Number of distinct terms
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Known as a primary or alternative ID
    pub fn contains(&self, id: &str) -> bool {
        self.index_of.contains_key(id)
    }

    /// `id` together with every term reachable through `is_a`.
    ///
    /// An ID absent from the graph yields just itself. Every term is
    /// visited once, so cycles in malformed input still terminate.
    pub fn ancestors(&self, id: &str) -> BTreeSet<String> {
        let mut set = BTreeSet::new();
        set.insert(id.to_string());

        if let Some(&start) = self.index_of.get(id) {
            let mut bfs = Bfs::new(&self.graph, start);
            while let Some(nx) = bfs.next(&self.graph) {
                set.insert(self.graph[nx].clone());
            }
        }

        set
    }

    /// Union of [`Self::ancestors`] over several IDs
    pub fn closure<'a, I>(&self, ids: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut set = BTreeSet::new();
        for id in ids {
            set.extend(self.ancestors(id));
        }
        set
    }
}
