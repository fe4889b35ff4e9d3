use crate::libs::domain::{DomainToCategories, GeneToDomains};
use crate::libs::ontology::OntologyGraph;
use anyhow::anyhow;
use itertools::Itertools;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::io::BufRead;

/// Bin of genes whose categories reach no anchor
pub const UNKNOWN_BIN_ID: u32 = 100;

/// Column header of the gene function table
pub const TSV_HEADER: &str = "gene_id\tpfam_ids\tgo_ids\tbin_id";

//----------------------------
// AnchorTable
//----------------------------
/// Category -> bin lookups for the two ranked classes.
///
/// `process` (Biological Process anchors) always takes precedence over
/// `function` (Molecular Function anchors). Lower bins are more specific.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorTable {
    pub process: HashMap<String, u32>,
    pub function: HashMap<String, u32>,
}

impl AnchorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a go-bins table.
    ///
    /// The first line is a header. Columns are bin id, label, comma-separated
    /// process anchors and comma-separated function anchors.
    ///
    /// ```
    /// # use genefeat::libs::binning::AnchorTable;
    /// # use std::io::BufReader;
    /// let text = "bin_id\tlabel\tBP_anchors\tMF_anchors\n\
    ///             1\ttranslation\tGO:0006412\tGO:0003735\n\
    ///             2\ttransport\tGO:0006810,GO:0055085\t\n";
    /// let table = AnchorTable::from_reader(BufReader::new(text.as_bytes())).unwrap();
    /// assert_eq!(table.process.get("GO:0055085"), Some(&2));
    /// assert_eq!(table.function.get("GO:0003735"), Some(&1));
    /// assert_eq!(table.function.len(), 1);
    /// ```
    pub fn from_reader<R: BufRead>(reader: R) -> anyhow::Result<Self> {
        let mut table = Self::new();

        for (i, line) in reader.lines().enumerate().skip(1) {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let cols: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
            if cols.len() < 3 {
                return Err(anyhow!("go-bins line {}: too few columns: {}", i + 1, line));
            }
            let bin_id: u32 = cols[0]
                .trim()
                .parse()
                .map_err(|_| anyhow!("go-bins line {}: invalid bin id: {}", i + 1, cols[0]))?;

            for (col, map) in [(2, &mut table.process), (3, &mut table.function)] {
                let cell = cols.get(col).copied().unwrap_or("");
                for anchor in cell.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()) {
                    map.insert(anchor.to_string(), bin_id);
                }
            }
        }

        log::info!(
            "Loaded {} process and {} function anchors",
            table.process.len(),
            table.function.len()
        );
        Ok(table)
    }

    pub fn from_file(infile: &str) -> anyhow::Result<Self> {
        Self::from_reader(intspan::reader(infile))
    }

    /// Most specific bin reachable from `categories`.
    ///
    /// All categories are expanded to their ancestor closure first. Process
    /// anchors are consulted, and function anchors only when no process
    /// anchor matched at all. Among the matches the lowest bin wins.
    /// Nothing matched gives [`UNKNOWN_BIN_ID`].
    pub fn resolve<'a, I>(&self, categories: I, graph: &OntologyGraph) -> u32
    where
        I: IntoIterator<Item = &'a str>,
    {
        let closure = graph.closure(categories);

        let lowest = |map: &HashMap<String, u32>| -> Option<u32> {
            closure.iter().filter_map(|id| map.get(id)).copied().min()
        };

        lowest(&self.process)
            .or_else(|| lowest(&self.function))
            .unwrap_or(UNKNOWN_BIN_ID)
    }
}

//----------------------------
// GeneFunctionRecord
//----------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneFunctionRecord {
    pub gene_id: String,
    pub domain_ids: BTreeSet<String>,
    pub category_ids: BTreeSet<String>,
    pub bin_id: u32,
}

impl fmt::Display for GeneFunctionRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let categories = if self.category_ids.is_empty() {
            "NA".to_string()
        } else {
            self.category_ids.iter().join(",")
        };
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.gene_id,
            self.domain_ids.iter().join(","),
            categories,
            self.bin_id
        )
    }
}

/// Resolves one gene from its domain hits
pub fn bin_gene(
    gene_id: &str,
    domains: &[String],
    domain_to_categories: &DomainToCategories,
    anchors: &AnchorTable,
    graph: &OntologyGraph,
) -> GeneFunctionRecord {
    let category_ids: BTreeSet<String> = domains
        .iter()
        .filter_map(|d| domain_to_categories.get(d))
        .flatten()
        .cloned()
        .collect();
    let bin_id = anchors.resolve(category_ids.iter().map(|s| s.as_str()), graph);

    GeneFunctionRecord {
        gene_id: gene_id.to_string(),
        domain_ids: domains.iter().cloned().collect(),
        category_ids,
        bin_id,
    }
}

/// One record per gene, in the order of `gene_to_domains`.
///
/// Genes are independent and resolved on rayon's pool.
pub fn bin_genes(
    gene_to_domains: &GeneToDomains,
    domain_to_categories: &DomainToCategories,
    anchors: &AnchorTable,
    graph: &OntologyGraph,
) -> Vec<GeneFunctionRecord> {
    let genes: Vec<(&String, &Vec<String>)> = gene_to_domains.iter().collect();
    genes
        .into_par_iter()
        .map(|(gene, domains)| bin_gene(gene, domains, domain_to_categories, anchors, graph))
        .collect()
}
