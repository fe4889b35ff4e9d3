use anyhow::anyhow;
use indexmap::IndexMap;
use std::io::BufRead;

/// Protein domain accession -> ontology category IDs, in file order
pub type DomainToCategories = IndexMap<String, Vec<String>>;

/// Gene ID -> domain accessions hit by any of its transcripts
pub type GeneToDomains = IndexMap<String, Vec<String>>;

/// Parses one pfam2go line into `(domain, category)`.
///
/// ```
/// # use genefeat::libs::domain::parse_pfam2go_line;
/// let line = "Pfam:PF00001 7tm_1 > GO:G protein-coupled receptor activity ; GO:0004930";
/// let (pfam, go) = parse_pfam2go_line(line).unwrap();
/// assert_eq!(pfam, "PF00001");
/// assert_eq!(go, "GO:0004930");
/// ```
pub fn parse_pfam2go_line(line: &str) -> anyhow::Result<(String, String)> {
    let head = line
        .split(' ')
        .next()
        .ok_or_else(|| anyhow!("empty pfam2go line"))?;
    let domain = head
        .split_once(':')
        .map(|(_, acc)| acc)
        .ok_or_else(|| anyhow!("missing domain accession: {}", line))?;
    let category = line
        .split(" ; ")
        .nth(1)
        .map(|s| s.trim())
        .ok_or_else(|| anyhow!("missing category: {}", line))?;

    Ok((domain.to_string(), category.to_string()))
}

/// Reads a pfam2go mapping; `!` lines are comments
pub fn read_pfam2go<R: BufRead>(reader: R) -> anyhow::Result<DomainToCategories> {
    let mut map = DomainToCategories::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.starts_with('!') || line.is_empty() {
            continue;
        }
        let (domain, category) =
            parse_pfam2go_line(line).map_err(|e| anyhow!("pfam2go line {}: {}", i + 1, e))?;
        let entry = map.entry(domain).or_default();
        if !entry.contains(&category) {
            entry.push(category);
        }
    }
    log::info!("Loaded {} domains from pfam2go", map.len());
    Ok(map)
}

/// Reads hmmscan `--tblout` hits and groups domain accessions by gene.
///
/// Column 2 is the domain accession (its `.version` suffix is dropped),
/// column 3 the query transcript. Hits on transcripts missing from
/// `transcript_to_gene` are skipped.
pub fn read_hmmscan<R: BufRead>(
    reader: R,
    transcript_to_gene: &IndexMap<String, String>,
) -> anyhow::Result<GeneToDomains> {
    let mut map = GeneToDomains::new();
    let mut unknown = 0usize;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 3 {
            return Err(anyhow!("hmmscan line {}: too few columns: {}", i + 1, line));
        }
        let domain = cols[1].split('.').next().unwrap_or(cols[1]);
        let transcript = cols[2];

        match transcript_to_gene.get(transcript) {
            Some(gene) => {
                let entry = map.entry(gene.clone()).or_default();
                if !entry.iter().any(|d| d == domain) {
                    entry.push(domain.to_string());
                }
            }
            None => {
                log::warn!("hmmscan line {}: unknown transcript {}", i + 1, transcript);
                unknown += 1;
            }
        }
    }

    log::info!(
        "Collected domains for {} genes ({} hits on unknown transcripts)",
        map.len(),
        unknown
    );
    Ok(map)
}
