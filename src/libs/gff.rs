use crate::libs::feature::{FeatureRecord, FeatureType, Strand};
use anyhow::{bail, Context};
use bio::io::gff;
use indexmap::IndexMap;
use itertools::Itertools;
use std::collections::HashSet;
use std::io::{Read, Write};
use std::str::FromStr;

//----------------------------
// Attribute access
//----------------------------
/// Value of the `ID` attribute
///
/// ```
/// # use genefeat::libs::gff::{id, read_gff_records};
/// let text = "chr1\tRefSeq\tCDS\t10\t20\t.\t+\t0\tID=cds-XP_1;Parent=rna-XM_1;gbkey=CDS\n";
/// let records = read_gff_records(text.as_bytes()).unwrap();
/// assert_eq!(id(&records[0]), Some("cds-XP_1"));
/// assert_eq!(records[0].attributes().get("gbkey").map(|s| s.as_str()), Some("CDS"));
/// ```
pub fn id(record: &gff::Record) -> Option<&str> {
    record.attributes().get("ID").map(|s| s.as_str())
}

/// All parents; GFF3 allows a comma-separated list
pub fn parents(record: &gff::Record) -> Vec<&str> {
    record
        .attributes()
        .get_vec("Parent")
        .map(|v| v.iter().map(|s| s.as_str()).filter(|p| !p.is_empty()).collect())
        .unwrap_or_default()
}

/// Records of the gene model, one per parent.
///
/// `None` when the feature type is not part of the model.
pub fn to_records(record: &gff::Record) -> Option<Vec<FeatureRecord>> {
    let feature_type = FeatureType::from_str(record.feature_type()).ok()?;

    // coordinates were checked to fit u32 when the record was read
    let strand = record
        .strand()
        .and_then(|s| Strand::from_symbol(s.strand_symbol()));
    let mut base = FeatureRecord::new(
        record.seqname(),
        feature_type,
        *record.start() as u32,
        *record.end() as u32,
    )
    .with_strand(strand);
    if let Some(id) = id(record) {
        base = base.with_id(id);
    }

    let parents = parents(record);
    if parents.is_empty() {
        return Some(vec![base]);
    }
    Some(
        parents
            .into_iter()
            .map(|p| base.clone().with_parent(p))
            .collect(),
    )
}

//----------------------------
// Reading
//----------------------------
/// Reads all GFF3 records; comments, directives and blank lines are skipped
pub fn read_gff_records<R: Read>(reader: R) -> anyhow::Result<Vec<gff::Record>> {
    let mut reader = gff::Reader::new(reader, gff::GffType::GFF3);
    let mut records = vec![];
    for (i, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("GFF record {}", i + 1))?;
        if *record.end() > u32::MAX as u64 {
            bail!(
                "GFF record {}: {} {} ends past {}",
                i + 1,
                record.seqname(),
                record.feature_type(),
                u32::MAX
            );
        }
        records.push(record);
    }

    Ok(records)
}

/// Converts GFF3 records to the gene model.
///
/// Types outside the model are skipped. Exons and CDS hanging from a
/// skipped transcript (lnc_RNA, tRNA, ...) are dropped with it; children of
/// parents absent from the file are kept so derivation reports them.
pub fn to_feature_records(gff_records: &[gff::Record]) -> Vec<FeatureRecord> {
    let mut records = vec![];
    let mut skipped_ids: HashSet<&str> = HashSet::new();
    let mut skipped_types: IndexMap<&str, usize> = IndexMap::new();

    for gff_record in gff_records {
        match to_records(gff_record) {
            Some(recs) => records.extend(recs),
            None => {
                if let Some(id) = id(gff_record) {
                    skipped_ids.insert(id);
                }
                *skipped_types.entry(gff_record.feature_type()).or_default() += 1;
            }
        }
    }

    let model_ids: HashSet<String> = records.iter().filter_map(|r| r.id.clone()).collect();
    let before = records.len();
    records.retain(|r| match (&r.feature_type, r.parent_id.as_deref()) {
        (FeatureType::Exon | FeatureType::Cds, Some(p)) => {
            model_ids.contains(p) || !skipped_ids.contains(p)
        }
        _ => true,
    });

    if !skipped_types.is_empty() {
        log::debug!(
            "Skipped feature types: {}",
            skipped_types
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .join(", ")
        );
    }
    if before > records.len() {
        log::debug!(
            "Dropped {} exon/CDS records of non-mRNA transcripts",
            before - records.len()
        );
    }

    records
}

/// Reads a GFF3 file (`stdin` and `.gz` accepted) into the gene model
pub fn read_gff(infile: &str) -> anyhow::Result<Vec<FeatureRecord>> {
    let gff_records =
        read_gff_records(intspan::reader(infile)).with_context(|| format!("reading {}", infile))?;
    let records = to_feature_records(&gff_records);
    log::info!(
        "{}: {} GFF records, {} model records",
        infile,
        gff_records.len(),
        records.len()
    );
    Ok(records)
}

/// Maps each mRNA ID to its gene ID
pub fn transcript_to_gene(records: &[FeatureRecord]) -> IndexMap<String, String> {
    let gene_ids: HashSet<&str> = records
        .iter()
        .filter(|r| r.feature_type == FeatureType::Gene)
        .filter_map(|r| r.id.as_deref())
        .collect();

    records
        .iter()
        .filter(|r| r.feature_type == FeatureType::MRna)
        .filter_map(|r| match (r.id.as_deref(), r.parent_id.as_deref()) {
            (Some(id), Some(parent)) if gene_ids.contains(parent) => {
                Some((id.to_string(), parent.to_string()))
            }
            _ => None,
        })
        .collect()
}

//----------------------------
// Writing
//----------------------------
/// Writes records as GFF3 data lines.
///
/// Multi-valued attributes such as `Parent=t1,t2` are written back as one
/// comma-joined value. Attribute order within a line is not preserved.
pub fn write_gff_records<W: Write>(writer: W, records: &[gff::Record]) -> anyhow::Result<()> {
    let mut writer = gff::Writer::new(writer, gff::GffType::GFF3);
    for record in records {
        let multi: Vec<(String, String)> = record
            .attributes()
            .iter_all()
            .filter(|(_, v)| v.len() > 1)
            .map(|(k, v)| (k.clone(), v.join(",")))
            .collect();
        if multi.is_empty() {
            writer.write(record)?;
        } else {
            let mut record = record.clone();
            for (key, value) in multi {
                record.attributes_mut().remove(&key);
                record.attributes_mut().insert(key, value);
            }
            writer.write(&record)?;
        }
    }

    Ok(())
}

//----------------------------
// CDS-span simplification
//----------------------------
fn cds_span<'a, I: IntoIterator<Item = &'a gff::Record>>(cds: I) -> Option<(u64, u64)> {
    cds.into_iter().fold(None, |acc, c| match acc {
        None => Some((*c.start(), *c.end())),
        Some((s, e)) => Some((s.min(*c.start()), e.max(*c.end()))),
    })
}

/// Keeps only genes, their mRNAs and CDS, trimming each gene and mRNA to
/// the span of its CDS.
///
/// Genes are ordered by sequence and start, mRNAs and CDS by start. Genes
/// and mRNAs without CDS keep their coordinates.
pub fn simplify_to_cds(records: &[gff::Record]) -> Vec<gff::Record> {
    let mut children: IndexMap<&str, Vec<&gff::Record>> = IndexMap::new();
    for record in records {
        for parent in parents(record) {
            children.entry(parent).or_default().push(record);
        }
    }
    let kids_of = |id: Option<&str>, kind: &str| -> Vec<&gff::Record> {
        id.and_then(|id| children.get(id))
            .map(|v| {
                v.iter()
                    .filter(|c| c.feature_type() == kind)
                    .copied()
                    .sorted_by_key(|c| *c.start())
                    .collect()
            })
            .unwrap_or_default()
    };

    let genes = records
        .iter()
        .filter(|r| r.feature_type() == "gene")
        .sorted_by(|a, b| a.seqname().cmp(b.seqname()).then(a.start().cmp(b.start())));

    let mut out = vec![];
    for gene in genes {
        let mrnas = kids_of(id(gene), "mRNA");
        let cds_of: Vec<Vec<&gff::Record>> = mrnas.iter().map(|m| kids_of(id(m), "CDS")).collect();

        let mut gene = gene.clone();
        if let Some((s, e)) = cds_span(cds_of.iter().flatten().copied()) {
            *gene.start_mut() = s;
            *gene.end_mut() = e;
        }
        out.push(gene);

        for (mrna, cds) in mrnas.into_iter().zip(cds_of) {
            let mut mrna = mrna.clone();
            if let Some((s, e)) = cds_span(cds.iter().copied()) {
                *mrna.start_mut() = s;
                *mrna.end_mut() = e;
            }
            out.push(mrna);
            out.extend(cds.into_iter().cloned());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const GFF: &str = "##gff-version 3
#!genome-build-accession NCBI_Assembly:GCF_000001
ctg1\tRefSeq\tregion\t1\t1000\t.\t+\t.\tID=ctg1:1..1000
ctg1\tRefSeq\tgene\t100\t400\t.\t+\t.\tID=gene-A;Name=A
ctg1\tRefSeq\tmRNA\t100\t400\t.\t+\t.\tID=rna-A1;Parent=gene-A
ctg1\tRefSeq\texon\t100\t150\t.\t+\t.\tID=exon-A1-1;Parent=rna-A1
ctg1\tRefSeq\texon\t300\t400\t.\t+\t.\tID=exon-A1-2;Parent=rna-A1
ctg1\tRefSeq\tCDS\t120\t150\t.\t+\t0\tID=cds-A1;Parent=rna-A1
ctg1\tRefSeq\tCDS\t300\t380\t.\t+\t2\tID=cds-A1;Parent=rna-A1
ctg1\tRefSeq\tgene\t600\t700\t.\t-\t.\tID=gene-B
ctg1\tRefSeq\tlnc_RNA\t600\t700\t.\t-\t.\tID=rna-B1;Parent=gene-B
ctg1\tRefSeq\texon\t600\t700\t.\t-\t.\tID=exon-B1-1;Parent=rna-B1

ctg1\tRefSeq\tsequence_feature\t800\t810\t.\t.\t.\tID=sf1
";

    fn records() -> Vec<gff::Record> {
        read_gff_records(GFF.as_bytes()).unwrap()
    }

    fn parse(text: &str) -> Vec<gff::Record> {
        read_gff_records(text.as_bytes()).unwrap()
    }

    #[test]
    fn test_read_records() {
        let records = records();
        assert_eq!(records.len(), 11);
        assert_eq!(records[0].feature_type(), "region");
        assert_eq!(records[6].frame(), "2");
        assert_eq!(parents(&records[4]), vec!["rna-A1"]);
        assert_eq!(id(&records[1]), Some("gene-A"));
        assert_eq!(*records[1].start(), 100);
        assert_eq!(*records[1].end(), 400);
    }

    #[test]
    fn test_bad_records() {
        let err = read_gff_records("ctg1\tRefSeq\tgene\t1\n".as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("GFF record 1"));

        let bad = "ctg1\tRefSeq\tgene\tx\t10\t.\t+\t.\tID=g\n";
        assert!(read_gff_records(bad.as_bytes()).is_err());
    }

    #[test]
    fn test_to_records_skips_non_model_transcripts() {
        let records = to_feature_records(&records());
        let kinds: Vec<String> = records.iter().map(|r| r.feature_type.to_string()).collect();
        assert_eq!(
            kinds,
            vec!["region", "gene", "mRNA", "exon", "exon", "CDS", "CDS", "gene"]
        );
        assert_eq!(records[1].strand, Some(Strand::Forward));
        assert_eq!(records[7].strand, Some(Strand::Reverse));
        assert_eq!(records[3].parent_id.as_deref(), Some("rna-A1"));
    }

    #[test]
    fn test_unstranded() {
        let records = parse("c\tx\tregion\t1\t100\t.\t.\t.\tID=c\n");
        let recs = to_records(&records[0]).unwrap();
        assert_eq!(recs[0].strand, None);
    }

    #[test]
    fn test_unknown_parents_are_kept() {
        let gff_records = parse(
            "c\tx\tregion\t1\t100\t.\t.\t.\tID=c\n\
             c\tx\texon\t10\t20\t.\t+\t.\tParent=rna-missing\n",
        );
        let records = to_feature_records(&gff_records);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].parent_id.as_deref(), Some("rna-missing"));
    }

    #[test]
    fn test_multi_parent() {
        let gff_records = parse("c\tx\texon\t10\t20\t.\t-\t.\tID=e1;Parent=t1,t2\n");
        let records = to_records(&gff_records[0]).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].parent_id.as_deref(), Some("t1"));
        assert_eq!(records[1].parent_id.as_deref(), Some("t2"));
        assert_eq!(records[1].id.as_deref(), Some("e1"));
    }

    #[test]
    fn test_transcript_to_gene() {
        let records = to_feature_records(&records());
        let map = transcript_to_gene(&records);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("rna-A1").map(|s| s.as_str()), Some("gene-A"));
    }

    #[test]
    fn test_simplify_to_cds() {
        let out = simplify_to_cds(&records());
        let got: Vec<String> = out
            .iter()
            .map(|r| format!("{}:{}-{}", r.feature_type(), r.start(), r.end()))
            .collect();
        assert_eq!(
            got,
            vec![
                "gene:120-380",
                "mRNA:120-380",
                "CDS:120-150",
                "CDS:300-380",
                "gene:600-700",
            ]
        );
        // attributes are untouched
        assert_eq!(id(&out[1]), Some("rna-A1"));
        assert_eq!(parents(&out[1]), vec!["gene-A"]);
    }

    #[test]
    fn test_write_keeps_all_parents() {
        let gff_records = parse("c\tx\texon\t10\t20\t.\t-\t.\tID=e1;Parent=t1,t2\n");
        let mut buf = vec![];
        write_gff_records(&mut buf, &gff_records).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let cols: Vec<&str> = text.trim_end().split('\t').collect();
        assert_eq!(cols.len(), 9);
        assert_eq!(&cols[..8], &["c", "x", "exon", "10", "20", ".", "-", "."]);
        let attrs: Vec<&str> = cols[8].split(';').sorted().collect();
        assert_eq!(attrs, vec!["ID=e1", "Parent=t1,t2"]);

        // and reads back to the same parents
        let again = parse(&text);
        assert_eq!(parents(&again[0]), vec!["t1", "t2"]);
    }
}
