use crate::libs::error::DerivationError;
use crate::libs::feature::{sort_for_output, FeatureRecord, FeatureType};
use crate::libs::intergenic::derive_intergenic;
use crate::libs::intron::derive_introns;
use indexmap::IndexMap;
use rayon::prelude::*;

/// Which children of an mRNA delimit its introns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntronSource {
    #[default]
    Exon,
    Cds,
}

impl IntronSource {
    pub fn feature_type(&self) -> FeatureType {
        match self {
            IntronSource::Exon => FeatureType::Exon,
            IntronSource::Cds => FeatureType::Cds,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeriveOptions {
    pub intergenic: bool,
    pub introns: bool,
    pub intron_source: IntronSource,
}

impl Default for DeriveOptions {
    fn default() -> Self {
        Self {
            intergenic: true,
            introns: true,
            intron_source: IntronSource::Exon,
        }
    }
}

// Label used in error messages for records that may lack an ID
fn label(rec: &FeatureRecord) -> String {
    match &rec.id {
        Some(id) => id.clone(),
        None => format!("{}-{}", rec.start, rec.end),
    }
}

/// Validated view of one sequence's gene model
struct Hierarchy<'a> {
    region: &'a FeatureRecord,
    genes: Vec<&'a FeatureRecord>,
    transcripts: IndexMap<&'a str, &'a FeatureRecord>,
    children: IndexMap<&'a str, Vec<&'a FeatureRecord>>,
}

impl<'a> Hierarchy<'a> {
    fn build(
        seq_id: &str,
        records: &'a [FeatureRecord],
        source: FeatureType,
    ) -> Result<Self, DerivationError> {
        let regions: Vec<&FeatureRecord> = records
            .iter()
            .filter(|r| r.feature_type == FeatureType::Region)
            .collect();
        let region = match regions.as_slice() {
            [] => {
                return Err(DerivationError::MissingRegion {
                    seq_id: seq_id.to_string(),
                })
            }
            [one] => *one,
            many => {
                return Err(DerivationError::MultipleRegions {
                    seq_id: seq_id.to_string(),
                    count: many.len(),
                })
            }
        };
        if region.start != 1 {
            return Err(DerivationError::RegionNotAtOrigin {
                seq_id: seq_id.to_string(),
                start: region.start,
            });
        }

        let mut gene_of: IndexMap<&str, &FeatureRecord> = IndexMap::new();
        let mut genes = vec![];
        let mut transcripts: IndexMap<&str, &FeatureRecord> = IndexMap::new();

        for rec in records {
            if rec.start < 1 || rec.end < rec.start {
                return Err(DerivationError::InvalidInterval {
                    seq_id: seq_id.to_string(),
                    feature_type: rec.feature_type,
                    id: label(rec),
                    start: rec.start,
                    end: rec.end,
                });
            }
            if rec.end > region.end {
                return Err(DerivationError::OutsideRegion {
                    seq_id: seq_id.to_string(),
                    feature_type: rec.feature_type,
                    id: label(rec),
                    start: rec.start,
                    end: rec.end,
                    region_end: region.end,
                });
            }

            let map = match rec.feature_type {
                FeatureType::Gene => {
                    if let Some(parent) = &rec.parent_id {
                        return Err(DerivationError::UnexpectedParent {
                            seq_id: seq_id.to_string(),
                            feature_type: rec.feature_type,
                            id: label(rec),
                            parent: parent.clone(),
                        });
                    }
                    genes.push(rec);
                    &mut gene_of
                }
                FeatureType::MRna => &mut transcripts,
                _ => continue,
            };
            // genes and transcripts are only addressable through their ID
            match rec.id.as_deref() {
                Some(id) => {
                    if map.insert(id, rec).is_some() {
                        return Err(DerivationError::DuplicateId {
                            seq_id: seq_id.to_string(),
                            feature_type: rec.feature_type,
                            id: id.to_string(),
                        });
                    }
                }
                None if rec.feature_type == FeatureType::MRna => {
                    log::debug!(
                        "{}: mRNA at {} has no ID, no introns derived for it",
                        seq_id,
                        label(rec)
                    );
                }
                None => {}
            }
        }

        // parent links
        let mut children: IndexMap<&str, Vec<&FeatureRecord>> = IndexMap::new();
        for rec in records {
            let expected = match rec.feature_type {
                FeatureType::MRna => FeatureType::Gene,
                FeatureType::Exon | FeatureType::Cds => FeatureType::MRna,
                _ => continue,
            };
            let parent = match rec.parent_id.as_deref() {
                Some(p) => p,
                None => {
                    return Err(DerivationError::MissingParent {
                        seq_id: seq_id.to_string(),
                        feature_type: rec.feature_type,
                        id: label(rec),
                    })
                }
            };

            let found = if gene_of.contains_key(parent) {
                Some(FeatureType::Gene)
            } else if transcripts.contains_key(parent) {
                Some(FeatureType::MRna)
            } else {
                None
            };
            match found {
                None => {
                    return Err(DerivationError::UnknownParent {
                        seq_id: seq_id.to_string(),
                        feature_type: rec.feature_type,
                        id: label(rec),
                        parent: parent.to_string(),
                    })
                }
                Some(found) if found != expected => {
                    return Err(DerivationError::ParentTypeMismatch {
                        seq_id: seq_id.to_string(),
                        feature_type: rec.feature_type,
                        id: label(rec),
                        parent: parent.to_string(),
                        found,
                        expected,
                    })
                }
                _ => {}
            }

            if rec.feature_type == source {
                children.entry(parent).or_default().push(rec);
            }
        }

        Ok(Self {
            region,
            genes,
            transcripts,
            children,
        })
    }
}

/// Derives intergenic regions and introns for the records of one sequence.
///
/// An mRNA without an `ID` cannot own exons, so it yields no introns. A gene
/// without one still bounds intergenic regions.
///
/// Previously derived `intron`/`intergenic` records are discarded and
/// recomputed, so running this on its own output changes nothing. The
/// returned records are the originals plus the derived ones, in output
/// order.
///
/// ```
/// # use genefeat::libs::derive::{derive_sequence, DeriveOptions};
/// # use genefeat::libs::feature::{FeatureRecord, FeatureType, Strand};
/// let records = vec![
///     FeatureRecord::new("ctg1", FeatureType::Region, 1, 100),
///     FeatureRecord::new("ctg1", FeatureType::Gene, 11, 60).with_id("g1"),
///     FeatureRecord::new("ctg1", FeatureType::MRna, 11, 60).with_id("t1").with_parent("g1"),
///     FeatureRecord::new("ctg1", FeatureType::Exon, 11, 20).with_parent("t1"),
///     FeatureRecord::new("ctg1", FeatureType::Exon, 41, 60).with_parent("t1"),
/// ];
/// let out = derive_sequence("ctg1", records, &DeriveOptions::default()).unwrap();
/// let derived: Vec<String> = out
///     .iter()
///     .filter(|r| r.feature_type.is_derived())
///     .map(|r| format!("{} {}", r.feature_type, r.interval()))
///     .collect();
/// assert_eq!(derived, vec!["intergenic 1-10", "intron 21-40", "intergenic 61-100"]);
/// ```
pub fn derive_sequence(
    seq_id: &str,
    records: Vec<FeatureRecord>,
    opt: &DeriveOptions,
) -> Result<Vec<FeatureRecord>, DerivationError> {
    let mut records: Vec<FeatureRecord> = records
        .into_iter()
        .filter(|r| !r.feature_type.is_derived())
        .collect();

    let mut derived = vec![];
    {
        let hierarchy = Hierarchy::build(seq_id, &records, opt.intron_source.feature_type())?;

        if opt.intergenic {
            derived.extend(derive_intergenic(hierarchy.region, &hierarchy.genes));
        }
        if opt.introns {
            for (id, transcript) in &hierarchy.transcripts {
                let parts = hierarchy
                    .children
                    .get(id)
                    .map(|v| v.as_slice())
                    .unwrap_or(&[]);
                derived.extend(derive_introns(transcript, parts)?);
            }
        }
    }

    log::debug!(
        "{}: {} records, {} derived",
        seq_id,
        records.len(),
        derived.len()
    );

    records.extend(derived);
    sort_for_output(&mut records);
    Ok(records)
}

/// Groups records by sequence id, keeping first-seen order
pub fn group_by_sequence(records: Vec<FeatureRecord>) -> IndexMap<String, Vec<FeatureRecord>> {
    let mut groups: IndexMap<String, Vec<FeatureRecord>> = IndexMap::new();
    for rec in records {
        groups.entry(rec.seq_id.clone()).or_default().push(rec);
    }
    groups
}

/// Runs [`derive_sequence`] on every sequence.
///
/// Sequences are independent and processed on rayon's pool. Output is
/// ordered by sequence id. The violation reported is the one of the
/// first failing sequence in that order.
pub fn derive_all(
    records: Vec<FeatureRecord>,
    opt: &DeriveOptions,
) -> Result<Vec<FeatureRecord>, DerivationError> {
    let mut groups: Vec<(String, Vec<FeatureRecord>)> =
        group_by_sequence(records).into_iter().collect();
    groups.sort_by(|a, b| a.0.cmp(&b.0));

    let results: Vec<Result<Vec<FeatureRecord>, DerivationError>> = groups
        .into_par_iter()
        .map(|(seq_id, recs)| derive_sequence(&seq_id, recs, opt))
        .collect();

    let mut out = vec![];
    for res in results {
        out.extend(res?);
    }
    Ok(out)
}
