use crate::libs::error::DerivationError;
use crate::libs::feature::{FeatureRecord, Strand};
use crate::libs::interval::{complement, merge_overlapping, sort_by_start, Interval, Spanned};

/// Strand shared by every part of a transcript.
///
/// Returns `Ok(None)` for an empty list or when all parts are unstranded.
pub fn shared_strand(
    seq_id: &str,
    transcript_id: &str,
    parts: &[&FeatureRecord],
) -> Result<Option<Strand>, DerivationError> {
    let mut iter = parts.iter();
    let first = match iter.next() {
        Some(p) => p.strand,
        None => return Ok(None),
    };
    if iter.any(|p| p.strand != first) {
        return Err(DerivationError::MixedStrand {
            seq_id: seq_id.to_string(),
            transcript: transcript_id.to_string(),
        });
    }
    Ok(first)
}

/// Introns of one transcript, from its exons (or CDS segments).
///
/// Parts are sorted by start and merged with the same continuity rule as
/// intergenic gaps, so touching or overlapping parts leave no intron.
/// Fewer than two parts yield nothing. Introns take the transcript's
/// strand, or the parts' strand when the transcript has none.
///
/// ```
/// # use genefeat::libs::feature::{FeatureRecord, FeatureType, Strand};
/// # use genefeat::libs::intron::derive_introns;
/// let rna = FeatureRecord::new("ctg1", FeatureType::MRna, 10, 30)
///     .with_id("rna-1")
///     .with_strand(Some(Strand::Reverse));
/// let e1 = FeatureRecord::new("ctg1", FeatureType::Exon, 25, 30).with_parent("rna-1");
/// let e2 = FeatureRecord::new("ctg1", FeatureType::Exon, 10, 20).with_parent("rna-1");
///
/// let introns = derive_introns(&rna, &[&e1, &e2]).unwrap();
/// assert_eq!(introns.len(), 1);
/// assert_eq!(introns[0].to_string(), "ctg1\tintron\t21\t24\t-\t.\trna-1");
/// ```
pub fn derive_introns(
    transcript: &FeatureRecord,
    parts: &[&FeatureRecord],
) -> Result<Vec<FeatureRecord>, DerivationError> {
    let transcript_id = transcript.id.as_deref().unwrap_or(".");
    let part_strand = shared_strand(&transcript.seq_id, transcript_id, parts)?;

    if parts.len() < 2 {
        return Ok(vec![]);
    }

    let mut spans: Vec<Interval> = parts.iter().map(|p| p.span()).collect();
    sort_by_start(&mut spans);
    let runs = merge_overlapping(&spans);

    // runs are sorted, so the outer bounds are the first start and last end
    let outer = match (runs.first(), runs.last()) {
        (Some(first), Some(last)) => Interval::new(first.start, last.end),
        _ => return Ok(vec![]),
    };

    let strand = transcript.strand.or(part_strand);
    Ok(complement(outer, &runs)
        .into_iter()
        .map(|gap| FeatureRecord::intron(&transcript.seq_id, gap, strand, transcript_id))
        .collect())
}
