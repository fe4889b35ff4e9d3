use crate::libs::feature::FeatureRecord;
use crate::libs::interval::{complement, merge_overlapping, sort_by_start, Interval, Spanned};

/// Gaps between the genes of one sequence, flanked by the sequence ends.
///
/// Overlapping or abutting genes are merged first. A sequence without genes
/// yields nothing: intergenic regions only exist relative to genes present.
///
/// ```
/// # use genefeat::libs::feature::{FeatureRecord, FeatureType};
/// # use genefeat::libs::intergenic::derive_intergenic;
/// let region = FeatureRecord::new("ctg1", FeatureType::Region, 1, 500);
/// let g1 = FeatureRecord::new("ctg1", FeatureType::Gene, 250, 300).with_id("g1");
/// let g2 = FeatureRecord::new("ctg1", FeatureType::Gene, 100, 200).with_id("g2");
///
/// let gaps: Vec<String> = derive_intergenic(&region, &[&g1, &g2])
///     .iter()
///     .map(|r| r.interval().to_string())
///     .collect();
/// assert_eq!(gaps, vec!["1-99", "201-249", "301-500"]);
/// ```
pub fn derive_intergenic(region: &FeatureRecord, genes: &[&FeatureRecord]) -> Vec<FeatureRecord> {
    if genes.is_empty() {
        return vec![];
    }

    let mut spans: Vec<Interval> = genes.iter().map(|g| g.span()).collect();
    sort_by_start(&mut spans);
    let runs = merge_overlapping(&spans);

    complement(Interval::new(1, region.end), &runs)
        .into_iter()
        .map(|gap| FeatureRecord::intergenic(&region.seq_id, gap))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::feature::{FeatureType, Strand};

    fn region(end: u32) -> FeatureRecord {
        FeatureRecord::new("chr1", FeatureType::Region, 1, end)
    }

    fn gene(id: &str, start: u32, end: u32) -> FeatureRecord {
        FeatureRecord::new("chr1", FeatureType::Gene, start, end)
            .with_id(id)
            .with_strand(Some(Strand::Forward))
    }

    fn spans(records: &[FeatureRecord]) -> Vec<(u32, u32)> {
        records.iter().map(|r| (r.start, r.end)).collect()
    }

    #[test]
    fn test_no_genes() {
        assert!(derive_intergenic(&region(1000), &[]).is_empty());
    }

    #[test]
    fn test_gene_spans_whole_region() {
        let g = gene("g1", 1, 1000);
        assert!(derive_intergenic(&region(1000), &[&g]).is_empty());
    }

    #[test]
    fn test_overlapping_and_abutting_genes() {
        let g1 = gene("g1", 100, 200);
        let g2 = gene("g2", 150, 260);
        let g3 = gene("g3", 261, 300);
        let g4 = gene("g4", 400, 450);
        let out = derive_intergenic(&region(450), &[&g4, &g3, &g1, &g2]);
        assert_eq!(spans(&out), vec![(1, 99), (301, 399)]);
    }

    #[test]
    fn test_derived_fields() {
        let g = gene("g1", 10, 20);
        let out = derive_intergenic(&region(30), &[&g]);
        assert_eq!(out.len(), 2);
        for r in &out {
            assert_eq!(r.seq_id, "chr1");
            assert_eq!(r.feature_type, FeatureType::Intergenic);
            assert_eq!(r.strand, None);
            assert_eq!(r.id, None);
            assert_eq!(r.parent_id, None);
        }
    }

    #[test]
    fn test_one_base_gaps_are_kept() {
        let g1 = gene("g1", 2, 5);
        let g2 = gene("g2", 7, 9);
        let out = derive_intergenic(&region(10), &[&g1, &g2]);
        assert_eq!(spans(&out), vec![(1, 1), (6, 6), (10, 10)]);
    }

    #[test]
    fn test_genes_and_gaps_tile_the_region() {
        let genes = vec![
            gene("a", 40, 90),
            gene("b", 5, 12),
            gene("c", 85, 120),
            gene("d", 200, 230),
            gene("e", 13, 20),
        ];
        let refs: Vec<&FeatureRecord> = genes.iter().collect();
        let out = derive_intergenic(&region(300), &refs);

        let mut gene_set = intspan::IntSpan::new();
        for g in &genes {
            gene_set.add_pair(g.start as i32, g.end as i32);
        }
        let mut gap_set = intspan::IntSpan::new();
        let mut gap_total = 0;
        for r in &out {
            gap_set.add_pair(r.start as i32, r.end as i32);
            gap_total += r.interval().len() as i32;
        }

        // no overlap between genes and gaps, nor among gaps
        assert!(gene_set.intersect(&gap_set).is_empty());
        assert_eq!(gap_set.cardinality(), gap_total);
        // together they cover 1..=300
        assert_eq!(gene_set.union(&gap_set).spans(), vec![(1, 300)]);
    }
}
