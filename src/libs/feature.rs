use crate::libs::interval::Interval;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Column header of the feature table written by `genefeat features`
pub const TSV_HEADER: &str = "record\tfeature\tstart\tend\tstrand\tid\tparent";

//----------------------------
// FeatureType
//----------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureType {
    Region,
    Gene,
    MRna,
    Exon,
    Cds,
    Intron,
    Intergenic,
}

impl FeatureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureType::Region => "region",
            FeatureType::Gene => "gene",
            FeatureType::MRna => "mRNA",
            FeatureType::Exon => "exon",
            FeatureType::Cds => "CDS",
            FeatureType::Intron => "intron",
            FeatureType::Intergenic => "intergenic",
        }
    }

    /// Rank used to order records sharing a sequence and a start.
    ///
    /// ```
    /// # use genefeat::libs::feature::FeatureType;
    /// assert!(FeatureType::Gene.precedence() < FeatureType::MRna.precedence());
    /// assert_eq!(FeatureType::Exon.precedence(), FeatureType::Cds.precedence());
    /// assert!(FeatureType::Intron.precedence() < FeatureType::Intergenic.precedence());
    /// ```
    pub fn precedence(&self) -> u8 {
        match self {
            FeatureType::Region => 0,
            FeatureType::Gene => 1,
            FeatureType::MRna => 2,
            FeatureType::Exon | FeatureType::Cds => 3,
            FeatureType::Intron => 4,
            FeatureType::Intergenic => 5,
        }
    }

    /// Types produced by derivation, never used as derivation input
    pub fn is_derived(&self) -> bool {
        matches!(self, FeatureType::Intron | FeatureType::Intergenic)
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FeatureType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "region" => Ok(FeatureType::Region),
            "gene" => Ok(FeatureType::Gene),
            "mRNA" => Ok(FeatureType::MRna),
            "exon" => Ok(FeatureType::Exon),
            "CDS" => Ok(FeatureType::Cds),
            "intron" => Ok(FeatureType::Intron),
            "intergenic" => Ok(FeatureType::Intergenic),
            _ => Err(anyhow::anyhow!("Unsupported feature type: {}", s)),
        }
    }
}

//----------------------------
// Strand
//----------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    /// `+` and `-` are stranded; `.`, `?` and anything else are not
    ///
    /// ```
    /// # use genefeat::libs::feature::Strand;
    /// assert_eq!(Strand::from_symbol("+"), Some(Strand::Forward));
    /// assert_eq!(Strand::from_symbol("-"), Some(Strand::Reverse));
    /// assert_eq!(Strand::from_symbol("."), None);
    /// ```
    pub fn from_symbol(s: &str) -> Option<Strand> {
        match s {
            "+" => Some(Strand::Forward),
            "-" => Some(Strand::Reverse),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

//----------------------------
// FeatureRecord
//----------------------------
/// One annotated interval on a sequence, 1-based and inclusive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRecord {
    pub seq_id: String,
    pub feature_type: FeatureType,
    pub id: Option<String>,
    pub start: u32,
    pub end: u32,
    pub strand: Option<Strand>,
    pub parent_id: Option<String>,
}

impl FeatureRecord {
    /// ```
    /// # use genefeat::libs::feature::{FeatureRecord, FeatureType, Strand};
    /// let mrna = FeatureRecord::new("chr1", FeatureType::MRna, 100, 200)
    ///     .with_id("rna-1")
    ///     .with_parent("gene-1")
    ///     .with_strand(Some(Strand::Reverse));
    /// # assert_eq!(mrna.id.as_deref(), Some("rna-1"));
    /// # assert_eq!(mrna.parent_id.as_deref(), Some("gene-1"));
    /// assert_eq!(mrna.to_string(), "chr1\tmRNA\t100\t200\t-\trna-1\tgene-1");
    /// ```
    pub fn new(seq_id: &str, feature_type: FeatureType, start: u32, end: u32) -> Self {
        Self {
            seq_id: seq_id.to_string(),
            feature_type,
            id: None,
            start,
            end,
            strand: None,
            parent_id: None,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_parent(mut self, parent_id: &str) -> Self {
        self.parent_id = Some(parent_id.to_string());
        self
    }

    pub fn with_strand(mut self, strand: Option<Strand>) -> Self {
        self.strand = strand;
        self
    }

    /// An unstranded, parentless gap between genes
    pub fn intergenic(seq_id: &str, gap: Interval) -> Self {
        Self::new(seq_id, FeatureType::Intergenic, gap.start, gap.end)
    }

    /// A gap between two exons of `transcript_id`
    pub fn intron(seq_id: &str, gap: Interval, strand: Option<Strand>, transcript_id: &str) -> Self {
        Self::new(seq_id, FeatureType::Intron, gap.start, gap.end)
            .with_strand(strand)
            .with_parent(transcript_id)
    }

    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }

    /// Sequence id, then start, then type precedence
    pub fn output_cmp(&self, other: &Self) -> Ordering {
        self.seq_id
            .cmp(&other.seq_id)
            .then(self.start.cmp(&other.start))
            .then(
                self.feature_type
                    .precedence()
                    .cmp(&other.feature_type.precedence()),
            )
    }
}

impl fmt::Display for FeatureRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.seq_id,
            self.feature_type,
            self.start,
            self.end,
            self.strand.map_or(".".to_string(), |s| s.to_string()),
            self.id.as_deref().unwrap_or("."),
            self.parent_id.as_deref().unwrap_or("."),
        )
    }
}

/// Stable ordering for output; ties keep their input order
pub fn sort_for_output(records: &mut [FeatureRecord]) {
    records.sort_by(|a, b| a.output_cmp(b));
}
