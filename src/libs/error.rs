use crate::libs::feature::FeatureType;
use thiserror::Error;

/// Input-contract violations found while deriving features.
///
/// Each variant names the sequence and the offending record so the caller
/// can locate it. None of these are ever repaired.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DerivationError {
    #[error("{seq_id}: no region record")]
    MissingRegion { seq_id: String },

    #[error("{seq_id}: {count} region records, expected exactly one")]
    MultipleRegions { seq_id: String, count: usize },

    #[error("{seq_id}: region starts at {start}, expected 1")]
    RegionNotAtOrigin { seq_id: String, start: u32 },

    #[error("{seq_id}: {feature_type} {id} has invalid coordinates {start}-{end}")]
    InvalidInterval {
        seq_id: String,
        feature_type: FeatureType,
        id: String,
        start: u32,
        end: u32,
    },

    #[error("{seq_id}: {feature_type} {id} at {start}-{end} lies outside region 1-{region_end}")]
    OutsideRegion {
        seq_id: String,
        feature_type: FeatureType,
        id: String,
        start: u32,
        end: u32,
        region_end: u32,
    },

    #[error("{seq_id}: {feature_type} {id} has no parent")]
    MissingParent {
        seq_id: String,
        feature_type: FeatureType,
        id: String,
    },

    #[error("{seq_id}: {feature_type} {id} must not have a parent, found {parent}")]
    UnexpectedParent {
        seq_id: String,
        feature_type: FeatureType,
        id: String,
        parent: String,
    },

    #[error("{seq_id}: {feature_type} {id} references unknown parent {parent}")]
    UnknownParent {
        seq_id: String,
        feature_type: FeatureType,
        id: String,
        parent: String,
    },

    #[error("{seq_id}: {feature_type} {id} has parent {parent} of type {found}, expected {expected}")]
    ParentTypeMismatch {
        seq_id: String,
        feature_type: FeatureType,
        id: String,
        parent: String,
        found: FeatureType,
        expected: FeatureType,
    },

    #[error("{seq_id}: duplicate {feature_type} id {id}")]
    DuplicateId {
        seq_id: String,
        feature_type: FeatureType,
        id: String,
    },

    #[error("{seq_id}: transcript {transcript} has exons on both strands")]
    MixedStrand { seq_id: String, transcript: String },
}

impl DerivationError {
    /// Sequence the violation belongs to
    pub fn seq_id(&self) -> &str {
        match self {
            DerivationError::MissingRegion { seq_id }
            | DerivationError::MultipleRegions { seq_id, .. }
            | DerivationError::RegionNotAtOrigin { seq_id, .. }
            | DerivationError::InvalidInterval { seq_id, .. }
            | DerivationError::OutsideRegion { seq_id, .. }
            | DerivationError::MissingParent { seq_id, .. }
            | DerivationError::UnexpectedParent { seq_id, .. }
            | DerivationError::UnknownParent { seq_id, .. }
            | DerivationError::ParentTypeMismatch { seq_id, .. }
            | DerivationError::DuplicateId { seq_id, .. }
            | DerivationError::MixedStrand { seq_id, .. } => seq_id,
        }
    }
}
