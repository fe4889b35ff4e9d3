pub mod libs;

pub use libs::binning::{AnchorTable, GeneFunctionRecord, UNKNOWN_BIN_ID};
pub use libs::derive::{derive_all, derive_sequence, DeriveOptions, IntronSource};
pub use libs::error::DerivationError;
pub use libs::feature::{FeatureRecord, FeatureType, Strand};
pub use libs::interval::Interval;
pub use libs::ontology::OntologyGraph;
