pub mod binning;
pub mod derive;
pub mod domain;
pub mod error;
pub mod feature;
pub mod gff;
pub mod intergenic;
pub mod interval;
pub mod intron;
pub mod ontology;
