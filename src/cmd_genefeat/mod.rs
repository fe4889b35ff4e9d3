// Subcommand modules for the `genefeat` binary.
pub mod features;
pub mod function;
pub mod simplify;
