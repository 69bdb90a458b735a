
/// The streaming analysis driver that ties decoding, classification, and aggregation together
pub mod analyzer;
/// Command line interface functionality
pub mod cli;
/// Estimates per-call confidence from the tables a previous pass produced
pub mod confidence;
/// Contains various shared data types
pub mod data_types;
/// The Mendelian trio decision core and error-pattern tracking
pub mod mendelian;
/// Tooling for parsing input files into meaningful structs / data
pub mod parsing;
/// Binned call-quality accounting that feeds the confidence tables
pub mod quality;
/// Various utility functions that tend to be very generic
pub mod util;
/// All output writers
pub mod writers;
