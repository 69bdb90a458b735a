/*!
# Parsing module
Contains the logic for parsing input files into meaningful structs / data.
*/
/// Reader for the persisted confidence tables a previous pass produced
pub mod confidence_tables;
/// Splits raw record lines into metadata and sample columns
pub mod record;
