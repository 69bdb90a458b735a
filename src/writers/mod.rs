/*!
# Writers module
Contains the logic for writing the output files for the trio analysis.
*/
/// Generates the annotated copy of the input records
pub mod annotated;
/// Persists the quality histograms as next-pass confidence tables
pub mod quality_tables;
/// Generates the run summary and error-pattern files
pub mod summary;
