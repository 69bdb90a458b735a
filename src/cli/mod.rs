/*!
# CLI module
Command line interface functionality that is specific to Meerkat.
*/

/// The main CLI module that contains the top-level CLI parser and help text
pub mod core;
/// The trio CLI subcommand
pub mod trio;
