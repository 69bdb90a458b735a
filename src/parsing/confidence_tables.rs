
use anyhow::{bail, ensure, Context};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use crate::confidence::{CallConfidenceEstimator, CoverageTable, EventTypeTable, VafTable};
use crate::data_types::event::EventType;

/// Filename for the coverage-binned table, shared by reader and writer
pub const COVERAGE_TABLE_FILENAME: &str = "coverage_qualities.txt";
/// Filename for the VAF-binned table, shared by reader and writer
pub const VAF_TABLE_FILENAME: &str = "vaf_qualities.txt";
/// Filename for the event-type table, shared by reader and writer
pub const EVENTTYPE_TABLE_FILENAME: &str = "event_qualities.txt";

/// Loads the three confidence tables a previous pass wrote into `table_folder`
/// and assembles the estimator.
/// # Arguments
/// * `table_folder` - folder holding the three table files
/// # Errors
/// * if any file is missing, malformed, or names an unknown event type
pub fn load_confidence_tables(table_folder: &Path) -> anyhow::Result<CallConfidenceEstimator> {
    let coverage_fn = table_folder.join(COVERAGE_TABLE_FILENAME);
    let coverage_text = std::fs::read_to_string(&coverage_fn)
        .with_context(|| format!("Error while opening {coverage_fn:?}:"))?;
    let coverage_table = parse_coverage_table(&coverage_text)
        .with_context(|| format!("Error while parsing {coverage_fn:?}:"))?;

    let vaf_fn = table_folder.join(VAF_TABLE_FILENAME);
    let vaf_text = std::fs::read_to_string(&vaf_fn)
        .with_context(|| format!("Error while opening {vaf_fn:?}:"))?;
    let vaf_table = parse_vaf_table(&vaf_text)
        .with_context(|| format!("Error while parsing {vaf_fn:?}:"))?;

    let eventtype_fn = table_folder.join(EVENTTYPE_TABLE_FILENAME);
    let eventtype_text = std::fs::read_to_string(&eventtype_fn)
        .with_context(|| format!("Error while opening {eventtype_fn:?}:"))?;
    let eventtype_table = parse_eventtype_table(&eventtype_text)
        .with_context(|| format!("Error while parsing {eventtype_fn:?}:"))?;

    Ok(CallConfidenceEstimator::new(coverage_table, vaf_table, eventtype_table))
}

/// Parses the coverage table text: a `max_support bin_width` header line, then
/// one `bin_index fraction` line per bin from 0 to `max_support / bin_width`.
pub fn parse_coverage_table(table_text: &str) -> anyhow::Result<CoverageTable> {
    let mut tokens = table_text.split_whitespace();
    let max_support: i64 = next_value(&mut tokens, "max_support")?;
    let bin_width: i64 = next_value(&mut tokens, "bin_width")?;
    ensure!(bin_width > 0, "bin width must be positive, found {bin_width}");

    let num_bins = (max_support / bin_width) as usize + 1;
    let fractions = parse_indexed_fractions(&mut tokens, num_bins)?;
    CoverageTable::new(max_support, bin_width, fractions)
}

/// Parses the VAF table text: a `num_bins` header line, then one
/// `bin_index fraction` line per bin from 0 to `num_bins` inclusive.
pub fn parse_vaf_table(table_text: &str) -> anyhow::Result<VafTable> {
    let mut tokens = table_text.split_whitespace();
    let num_bins: usize = next_value(&mut tokens, "num_bins")?;

    let fractions = parse_indexed_fractions(&mut tokens, num_bins + 1)?;
    VafTable::new(num_bins, fractions)
}

/// Parses the event-type table text: `EventName: fraction` lines, names matched
/// case-insensitively. An unrecognized event name is fatal.
pub fn parse_eventtype_table(table_text: &str) -> anyhow::Result<EventTypeTable> {
    let mut loaded_fractions: BTreeMap<EventType, f64> = Default::default();
    let mut tokens = table_text.split_whitespace();
    while let Some(name_token) = tokens.next() {
        let event_name = name_token.trim_end_matches(':');
        let event_type = match EventType::from_str(event_name) {
            Ok(event_type) => event_type,
            Err(_) => bail!("unrecognized event type name: \"{event_name}\"")
        };
        let fraction: f64 = next_value(&mut tokens, "fraction")?;
        if loaded_fractions.insert(event_type, fraction).is_some() {
            bail!("duplicate event type entry: \"{event_name}\"");
        }
    }
    Ok(EventTypeTable::new(loaded_fractions))
}

/// Pulls one parseable token off the stream, with a labeled error otherwise.
fn next_value<T: FromStr>(tokens: &mut dyn Iterator<Item = &str>, label: &str) -> anyhow::Result<T> {
    let token = match tokens.next() {
        Some(token) => token,
        None => bail!("table ended while expecting {label}")
    };
    match token.parse::<T>() {
        Ok(value) => Ok(value),
        Err(_) => bail!("could not parse {label} from \"{token}\"")
    }
}

/// Reads `num_bins` pairs of `bin_index fraction`, requiring the indices to run
/// 0, 1, 2, ... in order so a truncated or shuffled table is caught.
fn parse_indexed_fractions(tokens: &mut dyn Iterator<Item = &str>, num_bins: usize) -> anyhow::Result<Vec<f64>> {
    let mut fractions = Vec::with_capacity(num_bins);
    for expected_index in 0..num_bins {
        let bin_index: usize = next_value(tokens, "bin_index")?;
        ensure!(bin_index == expected_index,
            "bin index {bin_index} out of order, expected {expected_index}");
        fractions.push(next_value(tokens, "fraction")?);
    }
    Ok(fractions)
}
