
use anyhow::Context;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::data_types::event::EventType;
use crate::parsing::confidence_tables::{
    COVERAGE_TABLE_FILENAME, EVENTTYPE_TABLE_FILENAME, VAF_TABLE_FILENAME
};
use crate::quality::{Quality, QualityAggregator, COVERAGE_BIN_WIDTH, MAX_SUPPORT, NUM_VAF_BINS};

/// Serializes the coverage histogram in the confidence-table schema: a
/// `max_support bin_width` header, then one `bin_index fraction` line per bin.
pub fn write_coverage_table<W: Write>(writer: &mut W, qualities: &[Quality]) -> std::io::Result<()> {
    writeln!(writer, "{MAX_SUPPORT} {COVERAGE_BIN_WIDTH}")?;
    for (bin_index, quality) in qualities.iter().enumerate() {
        writeln!(writer, "{bin_index} {}", quality.correctness_fraction())?;
    }
    Ok(())
}

/// Serializes the VAF histogram: a `num_bins` header, then one
/// `bin_index fraction` line per bin from 0 to `num_bins` inclusive.
pub fn write_vaf_table<W: Write>(writer: &mut W, qualities: &[Quality]) -> std::io::Result<()> {
    writeln!(writer, "{NUM_VAF_BINS}")?;
    for (bin_index, quality) in qualities.iter().enumerate() {
        writeln!(writer, "{bin_index} {}", quality.correctness_fraction())?;
    }
    Ok(())
}

/// Serializes the event-type histogram as `EventName: fraction` lines.
pub fn write_eventtype_table<W: Write>(writer: &mut W,
    qualities: &BTreeMap<EventType, Quality>) -> std::io::Result<()> {
    for (event_type, quality) in qualities.iter() {
        writeln!(writer, "{event_type}: {}", quality.correctness_fraction())?;
    }
    Ok(())
}

/// Persists all three histograms into `output_folder` under the filenames the
/// confidence-table loader expects, so this run's output feeds the next run.
/// # Arguments
/// * `aggregator` - the accumulated quality histograms
/// * `output_folder` - folder to write the three table files into
/// # Errors
/// * if any file fails to open or write
pub fn write_quality_tables(aggregator: &QualityAggregator, output_folder: &Path) -> anyhow::Result<()> {
    let coverage_fn = output_folder.join(COVERAGE_TABLE_FILENAME);
    let mut coverage_writer = BufWriter::new(File::create(&coverage_fn)
        .with_context(|| format!("Error while creating {coverage_fn:?}:"))?);
    write_coverage_table(&mut coverage_writer, aggregator.coverage_qualities())
        .with_context(|| format!("Error while writing {coverage_fn:?}:"))?;

    let vaf_fn = output_folder.join(VAF_TABLE_FILENAME);
    let mut vaf_writer = BufWriter::new(File::create(&vaf_fn)
        .with_context(|| format!("Error while creating {vaf_fn:?}:"))?);
    write_vaf_table(&mut vaf_writer, aggregator.vaf_qualities())
        .with_context(|| format!("Error while writing {vaf_fn:?}:"))?;

    let eventtype_fn = output_folder.join(EVENTTYPE_TABLE_FILENAME);
    let mut eventtype_writer = BufWriter::new(File::create(&eventtype_fn)
        .with_context(|| format!("Error while creating {eventtype_fn:?}:"))?);
    write_eventtype_table(&mut eventtype_writer, aggregator.eventtype_qualities())
        .with_context(|| format!("Error while writing {eventtype_fn:?}:"))?;

    Ok(())
}
