
use serde::Serialize;
use std::fs::File;
use std::path::Path;

use crate::analyzer::AnalysisCounts;
use crate::mendelian::ErrorPatternMap;

/// This is a wrapper for writing out the run summary and error-pattern files
pub struct SummaryWriter {
    /// Analysis label to go on each row
    analysis_label: String
}

/// Contains all the data written to each row of our summary file
#[derive(Serialize)]
struct SummaryRow {
    /// User provided label
    analysis_label: String,
    /// Name of the counter or rate
    metric: String,
    /// Counter value, absent for rate rows
    count: Option<u64>,
    /// Rate value in percent, absent for counter rows
    percent: Option<f64>
}

impl SummaryRow {
    /// Creates a counter row
    fn new_count(analysis_label: &str, metric: &str, count: u64) -> Self {
        Self {
            analysis_label: analysis_label.to_string(),
            metric: metric.to_string(),
            count: Some(count),
            percent: None
        }
    }

    /// Creates a rate row; the rate arrives as a fraction and is stored in percent
    fn new_rate(analysis_label: &str, metric: &str, rate: Option<f64>) -> Self {
        Self {
            analysis_label: analysis_label.to_string(),
            metric: metric.to_string(),
            count: None,
            percent: rate.map(|r| 100.0 * r)
        }
    }
}

/// Contains all the data written to each row of our error-pattern file
#[derive(Serialize)]
struct ErrorPatternRow {
    /// User provided label
    analysis_label: String,
    /// The two parent genotypes in canonical (sorted) order
    parent_genotypes: String,
    /// The child genotype
    child_genotype: String,
    /// Number of violations with this pattern
    count: u64,
    /// Share of all violations, in percent
    percent_of_errors: f64
}

impl SummaryWriter {
    /// Creates a new writer for the given label
    pub fn new(analysis_label: String) -> Self {
        Self {
            analysis_label
        }
    }

    /// Will write the run counters and derived rates to the given file path
    /// # Arguments
    /// * `filename` - the filename for the output (tsv/csv)
    /// * `counts` - the accumulated run counters
    pub fn write_summary(&self, filename: &Path, counts: &AnalysisCounts) -> csv::Result<()> {
        let mut csv_writer = new_delimited_writer(filename)?;
        let label = self.analysis_label.as_str();

        csv_writer.serialize(SummaryRow::new_count(label, "scored_events", counts.scored_events))?;
        for (num_trios, &event_count) in counts.trio_genotyped_events.iter().enumerate() {
            let metric = format!("events_with_{num_trios}_genotyped_trios");
            csv_writer.serialize(SummaryRow::new_count(label, &metric, event_count))?;
        }
        csv_writer.serialize(SummaryRow::new_count(label, "fully_genotyped_events", counts.fully_genotyped_events))?;
        csv_writer.serialize(SummaryRow::new_count(label, "unassessable_trios", counts.unassessable_trios))?;
        csv_writer.serialize(SummaryRow::new_count(label, "homref_trios", counts.homref_trios))?;
        csv_writer.serialize(SummaryRow::new_count(label, "mendelian_correct", counts.mendelian_correct))?;
        csv_writer.serialize(SummaryRow::new_count(label, "mendelian_error", counts.mendelian_error))?;
        csv_writer.serialize(SummaryRow::new_count(label, "unknown_calls", counts.unknown_calls))?;
        csv_writer.serialize(SummaryRow::new_count(label, "homref_calls", counts.homref_calls))?;
        csv_writer.serialize(SummaryRow::new_count(label, "variant_calls", counts.variant_calls))?;
        csv_writer.serialize(SummaryRow::new_rate(label, "mendelian_error_rate",
            counts.mendelian_error_rate()))?;
        csv_writer.serialize(SummaryRow::new_rate(label, "mendelian_error_rate_with_homref",
            counts.mendelian_error_rate_with_homref()))?;

        csv_writer.flush()?;
        Ok(())
    }

    /// Will write the recurring violation patterns to the given file path
    /// # Arguments
    /// * `filename` - the filename for the output (tsv/csv)
    /// * `error_patterns` - the accumulated violation patterns
    pub fn write_error_patterns(&self, filename: &Path, error_patterns: &ErrorPatternMap) -> csv::Result<()> {
        let mut csv_writer = new_delimited_writer(filename)?;
        let error_total = error_patterns.total();

        for (pattern_key, count) in error_patterns.sorted_counts() {
            // canonical keys have the form "parent,parent => child"
            let (parent_genotypes, child_genotype) = pattern_key.split_once(" => ")
                .unwrap_or((pattern_key, ""));
            let row = ErrorPatternRow {
                analysis_label: self.analysis_label.clone(),
                parent_genotypes: parent_genotypes.to_string(),
                child_genotype: child_genotype.to_string(),
                count,
                percent_of_errors: 100.0 * count as f64 / error_total as f64
            };
            csv_writer.serialize(&row)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

/// Opens a delimited writer, switching to "," when the filename ends with .csv
fn new_delimited_writer(filename: &Path) -> csv::Result<csv::Writer<File>> {
    let is_csv: bool = filename.extension().unwrap_or_default() == "csv";
    let delimiter: u8 = if is_csv { b',' } else { b'\t' };
    csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::data_types::genotype::Genotype;

    #[test]
    fn test_write_summary() {
        let counts = AnalysisCounts {
            scored_events: 2,
            mendelian_correct: 3,
            mendelian_error: 1,
            ..Default::default()
        };

        let temp_dir = std::env::temp_dir().join("meerkat_summary_test");
        std::fs::create_dir_all(&temp_dir).unwrap();
        let summary_fn = temp_dir.join("summary.tsv");

        let writer = SummaryWriter::new("test".to_string());
        writer.write_summary(&summary_fn, &counts).unwrap();

        let contents = std::fs::read_to_string(&summary_fn).unwrap();
        assert!(contents.contains("test\tscored_events\t2\t"));
        assert!(contents.contains("test\tmendelian_error_rate\t\t25"));
    }

    #[test]
    fn test_write_error_patterns() {
        let mut error_patterns = ErrorPatternMap::default();
        let homref = Genotype::parse("0/0").unwrap();
        let het = Genotype::parse("0/1").unwrap();
        error_patterns.record(&homref, &homref, &het);
        error_patterns.record(&homref, &homref, &het);
        error_patterns.record(&het, &homref, &Genotype::parse("1/1").unwrap());
        error_patterns.record(&homref, &het, &Genotype::parse("1/1").unwrap());

        let temp_dir = std::env::temp_dir().join("meerkat_pattern_test");
        std::fs::create_dir_all(&temp_dir).unwrap();
        let patterns_fn = temp_dir.join("error_patterns.tsv");

        let writer = SummaryWriter::new("test".to_string());
        writer.write_error_patterns(&patterns_fn, &error_patterns).unwrap();

        let contents = std::fs::read_to_string(&patterns_fn).unwrap();
        // both column orders of the het/homref parents collapse into one row
        assert!(contents.contains("test\t0/0,0/1\t1/1\t2\t50"));
        assert!(contents.contains("test\t0/0,0/0\t0/1\t2\t50"));
    }
}
