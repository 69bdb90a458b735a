
use anyhow::{ensure, Context};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Number of fixed metadata columns before the sample columns begin
pub const NUM_METADATA_COLUMNS: usize = 9;
/// 0-based position of the reference allele column
const REFERENCE_COLUMN: usize = 3;
/// 0-based position of the alternate allele column
const ALTERNATE_COLUMN: usize = 4;

/// One split input record: the fixed metadata columns (of which only the
/// reference/alternate pair is meaningful to us) plus the raw sample tokens.
#[derive(Debug, Eq, PartialEq)]
pub struct VariantRecord<'a> {
    /// The 9 leading metadata columns, kept for the annotated output copy
    pub metadata: Vec<&'a str>,
    /// The reference allele column
    pub reference: &'a str,
    /// The alternate allele column, comma-separated if multi-allelic
    pub alternate: &'a str,
    /// The undecoded sample columns
    pub samples: Vec<&'a str>
}

/// True for comment lines, which are copied through and otherwise skipped.
pub fn is_comment(line: &str) -> bool {
    line.starts_with('#')
}

/// Splits one record line on whitespace into metadata and sample columns.
/// # Arguments
/// * `line` - the full record line, comment lines excluded
/// # Errors
/// * if the line has fewer than the 9 fixed metadata columns
pub fn parse_record_line(line: &str) -> anyhow::Result<VariantRecord<'_>> {
    let columns: Vec<&str> = line.split_whitespace().collect();
    ensure!(columns.len() >= NUM_METADATA_COLUMNS,
        "record has {} columns, expected at least {NUM_METADATA_COLUMNS}", columns.len());

    Ok(VariantRecord {
        metadata: columns[..NUM_METADATA_COLUMNS].to_vec(),
        reference: columns[REFERENCE_COLUMN],
        alternate: columns[ALTERNATE_COLUMN],
        samples: columns[NUM_METADATA_COLUMNS..].to_vec()
    })
}

/// Opens a record file for buffered line reading, transparently decoding gzip
/// when the filename ends in ".gz".
/// # Arguments
/// * `filename` - the record file to open
/// # Errors
/// * if the file does not open properly
pub fn open_record_reader(filename: &Path) -> anyhow::Result<Box<dyn BufRead>> {
    let file = File::open(filename)
        .with_context(|| format!("Error while opening {filename:?}:"))?;
    let reader: Box<dyn BufRead> = if filename.extension().unwrap_or_default() == "gz" {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record_line() {
        let line = "chr1 1000 sv1 A ACGT 50 PASS SVTYPE=INS GT 0/1:15,25 0/0:30,0 0/1:20,20";
        let record = parse_record_line(line).unwrap();
        assert_eq!(record.reference, "A");
        assert_eq!(record.alternate, "ACGT");
        assert_eq!(record.metadata.len(), NUM_METADATA_COLUMNS);
        assert_eq!(record.samples, vec!["0/1:15,25", "0/0:30,0", "0/1:20,20"]);
    }

    #[test]
    fn test_parse_record_line_no_samples() {
        let line = "chr1 1000 . A C 50 PASS . GT";
        let record = parse_record_line(line).unwrap();
        assert!(record.samples.is_empty());
    }

    #[test]
    fn test_parse_record_line_too_short() {
        assert!(parse_record_line("chr1 1000 . A C").is_err());
    }

    #[test]
    fn test_is_comment() {
        assert!(is_comment("#CHROM POS"));
        assert!(is_comment("##fileformat=VCFv4.2"));
        assert!(!is_comment("chr1 1000 . A C 50 PASS . GT"));
    }
}
