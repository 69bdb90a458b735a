
use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::data_types::genotyping::GenotypingResult;

/// Writes the annotated copy of the input: comment lines and filtered-out
/// records pass through unchanged, analyzed records are re-emitted with their
/// decoded (post-resolution) sample calls.
pub struct AnnotatedWriter<W: Write> {
    writer: W
}

impl<W: Write> AnnotatedWriter<W> {
    /// Constructor
    pub fn new(writer: W) -> Self {
        Self {
            writer
        }
    }

    /// Copies a line through unchanged.
    pub fn write_passthrough(&mut self, line: &str) -> std::io::Result<()> {
        writeln!(self.writer, "{line}")
    }

    /// Writes one analyzed record: the metadata columns followed by one decoded
    /// `genotype:support` column per sample. A suppressed call shows as ".".
    pub fn write_record(&mut self, metadata: &[&str], results: &[GenotypingResult]) -> std::io::Result<()> {
        write!(self.writer, "{}", metadata.join("\t"))?;
        for result in results {
            write!(self.writer, "\t{result}")?;
        }
        writeln!(self.writer)
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(mut self) -> std::io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Opens an annotated output file for writing, gzip-compressed when the
/// filename ends in ".gz".
/// # Arguments
/// * `filename` - the output path
/// # Errors
/// * if the file does not open properly
pub fn open_annotated_writer(filename: &Path) -> anyhow::Result<AnnotatedWriter<BufWriter<Box<dyn Write>>>> {
    let file: Box<dyn Write> = if filename.extension().unwrap_or_default() == "gz" {
        Box::new(
            flate2::write::GzEncoder::new(
                File::create(filename)
                    .with_context(|| format!("Error while creating {filename:?}:"))?,
                flate2::Compression::best()
            )
        )
    } else {
        Box::new(File::create(filename)
            .with_context(|| format!("Error while creating {filename:?}:"))?)
    };
    Ok(AnnotatedWriter::new(BufWriter::new(file)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotated_output() {
        let mut writer = AnnotatedWriter::new(Vec::new());
        writer.write_passthrough("#CHROM POS").unwrap();

        let metadata = ["chr1", "100", ".", "A", "C", "50", "PASS", ".", "GT"];
        let results = vec![
            GenotypingResult::decode("0/0:20,0", true).unwrap(),
            GenotypingResult::decode("0/1:15,25", true).unwrap(),
            GenotypingResult::decode("1/1:-1,0", true).unwrap()
        ];
        writer.write_record(&metadata, &results).unwrap();

        let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(output,
            "#CHROM POS\nchr1\t100\t.\tA\tC\t50\tPASS\t.\tGT\t0/0:20,0\t0/1:15,25\t.\n");
    }
}
