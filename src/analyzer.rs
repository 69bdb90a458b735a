
use anyhow::{ensure, Context};
use derive_builder::Builder;
use serde::Serialize;
use std::io::{BufRead, Write};
use strum_macros::EnumString;

use crate::confidence::CallConfidenceEstimator;
use crate::data_types::event::Event;
use crate::data_types::genotyping::GenotypingResult;
use crate::mendelian::{classify_trio, ErrorPatternMap, TrioClassification};
use crate::parsing::record::{is_comment, parse_record_line};
use crate::quality::QualityAggregator;
use crate::writers::annotated::AnnotatedWriter;

/// Restricts the analysis to one class of variant record
#[derive(Clone, Copy, Default, Debug, Eq, PartialEq, strum_macros::Display, EnumString, Serialize, clap::ValueEnum)]
pub enum VariantFilter {
    /// Analyze every record
    #[default]
    #[strum(ascii_case_insensitive, serialize = "all")]
    #[clap(name = "all")]
    All,
    /// Only REF and ALT of length 1
    #[strum(ascii_case_insensitive, serialize = "snp")]
    #[clap(name = "snp")]
    Snp,
    /// Any structural variant: insertions, deletions, and replacements
    #[strum(ascii_case_insensitive, serialize = "sv")]
    #[clap(name = "sv")]
    Sv,
    /// Only deletions
    #[strum(ascii_case_insensitive, serialize = "del")]
    #[clap(name = "del")]
    Del,
    /// Only insertions
    #[strum(ascii_case_insensitive, serialize = "ins")]
    #[clap(name = "ins")]
    Ins,
    /// Only replacements
    #[strum(ascii_case_insensitive, serialize = "rpl")]
    #[clap(name = "rpl")]
    Rpl
}

/// Controls which records get analyzed and how sample calls are resolved
#[derive(Builder, Clone, Copy, Debug)]
#[builder(default)]
pub struct AnalysisConfig {
    /// restricts analysis to one variant class
    variant_filter: VariantFilter,
    /// minimum event size, in bases
    min_event_size: usize,
    /// maximum event size, in bases
    max_event_size: usize,
    /// if true, sample support payloads follow the pindel sentinel conventions
    pindel_mode: bool,
    /// calls with an estimated confidence below this are forced to unknown
    min_confidence: f64
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        // these settings are set to reasonable defaults for unit tests
        // main.rs will set each of them manually based on user input
        Self {
            variant_filter: VariantFilter::All,
            min_event_size: 0,
            max_event_size: usize::MAX,
            pindel_mode: false,
            min_confidence: 0.0
        }
    }
}

impl AnalysisConfig {
    /// Should this record be part of the analysis? Multi-allelic records are
    /// always excluded; the rest are filtered by variant class and event size.
    /// The size checked is `max(ref, alt)` minus the one-base anchor that every
    /// non-SNP record carries.
    pub fn should_analyze_variant(&self, event: &Event) -> bool {
        if !event.has_single_alt_allele() {
            // events with multiple alt alleles are hard to genotype; skip them from statistics
            return false;
        }
        let ref_size = event.ref_size();
        let alt_size = match event.alt_size() {
            Ok(alt_size) => alt_size,
            Err(_) => return false
        };

        let mut size_to_check = ref_size.max(alt_size);
        if size_to_check > 1 {
            // no SNP
            size_to_check -= 1;
        }

        self.is_type_match(ref_size, alt_size) &&
            (self.min_event_size..=self.max_event_size).contains(&size_to_check)
    }

    /// Is this (ref, alt) length combination of a type we were asked to analyze?
    fn is_type_match(&self, ref_size: usize, alt_size: usize) -> bool {
        if self.variant_filter == VariantFilter::All {
            return true;
        }
        if ref_size == 1 {
            if alt_size == 1 {
                self.variant_filter == VariantFilter::Snp
            } else {
                matches!(self.variant_filter, VariantFilter::Sv | VariantFilter::Ins)
            }
        } else if alt_size == 1 {
            matches!(self.variant_filter, VariantFilter::Sv | VariantFilter::Del)
        } else {
            matches!(self.variant_filter, VariantFilter::Sv | VariantFilter::Rpl)
        }
    }

    // getters
    pub fn is_pindel_mode(&self) -> bool {
        self.pindel_mode
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }
}

/// Running counters for one analysis pass
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AnalysisCounts {
    /// Events where at least one trio was scored correct or incorrect
    pub scored_events: u64,
    /// Events bucketed by how many of their trios were assessable, clamped at 3
    pub trio_genotyped_events: [u64; 4],
    /// Events where every trio was assessable
    pub fully_genotyped_events: u64,
    /// Trios that could not be assessed
    pub unassessable_trios: u64,
    /// Trios where all three members are homozygous reference
    pub homref_trios: u64,
    /// Trios consistent with Mendelian inheritance
    pub mendelian_correct: u64,
    /// Trios violating Mendelian inheritance
    pub mendelian_error: u64,
    /// Sample calls that were unknown, including confidence-suppressed ones
    pub unknown_calls: u64,
    /// Sample calls that were homozygous reference
    pub homref_calls: u64,
    /// Sample calls carrying at least one non-reference allele
    pub variant_calls: u64
}

impl AnalysisCounts {
    /// Fraction of scored trios that violated Mendelian inheritance, if any were scored.
    pub fn mendelian_error_rate(&self) -> Option<f64> {
        let denom = self.mendelian_error + self.mendelian_correct;
        if denom > 0 {
            Some(self.mendelian_error as f64 / denom as f64)
        } else {
            None
        }
    }

    /// Error rate with the all-homref trios included in the denominator.
    pub fn mendelian_error_rate_with_homref(&self) -> Option<f64> {
        let denom = self.mendelian_error + self.mendelian_correct + self.homref_trios;
        if denom > 0 {
            Some(self.mendelian_error as f64 / denom as f64)
        } else {
            None
        }
    }
}

/// The streaming analysis driver: decodes records one at a time, resolves each
/// sample call, groups samples into trios, classifies them, and accumulates the
/// quality histograms and counters for the whole run.
pub struct Analyzer {
    /// Immutable run configuration
    config: AnalysisConfig,
    /// Optional confidence estimator; absent on a first pass
    estimator: Option<CallConfidenceEstimator>,
    /// Binned quality accounting, persisted as the next pass's confidence tables
    aggregator: QualityAggregator,
    /// Recurring Mendelian violation patterns
    error_patterns: ErrorPatternMap,
    /// Running counters
    counts: AnalysisCounts
}

impl Analyzer {
    /// Constructor
    /// # Arguments
    /// * `config` - the immutable run configuration
    /// * `estimator` - confidence estimator from a previous pass's tables, if available
    pub fn new(config: AnalysisConfig, estimator: Option<CallConfidenceEstimator>) -> Self {
        Self {
            config,
            estimator,
            aggregator: QualityAggregator::new(),
            error_patterns: ErrorPatternMap::default(),
            counts: AnalysisCounts::default()
        }
    }

    /// Runs the full analysis over a record stream. Comment lines are copied to
    /// the annotated output; every other line is processed as one record.
    /// # Arguments
    /// * `reader` - the record stream
    /// * `annotated_writer` - sink for the annotated output copy
    /// # Errors
    /// * on any malformed record; the run stops at the first one
    pub fn analyze<R: BufRead, W: Write>(&mut self, reader: R,
        annotated_writer: &mut AnnotatedWriter<W>) -> anyhow::Result<()> {
        for (line_index, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Error while reading line {}:", line_index + 1))?;
            if is_comment(&line) {
                annotated_writer.write_passthrough(&line)
                    .context("Error while copying comment line:")?;
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }

            self.process_record(&line, annotated_writer)
                .with_context(|| format!("Error while processing line {}:", line_index + 1))?;
        }
        Ok(())
    }

    /// Processes one record line: filter, decode, resolve, classify, aggregate.
    fn process_record<W: Write>(&mut self, line: &str,
        annotated_writer: &mut AnnotatedWriter<W>) -> anyhow::Result<()> {
        let record = parse_record_line(line)?;
        let event = Event::new(record.reference, record.alternate);
        if !self.config.should_analyze_variant(&event) {
            // not part of the analysis, but the output copy keeps the record
            annotated_writer.write_passthrough(line)?;
            return Ok(());
        }
        let event_type = event.event_type();

        // decode and resolve each sample call
        let mut results: Vec<GenotypingResult> = Vec::with_capacity(record.samples.len());
        for (sample_index, sample_token) in record.samples.iter().enumerate() {
            let mut result = GenotypingResult::decode(sample_token, self.config.is_pindel_mode())
                .with_context(|| format!("Error while decoding sample column {}:", sample_index + 1))?;

            if !result.genotype().is_unknown() {
                if let Some(estimator) = self.estimator.as_ref() {
                    let confidence = estimator.confidence(event_type, result.support())?;
                    if confidence < self.config.min_confidence() {
                        result.suppress_call();
                    }
                }
            }

            if result.genotype().is_unknown() {
                self.counts.unknown_calls += 1;
            } else if result.genotype().is_hom_ref() {
                self.counts.homref_calls += 1;
            } else {
                self.counts.variant_calls += 1;
            }
            results.push(result);
        }

        ensure!(results.len() % 3 == 0,
            "event has {} sample columns; this does not seem to be trio data", results.len());

        // classify each consecutive (parent, parent, child) triple
        let num_trios = results.len() / 3;
        let mut genotyped_trios: usize = 0;
        let mut any_scored = false;
        for trio in results.chunks_exact(3) {
            let (first_parent, second_parent, child) =
                (trio[0].genotype(), trio[1].genotype(), trio[2].genotype());
            let classification = classify_trio(first_parent, second_parent, child)?;
            match classification {
                TrioClassification::Unassessable => {
                    self.counts.unassessable_trios += 1;
                },
                TrioClassification::HomRefTrio => {
                    self.counts.homref_trios += 1;
                },
                TrioClassification::MendelianCorrect => {
                    self.counts.mendelian_correct += 1;
                },
                TrioClassification::MendelianError => {
                    self.counts.mendelian_error += 1;
                    self.error_patterns.record(first_parent, second_parent, child);
                }
            }

            if classification.is_assessed() {
                genotyped_trios += 1;
            }
            if classification.is_scored() {
                any_scored = true;
                let success = classification == TrioClassification::MendelianCorrect;
                for sample in trio {
                    self.aggregator.add_call(event_type, sample.support(), success)?;
                }
            }
        }

        self.counts.trio_genotyped_events[genotyped_trios.min(3)] += 1;
        if num_trios > 0 && genotyped_trios == num_trios {
            self.counts.fully_genotyped_events += 1;
        }
        if any_scored {
            self.counts.scored_events += 1;
        }

        annotated_writer.write_record(&record.metadata, &results)?;
        Ok(())
    }

    // getters
    pub fn counts(&self) -> &AnalysisCounts {
        &self.counts
    }

    pub fn aggregator(&self) -> &QualityAggregator {
        &self.aggregator
    }

    pub fn error_patterns(&self) -> &ErrorPatternMap {
        &self.error_patterns
    }
}
