
use std::collections::BTreeMap;
use strum::IntoEnumIterator;

use crate::data_types::event::EventType;
use crate::data_types::support::{Support, SupportError, VAF_UNDEFINED};

/// Number of equal-width VAF bins spanning [0, 1); VAF = 1.0 lands in the extra top bin
pub const NUM_VAF_BINS: usize = 40;
/// Width of one coverage bin in read-depth units
pub const COVERAGE_BIN_WIDTH: i64 = 5;
/// Total support is clipped to this before coverage binning
pub const MAX_SUPPORT: i64 = 200;

/// A pair of correct/incorrect counters for one bucket of one quality dimension.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Quality {
    correct_calls: u64,
    incorrect_calls: u64
}

impl Quality {
    /// Tallies one occurrence into the correct or incorrect counter.
    pub fn add_occurrence(&mut self, success: bool) {
        if success {
            self.correct_calls += 1;
        } else {
            self.incorrect_calls += 1;
        }
    }

    /// Fraction of occurrences that were correct. An untouched bin reports 1.0;
    /// absence of evidence is not evidence of failure.
    pub fn correctness_fraction(&self) -> f64 {
        let total = self.correct_calls + self.incorrect_calls;
        if total == 0 {
            1.0
        } else {
            self.correct_calls as f64 / total as f64
        }
    }

    // getters
    pub fn correct_calls(&self) -> u64 {
        self.correct_calls
    }

    pub fn incorrect_calls(&self) -> u64 {
        self.incorrect_calls
    }
}

/// Accumulates call correctness across three independent dimensions: VAF bin,
/// coverage bin, and event type. At the end of a run the histograms are
/// persisted as the confidence tables a subsequent pass loads back in.
#[derive(Clone, Debug)]
pub struct QualityAggregator {
    /// Indexed by `floor(vaf * NUM_VAF_BINS)`; the extra top bin catches VAF = 1.0
    vaf_qualities: Vec<Quality>,
    /// Indexed by `clipped_total / COVERAGE_BIN_WIDTH`
    coverage_qualities: Vec<Quality>,
    /// One bin per event type, pre-populated so lookups never create entries
    eventtype_qualities: BTreeMap<EventType, Quality>
}

impl Default for QualityAggregator {
    fn default() -> Self {
        Self {
            vaf_qualities: vec![Quality::default(); NUM_VAF_BINS + 1],
            coverage_qualities: vec![Quality::default(); (MAX_SUPPORT / COVERAGE_BIN_WIDTH) as usize + 1],
            eventtype_qualities: EventType::iter()
                .map(|event_type| (event_type, Quality::default()))
                .collect()
        }
    }
}

impl QualityAggregator {
    /// Constructor
    pub fn new() -> Self {
        Self::default()
    }

    /// Tallies one sample's call outcome into every applicable histogram.
    /// Samples with an undefined VAF (no counts, or zero total) are excluded
    /// from the VAF histogram only.
    /// # Arguments
    /// * `event_type` - the record's event type
    /// * `support` - the sample's read support
    /// * `success` - true if the call was part of a Mendelian-consistent trio
    /// # Errors
    /// * if the VAF derivation fails despite a two-count support list; unreachable
    pub fn add_call(&mut self, event_type: EventType, support: &Support, success: bool) -> Result<(), SupportError> {
        if let Some(entry) = self.eventtype_qualities.get_mut(&event_type) {
            entry.add_occurrence(success);
        }

        let coverage_bin = coverage_bin_index(support.total_support());
        self.coverage_qualities[coverage_bin].add_occurrence(success);

        if support.allele_count() == 2 {
            let vaf = support.vaf()?;
            if vaf != VAF_UNDEFINED {
                let vaf_bin = vaf_bin_index(vaf);
                self.vaf_qualities[vaf_bin].add_occurrence(success);
            }
        }

        Ok(())
    }

    // getters for persistence
    pub fn vaf_qualities(&self) -> &[Quality] {
        &self.vaf_qualities
    }

    pub fn coverage_qualities(&self) -> &[Quality] {
        &self.coverage_qualities
    }

    pub fn eventtype_qualities(&self) -> &BTreeMap<EventType, Quality> {
        &self.eventtype_qualities
    }
}

/// Maps a total read support onto its coverage bin, clipping to [0, MAX_SUPPORT].
pub fn coverage_bin_index(total_support: i64) -> usize {
    let clipped_total = total_support.clamp(0, MAX_SUPPORT);
    (clipped_total / COVERAGE_BIN_WIDTH) as usize
}

/// Maps a defined VAF onto its bin; VAF = 1.0 maps to the inclusive top bin.
pub fn vaf_bin_index(vaf: f64) -> usize {
    let raw_index = (vaf * NUM_VAF_BINS as f64).floor() as i64;
    raw_index.clamp(0, NUM_VAF_BINS as i64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    #[test]
    fn test_quality_fraction() {
        let mut quality = Quality::default();
        assert_eq!(quality.correctness_fraction(), 1.0);

        quality.add_occurrence(true);
        quality.add_occurrence(false);
        assert_approx_eq!(quality.correctness_fraction(), 0.5);
        assert_eq!(quality.correct_calls(), 1);
        assert_eq!(quality.incorrect_calls(), 1);
    }

    #[test]
    fn test_coverage_binning() {
        assert_eq!(coverage_bin_index(0), 0);
        assert_eq!(coverage_bin_index(4), 0);
        assert_eq!(coverage_bin_index(5), 1);
        assert_eq!(coverage_bin_index(199), 39);
        // clipped to the maximum support
        assert_eq!(coverage_bin_index(200), 40);
        assert_eq!(coverage_bin_index(100_000), 40);
        assert_eq!(coverage_bin_index(-5), 0);
    }

    #[test]
    fn test_vaf_binning() {
        assert_eq!(vaf_bin_index(0.0), 0);
        assert_eq!(vaf_bin_index(0.024), 0);
        assert_eq!(vaf_bin_index(0.025), 1);
        assert_eq!(vaf_bin_index(0.5), 20);
        assert_eq!(vaf_bin_index(0.999), 39);
        // the inclusive top bin
        assert_eq!(vaf_bin_index(1.0), 40);
    }

    #[test]
    fn test_aggregator_shapes() {
        let aggregator = QualityAggregator::new();
        assert_eq!(aggregator.vaf_qualities().len(), NUM_VAF_BINS + 1);
        assert_eq!(aggregator.coverage_qualities().len(), 41);
        // every event type bin exists up front
        assert_eq!(aggregator.eventtype_qualities().len(), 5);
    }

    #[test]
    fn test_add_call() {
        let mut aggregator = QualityAggregator::new();
        let support = Support::parse("10,30").unwrap();
        aggregator.add_call(EventType::Snp, &support, true).unwrap();
        aggregator.add_call(EventType::Snp, &support, false).unwrap();

        let snp_quality = aggregator.eventtype_qualities()[&EventType::Snp];
        assert_approx_eq!(snp_quality.correctness_fraction(), 0.5);

        // total 40 => coverage bin 8; VAF 0.75 => bin 30
        assert_eq!(aggregator.coverage_qualities()[8].correct_calls(), 1);
        assert_eq!(aggregator.coverage_qualities()[8].incorrect_calls(), 1);
        assert_eq!(aggregator.vaf_qualities()[30].correct_calls(), 1);
    }

    #[test]
    fn test_add_call_undefined_vaf_skips_vaf_histogram() {
        let mut aggregator = QualityAggregator::new();
        aggregator.add_call(EventType::Deletion, &Support::none(), true).unwrap();

        assert!(aggregator.vaf_qualities().iter()
            .all(|q| q.correct_calls() == 0 && q.incorrect_calls() == 0));
        // but coverage (bin 0) and event type still tally
        assert_eq!(aggregator.coverage_qualities()[0].correct_calls(), 1);
        assert_eq!(aggregator.eventtype_qualities()[&EventType::Deletion].correct_calls(), 1);
    }
}
