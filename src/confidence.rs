
use anyhow::ensure;
use std::collections::BTreeMap;
use strum::IntoEnumIterator;

use crate::data_types::event::EventType;
use crate::data_types::support::{Support, SupportError, VAF_UNDEFINED};

/// Historical correctness fractions binned by total read support.
#[derive(Clone, Debug, PartialEq)]
pub struct CoverageTable {
    /// Total support is clipped to this before binning
    max_support: i64,
    /// Width of one bin in read-depth units
    bin_width: i64,
    /// One fraction per bin, 0..=max_support/bin_width
    fractions: Vec<f64>
}

impl CoverageTable {
    /// Constructor
    /// # Errors
    /// * if the shape parameters and the fraction count disagree
    pub fn new(max_support: i64, bin_width: i64, fractions: Vec<f64>) -> anyhow::Result<Self> {
        ensure!(bin_width > 0, "coverage bin width must be positive, found {bin_width}");
        ensure!(max_support >= 0, "maximum support must be non-negative, found {max_support}");
        let expected_bins = (max_support / bin_width) as usize + 1;
        ensure!(fractions.len() == expected_bins,
            "coverage table has {} fractions, expected {expected_bins}", fractions.len());
        Ok(Self {
            max_support, bin_width, fractions
        })
    }

    /// Looks up the fraction for a total support, clipping out-of-range values
    /// to the table bounds.
    pub fn fraction(&self, total_support: i64) -> f64 {
        let clipped_total = total_support.clamp(0, self.max_support);
        let bin_index = ((clipped_total / self.bin_width) as usize).min(self.fractions.len() - 1);
        self.fractions[bin_index]
    }

    // getters
    pub fn max_support(&self) -> i64 {
        self.max_support
    }

    pub fn bin_width(&self) -> i64 {
        self.bin_width
    }

    pub fn fractions(&self) -> &[f64] {
        &self.fractions
    }
}

/// Historical correctness fractions binned by VAF.
#[derive(Clone, Debug, PartialEq)]
pub struct VafTable {
    /// Number of equal-width bins spanning [0, 1); the table carries one extra inclusive top bin
    num_bins: usize,
    /// One fraction per bin, 0..=num_bins
    fractions: Vec<f64>
}

impl VafTable {
    /// Constructor
    /// # Errors
    /// * if the fraction count is not `num_bins + 1`
    pub fn new(num_bins: usize, fractions: Vec<f64>) -> anyhow::Result<Self> {
        ensure!(num_bins > 0, "VAF table must have at least one bin");
        ensure!(fractions.len() == num_bins + 1,
            "VAF table has {} fractions, expected {}", fractions.len(), num_bins + 1);
        Ok(Self {
            num_bins, fractions
        })
    }

    /// Looks up the fraction for a VAF; an undefined (sentinel) VAF clips to bin 0.
    pub fn fraction(&self, vaf: f64) -> f64 {
        let raw_index = (vaf * self.num_bins as f64).floor() as i64;
        let bin_index = raw_index.clamp(0, self.num_bins as i64) as usize;
        self.fractions[bin_index]
    }

    // getters
    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    pub fn fractions(&self) -> &[f64] {
        &self.fractions
    }
}

/// Historical correctness fractions per event type, pre-populated for every
/// type so a lookup can never invent an entry.
#[derive(Clone, Debug, PartialEq)]
pub struct EventTypeTable {
    fractions: BTreeMap<EventType, f64>
}

impl EventTypeTable {
    /// Builds a table from the (event type, fraction) pairs that were loaded.
    /// Types with no loaded entry default to 1.0, mirroring the untouched-bin rule.
    pub fn new(loaded_fractions: BTreeMap<EventType, f64>) -> Self {
        let fractions = EventType::iter()
            .map(|event_type| {
                let fraction = loaded_fractions.get(&event_type).copied().unwrap_or(1.0);
                (event_type, fraction)
            })
            .collect();
        Self {
            fractions
        }
    }

    pub fn fraction(&self, event_type: EventType) -> f64 {
        self.fractions[&event_type]
    }
}

/// Estimates the confidence that a single genotyping call is correct, from
/// three independent historical-correctness tables. The estimate is the
/// minimum of the three lookups; a call is only as trustworthy as its weakest
/// signal.
#[derive(Clone, Debug)]
pub struct CallConfidenceEstimator {
    coverage_table: CoverageTable,
    vaf_table: VafTable,
    eventtype_table: EventTypeTable
}

impl CallConfidenceEstimator {
    /// Constructor
    pub fn new(coverage_table: CoverageTable, vaf_table: VafTable,
        eventtype_table: EventTypeTable) -> Self {
        Self {
            coverage_table, vaf_table, eventtype_table
        }
    }

    /// Confidence for one call: the minimum of the event-type, coverage, and
    /// VAF table lookups. Support without a two-count list has no defined VAF
    /// and is treated like the zero-total sentinel.
    /// # Errors
    /// * if the VAF derivation fails despite a two-count support list; unreachable
    pub fn confidence(&self, event_type: EventType, support: &Support) -> Result<f64, SupportError> {
        let mut min_confidence: f64 = 1.0;
        min_confidence = min_confidence.min(self.eventtype_table.fraction(event_type));
        min_confidence = min_confidence.min(self.coverage_table.fraction(support.total_support()));

        let vaf = if support.allele_count() == 2 {
            support.vaf()?
        } else {
            VAF_UNDEFINED
        };
        min_confidence = min_confidence.min(self.vaf_table.fraction(vaf));

        Ok(min_confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    fn test_estimator() -> CallConfidenceEstimator {
        // coverage: bins of width 5 up to 10 => [0-4] = 0.6, [5-9] = 0.7, [10] = 0.8
        let coverage_table = CoverageTable::new(10, 5, vec![0.6, 0.7, 0.8]).unwrap();
        // four VAF bins plus the inclusive top bin
        let vaf_table = VafTable::new(4, vec![0.5, 0.95, 0.9, 0.85, 0.99]).unwrap();
        let eventtype_table = EventTypeTable::new(
            [(EventType::Snp, 0.9), (EventType::Deletion, 0.2)].into_iter().collect()
        );
        CallConfidenceEstimator::new(coverage_table, vaf_table, eventtype_table)
    }

    #[test]
    fn test_minimum_of_three() {
        let estimator = test_estimator();
        // event 0.9, coverage (total 8 => bin 1) 0.7, VAF (0.75 => bin 3) 0.85
        let support = Support::parse("2,6").unwrap();
        assert_approx_eq!(estimator.confidence(EventType::Snp, &support).unwrap(), 0.7);
    }

    #[test]
    fn test_event_type_dominates() {
        let estimator = test_estimator();
        let support = Support::parse("2,6").unwrap();
        assert_approx_eq!(estimator.confidence(EventType::Deletion, &support).unwrap(), 0.2);
    }

    #[test]
    fn test_unloaded_event_type_defaults_high() {
        let estimator = test_estimator();
        let support = Support::parse("2,6").unwrap();
        // Insertion was not in the loaded table => 1.0; the other signals decide
        assert_approx_eq!(estimator.confidence(EventType::Insertion, &support).unwrap(), 0.7);
    }

    #[test]
    fn test_out_of_range_clipping() {
        let estimator = test_estimator();
        // huge coverage clips to the top bin; VAF 1.0 hits the inclusive top bin
        let support = Support::parse("0,500").unwrap();
        assert_approx_eq!(estimator.confidence(EventType::Snp, &support).unwrap(), 0.8);
    }

    #[test]
    fn test_undefined_vaf_clips_to_bin_zero() {
        let estimator = test_estimator();
        // no support data at all: coverage bin 0 (0.6), VAF sentinel clips to bin 0 (0.5)
        assert_approx_eq!(estimator.confidence(EventType::Snp, &Support::none()).unwrap(), 0.5);
    }

    #[test]
    fn test_table_shape_validation() {
        assert!(CoverageTable::new(10, 5, vec![0.5, 0.5]).is_err());
        assert!(CoverageTable::new(10, 0, vec![0.5]).is_err());
        assert!(VafTable::new(4, vec![0.5; 4]).is_err());
    }
}
