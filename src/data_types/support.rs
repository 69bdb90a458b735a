
use std::fmt;

/// Sentinel VAF for a sample whose total read support is zero
pub const VAF_UNDEFINED: f64 = -1.0;

#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum SupportError {
    #[error("read-depth count \"{token}\" is not an integer")]
    MalformedCount { token: String },
    #[error("VAF requires exactly two allele counts, found {count}")]
    VafAlleleCount { count: usize }
}

/// Per-allele read-depth counts for one sample at one event, in declaration order.
/// Counts are not necessarily aligned to the genotype's alleles once a call has
/// been discarded; a negative first count is a caller-side corruption sentinel.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Support {
    counts: Vec<i64>
}

impl Support {
    /// Parses a comma-separated count list, e.g. the "15,25" of "0/1:15,25".
    /// # Errors
    /// * if any comma-separated token is not an integer
    pub fn parse(support_text: &str) -> Result<Support, SupportError> {
        if support_text.is_empty() {
            return Ok(Support::none());
        }
        let counts = support_text.split(',')
            .map(|token| token.parse::<i64>()
                .map_err(|_| SupportError::MalformedCount { token: token.to_string() }))
            .collect::<Result<Vec<i64>, SupportError>>()?;
        Ok(Support { counts })
    }

    /// The no-op instance used when the input carries no support data.
    pub fn none() -> Support {
        Support::default()
    }

    pub fn is_none(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn allele_count(&self) -> usize {
        self.counts.len()
    }

    /// Total read support across all alleles.
    pub fn total_support(&self) -> i64 {
        self.counts.iter().sum()
    }

    /// Variant allele frequency: the fraction of reads supporting anything other
    /// than the first (reference) allele. Returns [`VAF_UNDEFINED`] when the
    /// total support is not positive.
    /// # Errors
    /// * if the count list does not have exactly two entries
    pub fn vaf(&self) -> Result<f64, SupportError> {
        if self.counts.len() != 2 {
            return Err(SupportError::VafAlleleCount { count: self.counts.len() });
        }
        let total_support = self.total_support();
        if total_support <= 0 {
            return Ok(VAF_UNDEFINED);
        }

        let alt_coverage = total_support - self.counts[0];
        Ok(alt_coverage as f64 / total_support as f64)
    }

    /// True when the support data contradicts the genotype call: no counts at
    /// all, a total of zero reads, or the caller's negative-refcount sentinel.
    pub fn indicates_unknown_genotype(&self) -> bool {
        if self.counts.is_empty() {
            true
        } else if self.total_support() == 0 {
            true
        } else {
            self.counts[0] < 0
        }
    }
}

impl fmt::Display for Support {
    /// Formats the counts as they appear in a file, comma-separated.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, count) in self.counts.iter().enumerate() {
            if index > 0 {
                write!(f, ",")?;
            }
            write!(f, "{count}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    #[test]
    fn test_parse_and_total() {
        let support = Support::parse("15,25").unwrap();
        assert_eq!(support.allele_count(), 2);
        assert_eq!(support.total_support(), 40);
        assert_eq!(support.to_string(), "15,25");
    }

    #[test]
    fn test_vaf() {
        let support = Support::parse("10,30").unwrap();
        assert_approx_eq!(support.vaf().unwrap(), 0.75);
    }

    #[test]
    fn test_vaf_zero_total_is_sentinel() {
        let support = Support::parse("0,0").unwrap();
        assert_eq!(support.vaf().unwrap(), VAF_UNDEFINED);
    }

    #[test]
    fn test_vaf_requires_two_counts() {
        let support = Support::parse("10,20,30").unwrap();
        assert_eq!(support.vaf(), Err(SupportError::VafAlleleCount { count: 3 }));
        assert_eq!(Support::none().vaf(), Err(SupportError::VafAlleleCount { count: 0 }));
    }

    #[test]
    fn test_indicates_unknown_genotype() {
        assert!(Support::none().indicates_unknown_genotype());
        assert!(Support::parse("0,0").unwrap().indicates_unknown_genotype());
        assert!(Support::parse("-1,20").unwrap().indicates_unknown_genotype());
        assert!(!Support::parse("15,25").unwrap().indicates_unknown_genotype());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(Support::parse("a,b"), Err(SupportError::MalformedCount { .. })));
        assert!(matches!(Support::parse("15,"), Err(SupportError::MalformedCount { .. })));
    }
}
