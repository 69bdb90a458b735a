
use anyhow::bail;
use itertools::Itertools;
use rustc_hash::FxHashMap as HashMap;

use crate::data_types::genotype::Genotype;

/// Depth pattern for a son's Y-chromosome call: one parent unknown, one haploid
const DEPTH_PATTERN_Y_SON: u32 = 1;
/// Depth pattern for a son's X-chromosome call: one parent haploid, one diploid
const DEPTH_PATTERN_X_SON: u32 = 12;

/// Each trio gets exactly one classification
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TrioClassification {
    /// Missing genotypes prevent any Mendelian assessment
    Unassessable,
    /// All three members are homozygous reference; counted apart, scored as neither correct nor incorrect
    HomRefTrio,
    /// The child's alleles are consistent with inheritance from these parents
    MendelianCorrect,
    /// No assignment of parental alleles can explain the child
    MendelianError
}

impl TrioClassification {
    /// True for the classifications where a real assessment was made.
    pub fn is_assessed(&self) -> bool {
        !matches!(self, TrioClassification::Unassessable)
    }

    /// True for the classifications that get scored into the quality histograms.
    pub fn is_scored(&self) -> bool {
        matches!(self, TrioClassification::MendelianCorrect | TrioClassification::MendelianError)
    }
}

/// The combined allele-count pattern of a parent pair: `10*min + max`, with an
/// unknown parent contributing 0. A typical autosomal pair scores 22, a
/// father-mother pair at an X locus 12, and at a Y locus 1.
fn genotypic_depth_pattern(first_parent: &Genotype, second_parent: &Genotype) -> u32 {
    let first_depth = first_parent.num_alleles() as u32;
    let second_depth = second_parent.num_alleles() as u32;
    10 * first_depth.min(second_depth) + first_depth.max(second_depth)
}

/// Can Mendelian correctness be assessed for this trio? Usually all three
/// genotypes must be known, but a haploid child is assessable from a single
/// parent: for a son's Y chromosome the mother has no call at all, and for his
/// X chromosome one parent is haploid and the other diploid.
pub fn can_assess_mendelian_correctness(first_parent: &Genotype, second_parent: &Genotype,
    child: &Genotype) -> bool {
    if child.is_unknown() {
        return false;
    }
    if child.is_haploid() {
        let depth_pattern = genotypic_depth_pattern(first_parent, second_parent);
        return depth_pattern == DEPTH_PATTERN_Y_SON || depth_pattern == DEPTH_PATTERN_X_SON;
    }
    !first_parent.is_unknown() && !second_parent.is_unknown()
}

/// Can this combination of parents and child be correct, Mendelian-speaking?
/// A diploid child needs one allele from each parent (in either assignment);
/// a haploid child needs its allele in either parent.
/// # Errors
/// * if the child has an allele count outside {1, 2}; unreachable given the genotype model
pub fn can_be_mendelian_correct(first_parent: &Genotype, second_parent: &Genotype,
    child: &Genotype) -> anyhow::Result<bool> {
    let child_alleles = match child {
        Genotype::Known(alleles) => alleles,
        Genotype::Unknown => bail!("cannot assess a child with 0 alleles")
    };
    match child_alleles[..] {
        [allele0, allele1] => {
            Ok((first_parent.has_allele(allele0) && second_parent.has_allele(allele1)) ||
               (first_parent.has_allele(allele1) && second_parent.has_allele(allele0)))
        },
        [allele0] => {
            Ok(first_parent.has_allele(allele0) || second_parent.has_allele(allele0))
        },
        _ => {
            bail!("cannot assess a child with {} alleles", child_alleles.len());
        }
    }
}

/// Classifies one trio, in fixed (first parent, second parent, child) order.
/// # Errors
/// * if the compatibility check hits the defensive allele-count branch
pub fn classify_trio(first_parent: &Genotype, second_parent: &Genotype,
    child: &Genotype) -> anyhow::Result<TrioClassification> {
    if !can_assess_mendelian_correctness(first_parent, second_parent, child) {
        return Ok(TrioClassification::Unassessable);
    }

    if first_parent.is_hom_ref() && second_parent.is_hom_ref() && child.is_hom_ref() {
        return Ok(TrioClassification::HomRefTrio);
    }

    if can_be_mendelian_correct(first_parent, second_parent, child)? {
        Ok(TrioClassification::MendelianCorrect)
    } else {
        Ok(TrioClassification::MendelianError)
    }
}

/// Tracks which specific (parent, parent) => child genotype combinations recur
/// as Mendelian violations; recurring patterns point at systematic caller bias.
#[derive(Clone, Debug, Default)]
pub struct ErrorPatternMap {
    /// Lookup from a canonical pattern key to its occurrence count; grow-only
    pattern_counts: HashMap<String, u64>
}

impl ErrorPatternMap {
    /// Builds the canonical key for a violating trio: the parent genotype strings
    /// sorted lexicographically (so the parent column order does not matter),
    /// joined with ",", then " => " and the child genotype string.
    pub fn canonical_key(first_parent: &Genotype, second_parent: &Genotype,
        child: &Genotype) -> String {
        let first_text = first_parent.to_string();
        let second_text = second_parent.to_string();
        let parents_text = if first_text <= second_text {
            format!("{first_text},{second_text}")
        } else {
            format!("{second_text},{first_text}")
        };
        format!("{parents_text} => {child}")
    }

    /// Records one observed violation for this trio's pattern.
    pub fn record(&mut self, first_parent: &Genotype, second_parent: &Genotype,
        child: &Genotype) {
        let key = Self::canonical_key(first_parent, second_parent, child);
        *self.pattern_counts.entry(key).or_insert(0) += 1;
    }

    /// Total violations recorded across all patterns.
    pub fn total(&self) -> u64 {
        self.pattern_counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pattern_counts.is_empty()
    }

    /// Returns the (key, count) pairs in sorted key order for stable reporting.
    pub fn sorted_counts(&self) -> Vec<(&str, u64)> {
        self.pattern_counts.iter()
            .map(|(key, &count)| (key.as_str(), count))
            .sorted()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genotype(text: &str) -> Genotype {
        Genotype::parse(text).unwrap()
    }

    #[test]
    fn test_assessable_diploid() {
        // diploid child requires both parents known
        assert!(can_assess_mendelian_correctness(&genotype("0/0"), &genotype("0/1"), &genotype("0/1")));
        assert!(!can_assess_mendelian_correctness(&genotype("."), &genotype("0/1"), &genotype("0/1")));
        assert!(!can_assess_mendelian_correctness(&genotype("0/0"), &genotype("."), &genotype("0/1")));
        // unknown child is never assessable
        assert!(!can_assess_mendelian_correctness(&genotype("0/0"), &genotype("0/1"), &genotype(".")));
    }

    #[test]
    fn test_assessable_haploid_child() {
        // Y-chromosome son: one parent unknown, one haploid
        assert!(can_assess_mendelian_correctness(&genotype("."), &genotype("1"), &genotype("1")));
        assert!(can_assess_mendelian_correctness(&genotype("1"), &genotype("."), &genotype("1")));
        // X-chromosome son: one haploid, one diploid parent
        assert!(can_assess_mendelian_correctness(&genotype("0"), &genotype("1/2"), &genotype("1")));
        // two diploid parents with a haploid child is not a recognized pattern
        assert!(!can_assess_mendelian_correctness(&genotype("0/0"), &genotype("0/1"), &genotype("1")));
        // both parents unknown
        assert!(!can_assess_mendelian_correctness(&genotype("."), &genotype("."), &genotype("1")));
    }

    #[test]
    fn test_classify_correct() {
        let classification = classify_trio(&genotype("0/0"), &genotype("0/1"), &genotype("0/1")).unwrap();
        assert_eq!(classification, TrioClassification::MendelianCorrect);
        assert!(classification.is_assessed());
        assert!(classification.is_scored());

        // either assignment of child alleles to parents is acceptable
        assert_eq!(
            classify_trio(&genotype("1/1"), &genotype("0/0"), &genotype("0/1")).unwrap(),
            TrioClassification::MendelianCorrect
        );
    }

    #[test]
    fn test_classify_error() {
        // neither parent carries allele 1
        let classification = classify_trio(&genotype("0/0"), &genotype("0/0"), &genotype("0/1")).unwrap();
        assert_eq!(classification, TrioClassification::MendelianError);

        // both child alleles present, but only derivable from the same parent
        assert_eq!(
            classify_trio(&genotype("1/2"), &genotype("0/0"), &genotype("1/2")).unwrap(),
            TrioClassification::MendelianError
        );
    }

    #[test]
    fn test_classify_hom_ref_trio() {
        let classification = classify_trio(&genotype("0/0"), &genotype("0/0"), &genotype("0/0")).unwrap();
        assert_eq!(classification, TrioClassification::HomRefTrio);
        assert!(classification.is_assessed());
        assert!(!classification.is_scored());
    }

    #[test]
    fn test_classify_unassessable() {
        let classification = classify_trio(&genotype("."), &genotype("0/0"), &genotype("0/1")).unwrap();
        assert_eq!(classification, TrioClassification::Unassessable);
        assert!(!classification.is_assessed());
    }

    #[test]
    fn test_classify_haploid_child() {
        // Y-son pattern: the haploid parent carries the allele
        assert_eq!(
            classify_trio(&genotype("."), &genotype("1"), &genotype("1")).unwrap(),
            TrioClassification::MendelianCorrect
        );
        // X-son pattern: the diploid parent carries the allele
        assert_eq!(
            classify_trio(&genotype("0"), &genotype("1/2"), &genotype("1")).unwrap(),
            TrioClassification::MendelianCorrect
        );
        assert_eq!(
            classify_trio(&genotype("0"), &genotype("2/2"), &genotype("1")).unwrap(),
            TrioClassification::MendelianError
        );
        // an unknown parent beside a diploid parent is not a recognized pattern
        assert_eq!(
            classify_trio(&genotype("."), &genotype("1/2"), &genotype("1")).unwrap(),
            TrioClassification::Unassessable
        );
    }

    #[test]
    fn test_duplicate_alleles_collapse() {
        // "has allele" is set membership, duplicates change nothing
        assert_eq!(
            classify_trio(&genotype("1/1"), &genotype("1/1"), &genotype("1/1")).unwrap(),
            TrioClassification::MendelianCorrect
        );
    }

    #[test]
    fn test_error_pattern_key_is_column_order_independent() {
        let key_a = ErrorPatternMap::canonical_key(&genotype("0/1"), &genotype("0/0"), &genotype("1/1"));
        let key_b = ErrorPatternMap::canonical_key(&genotype("0/0"), &genotype("0/1"), &genotype("1/1"));
        assert_eq!(key_a, key_b);
        assert_eq!(key_a, "0/0,0/1 => 1/1");
    }

    #[test]
    fn test_error_pattern_counting() {
        let mut patterns = ErrorPatternMap::default();
        patterns.record(&genotype("0/1"), &genotype("0/0"), &genotype("1/1"));
        patterns.record(&genotype("0/0"), &genotype("0/1"), &genotype("1/1"));
        patterns.record(&genotype("0/0"), &genotype("0/0"), &genotype("0/1"));
        assert_eq!(patterns.total(), 3);
        assert_eq!(patterns.sorted_counts(), vec![
            ("0/0,0/0 => 0/1", 1),
            ("0/0,0/1 => 1/1", 2)
        ]);
    }
}
