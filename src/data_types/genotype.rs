
use std::fmt;

#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum GenotypeError {
    #[error("allele \"{token}\" is not a non-negative integer")]
    MalformedAllele { token: String },
    #[error("genotype has {count} alleles, only 1 or 2 are supported")]
    UnsupportedPloidy { count: usize },
    #[error("operation requires a known genotype")]
    UnknownGenotype
}

/// A genotype call for one sample: either unknown ("." in a file) or an ordered
/// list of allele indices. Usually 2 alleles, can be 1 (e.g. Y-chromosome calls in a son).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Genotype {
    /// No usable call was made for this sample
    Unknown,
    /// A called genotype; invariant: 1 or 2 allele indices
    Known(Vec<u32>)
}

impl Genotype {
    /// Parses a genotype from its text form, e.g. "0", "0/1", or ".".
    /// A "." in any allele position marks the whole genotype as unknown.
    /// # Arguments
    /// * `genotype_token` - the genotype text, with alleles separated by "/"
    /// # Errors
    /// * if an allele is not "." and does not parse as a non-negative integer
    /// * if the number of alleles is not 1 or 2
    pub fn parse(genotype_token: &str) -> Result<Genotype, GenotypeError> {
        let mut alleles: Vec<u32> = Vec::with_capacity(2);
        for allele_token in genotype_token.split('/') {
            if allele_token == "." {
                return Ok(Genotype::Unknown);
            }
            alleles.push(parse_allele_index(allele_token)?);
        }

        if alleles.is_empty() || alleles.len() > 2 {
            return Err(GenotypeError::UnsupportedPloidy { count: alleles.len() });
        }
        Ok(Genotype::Known(alleles))
    }

    /// Returns the number of alleles; an unknown genotype has none.
    pub fn num_alleles(&self) -> usize {
        match self {
            Genotype::Unknown => 0,
            Genotype::Known(alleles) => alleles.len()
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Genotype::Unknown)
    }

    /// True if this is certainly a haploid call; unknown does not count.
    pub fn is_haploid(&self) -> bool {
        self.num_alleles() == 1
    }

    /// True if the genotype is known and every allele is the reference allele (0).
    pub fn is_hom_ref(&self) -> bool {
        match self {
            Genotype::Unknown => false,
            Genotype::Known(alleles) => alleles.iter().all(|&a| a == 0)
        }
    }

    /// True if the allele is literally present in this genotype's allele list.
    /// An unknown genotype carries no alleles.
    pub fn has_allele(&self, allele: u32) -> bool {
        match self {
            Genotype::Unknown => false,
            Genotype::Known(alleles) => alleles.contains(&allele)
        }
    }

    /// Returns the allele at the given position within the call.
    /// # Errors
    /// * if the genotype is unknown or the position is out of bounds
    pub fn allele(&self, allele_index: usize) -> Result<u32, GenotypeError> {
        match self {
            Genotype::Unknown => Err(GenotypeError::UnknownGenotype),
            Genotype::Known(alleles) => alleles.get(allele_index).copied()
                .ok_or(GenotypeError::UnsupportedPloidy { count: alleles.len() })
        }
    }

    /// One-way transition to the unknown state; there is no path back.
    pub fn set_unknown(&mut self) {
        *self = Genotype::Unknown;
    }
}

impl fmt::Display for Genotype {
    /// Formats the genotype the way it appears in a file: "." for unknown, alleles joined with "/".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Genotype::Unknown => write!(f, "."),
            Genotype::Known(alleles) => {
                write!(f, "{}", alleles[0])?;
                for allele in alleles.iter().skip(1) {
                    write!(f, "/{allele}")?;
                }
                Ok(())
            }
        }
    }
}

/// Parses a single allele index, rejecting anything atoi would silently mangle:
/// empty tokens, leading zeros ("01"), signs, or decimals.
fn parse_allele_index(allele_token: &str) -> Result<u32, GenotypeError> {
    let malformed = || GenotypeError::MalformedAllele { token: allele_token.to_string() };
    if allele_token.is_empty() || !allele_token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    if allele_token.len() > 1 && allele_token.starts_with('0') {
        return Err(malformed());
    }
    allele_token.parse::<u32>().map_err(|_| malformed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_diploid() {
        let genotype = Genotype::parse("0/1").unwrap();
        assert_eq!(genotype.num_alleles(), 2);
        assert_eq!(genotype.allele(0).unwrap(), 0);
        assert_eq!(genotype.allele(1).unwrap(), 1);
        assert!(!genotype.is_unknown());
        assert!(!genotype.is_haploid());
        assert_eq!(genotype.to_string(), "0/1");
    }

    #[test]
    fn test_parse_haploid() {
        let genotype = Genotype::parse("1").unwrap();
        assert_eq!(genotype.num_alleles(), 1);
        assert!(genotype.is_haploid());
        assert_eq!(genotype.to_string(), "1");
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(Genotype::parse(".").unwrap(), Genotype::Unknown);
        // "." in any position marks the whole call unknown
        assert_eq!(Genotype::parse("./.").unwrap(), Genotype::Unknown);
        assert_eq!(Genotype::parse("0/.").unwrap(), Genotype::Unknown);
        assert_eq!(Genotype::parse(".").unwrap().to_string(), ".");
        assert_eq!(Genotype::parse(".").unwrap().num_alleles(), 0);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(Genotype::parse("a/b"), Err(GenotypeError::MalformedAllele { .. })));
        assert!(matches!(Genotype::parse("0/x"), Err(GenotypeError::MalformedAllele { .. })));
        assert!(matches!(Genotype::parse(""), Err(GenotypeError::MalformedAllele { .. })));
        // atoi look-alikes are rejected rather than truncated
        assert!(matches!(Genotype::parse("01"), Err(GenotypeError::MalformedAllele { .. })));
        assert!(matches!(Genotype::parse("+1"), Err(GenotypeError::MalformedAllele { .. })));
        assert!(matches!(Genotype::parse("1.5"), Err(GenotypeError::MalformedAllele { .. })));
        // triploid and beyond are out of scope
        assert!(matches!(Genotype::parse("0/1/2"), Err(GenotypeError::UnsupportedPloidy { count: 3 })));
    }

    #[test]
    fn test_hom_ref() {
        assert!(Genotype::parse("0/0").unwrap().is_hom_ref());
        assert!(Genotype::parse("0").unwrap().is_hom_ref());
        assert!(!Genotype::parse("0/1").unwrap().is_hom_ref());
        assert!(!Genotype::parse(".").unwrap().is_hom_ref());
    }

    #[test]
    fn test_has_allele() {
        let genotype = Genotype::parse("1/2").unwrap();
        assert!(genotype.has_allele(1));
        assert!(genotype.has_allele(2));
        assert!(!genotype.has_allele(0));
        assert!(!Genotype::Unknown.has_allele(0));
    }

    #[test]
    fn test_set_unknown_is_one_way() {
        let mut genotype = Genotype::parse("1/1").unwrap();
        genotype.set_unknown();
        assert!(genotype.is_unknown());
        assert_eq!(genotype.num_alleles(), 0);
        assert_eq!(genotype.to_string(), ".");
    }
}
