
use std::fmt;

use crate::data_types::genotype::{Genotype, GenotypeError};
use crate::data_types::support::{Support, SupportError};

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error(transparent)]
    Genotype(#[from] GenotypeError),
    #[error(transparent)]
    Support(#[from] SupportError)
}

/// The decoded contents of one sample column for one event: the genotype call
/// plus whatever read support the caller reported alongside it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GenotypingResult {
    genotype: Genotype,
    support: Support
}

impl GenotypingResult {
    /// Decodes a whitespace-delimited sample token such as "0/1:15,25".
    /// The token splits on the first colon into a genotype part and a support part.
    /// In pindel mode the support part is parsed, a payload starting with "-1" or
    /// "0,0" is a sentinel for an unknown call, and support that contradicts the
    /// genotype forces the call to unknown. In the standard mode the support part
    /// is ignored entirely and the support stays the no-op instance.
    /// # Arguments
    /// * `sample_token` - the raw sample column text
    /// * `pindel_mode` - whether the token follows the pindel support conventions
    /// # Errors
    /// * if the genotype or support parts do not parse
    pub fn decode(sample_token: &str, pindel_mode: bool) -> Result<GenotypingResult, DecodeError> {
        let (genotype_text, support_text) = match sample_token.split_once(':') {
            Some((genotype_text, support_text)) => (genotype_text, Some(support_text)),
            None => (sample_token, None)
        };

        let mut genotype = Genotype::parse(genotype_text)?;
        if !pindel_mode {
            return Ok(GenotypingResult {
                genotype,
                support: Support::none()
            });
        }

        // pindel mode; a sentinel payload overrides the genotype call outright
        let support = match support_text {
            Some(support_text) if support_text.starts_with("-1") || support_text.starts_with("0,0") => {
                genotype.set_unknown();
                Support::none()
            },
            Some(support_text) => Support::parse(support_text)?,
            None => Support::none()
        };

        if support.indicates_unknown_genotype() {
            genotype.set_unknown();
        }

        Ok(GenotypingResult {
            genotype,
            support
        })
    }

    /// Discards the genotype call, e.g. when its confidence is too low.
    pub fn suppress_call(&mut self) {
        self.genotype.set_unknown();
    }

    // getters
    pub fn genotype(&self) -> &Genotype {
        &self.genotype
    }

    pub fn support(&self) -> &Support {
        &self.support
    }
}

impl fmt::Display for GenotypingResult {
    /// Formats the decoded call as "genotype:support", or just the genotype when
    /// there is no support data.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.support.is_none() {
            write!(f, "{}", self.genotype)
        } else {
            write!(f, "{}:{}", self.genotype, self.support)
        }
    }
}
