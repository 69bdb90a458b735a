
/// All the event types we classify records into, from REF/ALT lengths alone
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord,
    strum_macros::Display, strum_macros::EnumIter, strum_macros::EnumString)]
pub enum EventType {
    /// REF and ALT are both length = 1
    #[strum(serialize = "SNP", ascii_case_insensitive)]
    Snp=0,
    /// REF length = 1, ALT length > 1
    #[strum(ascii_case_insensitive)]
    Insertion,
    /// REF length > 1, ALT length = 1
    #[strum(ascii_case_insensitive)]
    Deletion,
    /// REF and ALT lengths > 1
    #[strum(ascii_case_insensitive)]
    Replacement,
    /// Anything we cannot type, currently just multi-allelic records; make sure Unknown is always the last one in the list
    #[strum(ascii_case_insensitive)]
    Unknown
}

#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum EventError {
    #[error("operation requires a single alternate allele, found {count}")]
    MultiAllelic { count: usize }
}

/// One record's variant descriptor: the reference allele and the alternate
/// allele(s) as they appeared in the input.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Event {
    reference: String,
    alternates: Vec<String>
}

impl Event {
    /// Constructor
    /// # Arguments
    /// * `reference` - the reference allele string
    /// * `alternate_field` - the raw alternate column, comma-separated if multi-allelic
    pub fn new(reference: &str, alternate_field: &str) -> Self {
        Self {
            reference: reference.to_string(),
            alternates: alternate_field.split(',').map(String::from).collect()
        }
    }

    /// True when there is exactly one alternate allele; multi-allelic records
    /// cannot be typed or size-checked.
    pub fn has_single_alt_allele(&self) -> bool {
        self.alternates.len() == 1
    }

    /// Length of the reference allele.
    pub fn ref_size(&self) -> usize {
        self.reference.len()
    }

    /// Length of the alternate allele. Note this is a fairly primitive measure;
    /// symbolic ALTs like <DEL> carry their length in INFO and are not resolved here.
    /// # Errors
    /// * if the record is multi-allelic
    pub fn alt_size(&self) -> Result<usize, EventError> {
        if !self.has_single_alt_allele() {
            return Err(EventError::MultiAllelic { count: self.alternates.len() });
        }
        Ok(self.alternates[0].len())
    }

    /// Derives the event type from the reference/alternate lengths.
    /// Multi-allelic records are typed Unknown.
    pub fn event_type(&self) -> EventType {
        let alt_size = match self.alt_size() {
            Ok(alt_size) => alt_size,
            Err(_) => return EventType::Unknown
        };

        match (self.ref_size(), alt_size) {
            (1, 1) => EventType::Snp,
            (1, _) => EventType::Insertion,
            (_, 1) => EventType::Deletion,
            (_, _) => EventType::Replacement
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_event_typing() {
        assert_eq!(Event::new("A", "C").event_type(), EventType::Snp);
        assert_eq!(Event::new("A", "ACGT").event_type(), EventType::Insertion);
        assert_eq!(Event::new("ACGT", "A").event_type(), EventType::Deletion);
        assert_eq!(Event::new("ACGT", "TT").event_type(), EventType::Replacement);
    }

    #[test]
    fn test_multi_allelic() {
        let event = Event::new("A", "C,G");
        assert!(!event.has_single_alt_allele());
        assert_eq!(event.event_type(), EventType::Unknown);
        assert_eq!(event.alt_size(), Err(EventError::MultiAllelic { count: 2 }));
    }

    #[test]
    fn test_sizes() {
        let event = Event::new("ACGT", "A");
        assert_eq!(event.ref_size(), 4);
        assert_eq!(event.alt_size().unwrap(), 1);
    }

    #[test]
    fn test_event_type_names() {
        // table files use these names, matched case-insensitively
        assert_eq!(EventType::Snp.to_string(), "SNP");
        assert_eq!(EventType::Insertion.to_string(), "Insertion");
        assert_eq!(EventType::from_str("snp").unwrap(), EventType::Snp);
        assert_eq!(EventType::from_str("DELETION").unwrap(), EventType::Deletion);
        assert_eq!(EventType::from_str("Replacement").unwrap(), EventType::Replacement);
        assert!(EventType::from_str("inversion").is_err());
    }
}
