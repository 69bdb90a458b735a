
/// Contains the variant descriptor for one record and its derived event type
pub mod event;
/// Contains the per-sample genotype call model
pub mod genotype;
/// Pairs one genotype with its read support for one sample at one event
pub mod genotyping;
/// Contains the per-allele read-depth counts and VAF derivation
pub mod support;
