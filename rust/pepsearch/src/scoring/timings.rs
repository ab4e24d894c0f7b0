//! Counters and timings reported by a search.

use serde::Serialize;
use std::time::Duration;

/// Work done by one search worker (or by all of them, once merged).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchCounts {
    pub proteins: usize,
    /// Distinct target peptides, up to I/L, unless memory minimization is on.
    pub target_peptides: usize,
    pub decoy_peptides: usize,
    pub isoforms: usize,
    /// Peptide-spectrum pairs that went through the scorer.
    pub candidate_matches: usize,
    pub failed_proteins: usize,
}

impl std::ops::AddAssign for SearchCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.proteins += rhs.proteins;
        self.target_peptides += rhs.target_peptides;
        self.decoy_peptides += rhs.decoy_peptides;
        self.isoforms += rhs.isoforms;
        self.candidate_matches += rhs.candidate_matches;
        self.failed_proteins += rhs.failed_proteins;
    }
}

#[derive(Debug, Default, Clone)]
pub struct SearchSummary {
    pub num_spectra: usize,
    pub num_matched_spectra: usize,
    pub totals: SearchCounts,
    pub per_worker: Vec<SearchCounts>,
    pub elapsed: Duration,
}

impl Serialize for SearchSummary {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("SearchSummary", 5)?;
        state.serialize_field("num_spectra", &self.num_spectra)?;
        state.serialize_field("num_matched_spectra", &self.num_matched_spectra)?;
        state.serialize_field("totals", &self.totals)?;
        state.serialize_field("per_worker", &self.per_worker)?;
        state.serialize_field("elapsed_ms", &self.elapsed.as_millis())?;
        state.end()
    }
}
