//! Merging of per-worker search results.
//!
//! Every worker keeps its own best match per spectrum. Partial results are
//! combined left to right in partition order with the same predicate the
//! workers use, so a full tie keeps the match from the earlier partition and
//! the merged result does not depend on thread scheduling.

use super::psm::PeptideSpectrumMatch;
use super::timings::SearchCounts;
use crate::errors::SearchError;
use rayon::iter::{
    FromParallelIterator,
    IntoParallelIterator,
    ParallelIterator,
};

pub(super) type BestMatches<'a> = Vec<Option<Box<PeptideSpectrumMatch<'a>>>>;

/// What one worker hands back after its partition.
pub(super) struct WorkerOutcome<'a> {
    pub(super) best: BestMatches<'a>,
    pub(super) counts: SearchCounts,
    pub(super) failure: Option<SearchError>,
}

#[derive(Default)]
pub(super) struct SearchAccumulator<'a> {
    pub(super) best: BestMatches<'a>,
    pub(super) per_worker: Vec<SearchCounts>,
    pub(super) failure: Option<SearchError>,
}

impl<'a> SearchAccumulator<'a> {
    /// Merges `other` (the later partition) into `self`.
    pub(super) fn reduce(mut self, other: Self) -> Self {
        if self.best.is_empty() {
            self.best = other.best;
        } else {
            for (mine, theirs) in self.best.iter_mut().zip(other.best) {
                let Some(candidate) = theirs else {
                    continue;
                };
                let replace = match mine.as_deref() {
                    None => true,
                    Some(incumbent) => candidate.outranks(incumbent),
                };
                if replace {
                    *mine = Some(candidate);
                }
            }
        }
        self.per_worker.extend(other.per_worker);
        if self.failure.is_none() {
            self.failure = other.failure;
        }
        self
    }

    pub(super) fn fold(self, item: WorkerOutcome<'a>) -> Self {
        self.reduce(SearchAccumulator {
            best: item.best,
            per_worker: vec![item.counts],
            failure: item.failure,
        })
    }

    pub(super) fn totals(&self) -> SearchCounts {
        let mut totals = SearchCounts::default();
        for counts in self.per_worker.iter() {
            totals += *counts;
        }
        totals
    }
}

impl<'a> FromIterator<WorkerOutcome<'a>> for SearchAccumulator<'a> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = WorkerOutcome<'a>>,
    {
        iter.into_iter()
            .fold(SearchAccumulator::default(), SearchAccumulator::fold)
    }
}

impl<'a> FromParallelIterator<WorkerOutcome<'a>> for SearchAccumulator<'a> {
    fn from_par_iter<I>(par_iter: I) -> Self
    where
        I: IntoParallelIterator<Item = WorkerOutcome<'a>>,
    {
        par_iter
            .into_par_iter()
            .fold(SearchAccumulator::default, SearchAccumulator::fold)
            .reduce(SearchAccumulator::default, SearchAccumulator::reduce)
    }
}
