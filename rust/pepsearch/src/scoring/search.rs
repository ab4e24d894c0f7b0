//! The database search loop.
//!
//! Proteins are split into one contiguous partition per rayon thread. Each
//! partition is searched by a [`SearchWorker`] that owns every buffer the
//! loop needs, so after warm-up the per-peptide path does not touch the
//! allocator. Workers keep their own best match per spectrum; the partial
//! results are merged in partition order at the end.

use super::accumulator::{
    BestMatches,
    SearchAccumulator,
    WorkerOutcome,
};
use super::psm::{
    PeptideSpectrumMatch,
    ascending_spectrum_number,
    outranks,
};
use super::scorer::{
    MatchScorer,
    MatchScores,
};
use super::timings::{
    SearchCounts,
    SearchSummary,
};
use crate::chemistry::MassType;
use crate::digest::Digestion;
use crate::errors::{
    DataProcessingError,
    SearchError,
};
use crate::models::{
    DecoyMarking,
    LeucineKey,
    MassTolerance,
    Modification,
    Peptide,
    PeptideInterval,
    PossibleModifications,
    Protein,
    SiteModifications,
    TandemMassSpectra,
    validate_modifications,
};
use crate::utils::{
    QuickSorter,
    ReusablePool,
};
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::time::Instant;
use tracing::{
    debug,
    error,
    info,
};

// Initial sizes of the per-worker buffers.
const INITIAL_PEPTIDES: usize = 1000;
const INITIAL_SPECTRUM_INDICES: usize = 1000;
const INITIAL_PRODUCT_MASSES: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchParameters {
    #[serde(default)]
    pub precursor_mass_type: MassType,
    #[serde(default)]
    pub product_mass_type: MassType,
    pub precursor_tolerance: MassTolerance,
    pub product_tolerance: MassTolerance,
    #[serde(default)]
    pub min_isotope_offset: i32,
    #[serde(default)]
    pub max_isotope_offset: i32,
    #[serde(default = "default_max_isoforms")]
    pub max_variable_modification_isoforms: usize,
    /// Skips the observed-peptide map: every peptide is scored and counted,
    /// including ones already seen under another protein.
    #[serde(default)]
    pub minimize_memory_usage: bool,
}

fn default_max_isoforms() -> usize {
    1024
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            precursor_mass_type: MassType::Monoisotopic,
            product_mass_type: MassType::Monoisotopic,
            precursor_tolerance: MassTolerance::Ppm(10.0),
            product_tolerance: MassTolerance::Absolute(0.01),
            min_isotope_offset: 0,
            max_isotope_offset: 0,
            max_variable_modification_isoforms: default_max_isoforms(),
            minimize_memory_usage: false,
        }
    }
}

impl SearchParameters {
    pub fn validate(&self) -> Result<(), SearchError> {
        self.precursor_tolerance.validate()?;
        self.product_tolerance.validate()?;
        if self.min_isotope_offset > self.max_isotope_offset {
            return Err(SearchError::config(format!(
                "isotope offset range {}..={} is empty",
                self.min_isotope_offset, self.max_isotope_offset
            )));
        }
        Ok(())
    }

    pub fn scorer(&self) -> MatchScorer {
        MatchScorer {
            precursor_mass_type: self.precursor_mass_type,
            product_mass_type: self.product_mass_type,
            product_tolerance: self.product_tolerance,
        }
    }
}

/// Best match per searched spectrum, ascending by spectrum number.
#[derive(Debug)]
pub struct SearchResults<'a> {
    pub psms: Vec<PeptideSpectrumMatch<'a>>,
    pub summary: SearchSummary,
}

/// Shared, read-only inputs of a search.
pub struct DatabaseSearcher<'a, D> {
    spectra: &'a TandemMassSpectra,
    digestion: &'a D,
    fixed_modifications: &'a [Modification],
    variable_modifications: &'a [Modification],
    parameters: SearchParameters,
}

impl<'a, D: Digestion> DatabaseSearcher<'a, D> {
    pub fn try_new(
        spectra: &'a TandemMassSpectra,
        digestion: &'a D,
        fixed_modifications: &'a [Modification],
        variable_modifications: &'a [Modification],
        parameters: SearchParameters,
    ) -> Result<Self, SearchError> {
        parameters.validate()?;
        validate_modifications(fixed_modifications)?;
        validate_modifications(variable_modifications)?;
        if spectra.is_empty() {
            return Err(SearchError::config("no spectra to search"));
        }
        Ok(Self {
            spectra,
            digestion,
            fixed_modifications,
            variable_modifications,
            parameters,
        })
    }

    pub fn parameters(&self) -> &SearchParameters {
        &self.parameters
    }

    /// Searches every protein against the spectra.
    ///
    /// A protein whose candidates cannot be evaluated (for instance a
    /// non-finite precursor mass) stops being searched; the other proteins
    /// still are, and the first such failure is returned once every worker
    /// has finished.
    pub fn search(
        &self,
        proteins: &'a [Protein],
        progress: &ProgressBar,
    ) -> Result<SearchResults<'a>, SearchError> {
        let start = Instant::now();
        let num_workers = rayon::current_num_threads().max(1);
        let partition_len = proteins.len().div_ceil(num_workers).max(1);
        info!(
            "Searching {} proteins against {} spectra in partitions of {} proteins",
            proteins.len(),
            self.spectra.len(),
            partition_len
        );

        let accumulator: SearchAccumulator<'a> = proteins
            .par_chunks(partition_len)
            .map(|partition| self.search_partition(partition, progress))
            .collect();

        let totals = accumulator.totals();
        let SearchAccumulator {
            best,
            per_worker,
            failure,
        } = accumulator;
        if let Some(failure) = failure {
            error!(
                "{} proteins could not be searched",
                totals.failed_proteins
            );
            return Err(failure);
        }

        let mut psms: Vec<PeptideSpectrumMatch<'a>> = best.into_iter().flatten().map(|b| *b).collect();
        psms.sort_by(ascending_spectrum_number);

        let elapsed = start.elapsed();
        let summary = SearchSummary {
            num_spectra: self.spectra.len(),
            num_matched_spectra: psms.len(),
            totals,
            per_worker,
            elapsed,
        };
        info!(
            "Searched {} proteins ({} target / {} decoy peptides, {} candidate matches) in {:?}",
            totals.proteins,
            totals.target_peptides,
            totals.decoy_peptides,
            totals.candidate_matches,
            elapsed,
        );
        let throughput = totals.proteins as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
        info!("Throughput: {:.2} proteins/s", throughput);
        Ok(SearchResults { psms, summary })
    }

    fn search_partition(&self, partition: &'a [Protein], progress: &ProgressBar) -> WorkerOutcome<'a> {
        let mut worker = SearchWorker::new(self.spectra.len(), self.parameters.minimize_memory_usage);
        for protein in partition {
            if let Err(e) = worker.search_protein(self, protein) {
                let e = e.append_to_context(&format!(" in protein '{}'", protein.description()));
                error!("Error searching protein: {:?}", e);
                worker.counts.failed_proteins += 1;
                if worker.failure.is_none() {
                    worker.failure = Some(e.into());
                }
            }
            progress.inc(1);
        }
        debug!("Worker finished: {:?}", worker.counts);
        worker.finish()
    }
}

/// Everything one thread needs to search its proteins.
struct SearchWorker<'a> {
    counts: SearchCounts,
    peptides_observed: Option<HashMap<LeucineKey<'a>, DecoyMarking>>,
    intervals: Vec<PeptideInterval>,
    digested: ReusablePool<Peptide<'a>>,
    isoforms: ReusablePool<Peptide<'a>>,
    fixed_scratch: SiteModifications<'a>,
    possible: PossibleModifications<'a>,
    spectrum_indices: Vec<usize>,
    product_masses: Vec<f64>,
    sorter: QuickSorter,
    current: MatchScores,
    best: BestMatches<'a>,
    failure: Option<SearchError>,
}

/// Records `peptide` as seen and says whether it still needs scoring.
///
/// A sequence already seen (up to I/L) is skipped, except that a target
/// seen after only decoys replaces them and gets scored.
fn observe_peptide<'a>(
    observed: &mut Option<HashMap<LeucineKey<'a>, DecoyMarking>>,
    counts: &mut SearchCounts,
    peptide: &Peptide<'a>,
) -> bool {
    let marking = peptide.parent().decoy_marking();
    let Some(observed) = observed else {
        count_peptide(counts, marking);
        return true;
    };
    match observed.entry(LeucineKey(peptide.base_sequence())) {
        Entry::Vacant(entry) => {
            entry.insert(marking);
            count_peptide(counts, marking);
            true
        }
        Entry::Occupied(mut entry) => {
            if entry.get().is_decoy() && marking.is_target() {
                entry.insert(marking);
                counts.decoy_peptides -= 1;
                counts.target_peptides += 1;
                true
            } else {
                false
            }
        }
    }
}

#[inline]
fn count_peptide(counts: &mut SearchCounts, marking: DecoyMarking) {
    if marking.is_decoy() {
        counts.decoy_peptides += 1;
    } else {
        counts.target_peptides += 1;
    }
}

impl<'a> SearchWorker<'a> {
    fn new(num_spectra: usize, minimize_memory_usage: bool) -> Self {
        let mut best = Vec::with_capacity(num_spectra);
        best.resize_with(num_spectra, || None);
        Self {
            counts: SearchCounts::default(),
            peptides_observed: if minimize_memory_usage {
                None
            } else {
                Some(HashMap::new())
            },
            intervals: Vec::with_capacity(INITIAL_PEPTIDES),
            digested: ReusablePool::with_capacity(INITIAL_PEPTIDES),
            isoforms: ReusablePool::with_capacity(INITIAL_PEPTIDES),
            fixed_scratch: SiteModifications::default(),
            possible: PossibleModifications::default(),
            spectrum_indices: Vec::with_capacity(INITIAL_SPECTRUM_INDICES),
            product_masses: vec![0.0; INITIAL_PRODUCT_MASSES],
            sorter: QuickSorter::new(),
            current: MatchScores::default(),
            best,
            failure: None,
        }
    }

    #[cfg_attr(
        feature = "instrumentation",
        tracing::instrument(skip_all, level = "trace")
    )]
    fn search_protein<D: Digestion>(
        &mut self,
        searcher: &DatabaseSearcher<'a, D>,
        protein: &'a Protein,
    ) -> Result<(), DataProcessingError> {
        let Self {
            counts,
            peptides_observed,
            intervals,
            digested,
            isoforms,
            fixed_scratch,
            possible,
            spectrum_indices,
            product_masses,
            sorter,
            current,
            best,
            ..
        } = self;
        let spectra: &'a TandemMassSpectra = searcher.spectra;
        let fixed_modifications: &'a [Modification] = searcher.fixed_modifications;
        let variable_modifications: &'a [Modification] = searcher.variable_modifications;
        let parameters = &searcher.parameters;
        let scorer = parameters.scorer();

        counts.proteins += 1;
        intervals.clear();
        searcher.digestion.digest(protein, intervals);
        digested.clear();
        for interval in intervals.iter() {
            if !interval.fits_within(protein.len()) {
                return Err(DataProcessingError::InvalidValue {
                    field: "peptide_interval",
                    context: format!(
                        "residues {}-{} outside of {} residues",
                        interval.start_residue,
                        interval.end_residue,
                        protein.len()
                    ),
                });
            }
            digested.add().init(protein, *interval);
        }

        for peptide in digested.iter_mut() {
            peptide.set_fixed_modifications(fixed_modifications.iter(), fixed_scratch);
            if !observe_peptide(peptides_observed, counts, peptide) {
                continue;
            }
            peptide.variably_modified_peptides(
                variable_modifications.iter(),
                parameters.max_variable_modification_isoforms,
                isoforms,
                possible,
            );

            for isoform in isoforms.iter_mut() {
                counts.isoforms += 1;
                let precursor_mass = isoform.mass(parameters.precursor_mass_type);
                if !precursor_mass.is_finite() {
                    return Err(DataProcessingError::ExpectedFiniteNonNanData {
                        context: format!(
                            "precursor mass of {} (residues {}-{})",
                            isoform,
                            isoform.start_residue(),
                            isoform.end_residue()
                        ),
                    });
                }
                spectra.find_in_mass_range(
                    precursor_mass,
                    &parameters.precursor_tolerance,
                    parameters.min_isotope_offset,
                    parameters.max_isotope_offset,
                    spectrum_indices,
                );

                for &index in spectrum_indices.iter() {
                    let spectrum = &spectra[index];
                    scorer.score_into(spectrum, isoform, product_masses, sorter, current);
                    counts.candidate_matches += 1;

                    let slot = &mut best[index];
                    match slot {
                        Some(incumbent) => {
                            if outranks(
                                current.score,
                                isoform.is_decoy(),
                                incumbent.score(),
                                incumbent.is_decoy(),
                            ) {
                                incumbent.assign(index, spectrum, isoform, current);
                            }
                        }
                        None => {
                            *slot = Some(Box::new(PeptideSpectrumMatch::new(
                                index,
                                spectrum,
                                isoform,
                                *current,
                                parameters.precursor_mass_type,
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn finish(self) -> WorkerOutcome<'a> {
        WorkerOutcome {
            best: self.best,
            counts: self.counts,
            failure: self.failure,
        }
    }
}
