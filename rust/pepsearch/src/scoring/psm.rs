use super::scorer::MatchScores;
use crate::chemistry::MassType;
use crate::models::{
    Peptide,
    TandemMassSpectrum,
};
use std::cmp::Ordering;

/// The best peptide found for a spectrum.
///
/// Owns a deep copy of the peptide (modifications included), so it stays
/// valid while the worker keeps recycling its peptide pools.
#[derive(Debug, Clone)]
pub struct PeptideSpectrumMatch<'a> {
    spectrum_index: usize,
    spectrum: &'a TandemMassSpectrum,
    peptide: Peptide<'a>,
    scores: MatchScores,
    precursor_mass_type: MassType,
}

/// Whether a match with (`score`, `decoy`) should replace one with
/// (`incumbent_score`, `incumbent_decoy`): a higher score wins, and on an
/// equal score a target beats a decoy. Anything else keeps the incumbent.
#[inline]
pub fn outranks(score: f64, decoy: bool, incumbent_score: f64, incumbent_decoy: bool) -> bool {
    score > incumbent_score || (score == incumbent_score && !decoy && incumbent_decoy)
}

impl<'a> PeptideSpectrumMatch<'a> {
    pub fn new(
        spectrum_index: usize,
        spectrum: &'a TandemMassSpectrum,
        peptide: &Peptide<'a>,
        scores: MatchScores,
        precursor_mass_type: MassType,
    ) -> Self {
        Self {
            spectrum_index,
            spectrum,
            peptide: peptide.clone(),
            scores,
            precursor_mass_type,
        }
    }

    /// Overwrites this match in place, reusing the peptide's buffers.
    pub fn assign(
        &mut self,
        spectrum_index: usize,
        spectrum: &'a TandemMassSpectrum,
        peptide: &Peptide<'a>,
        scores: &MatchScores,
    ) {
        self.spectrum_index = spectrum_index;
        self.spectrum = spectrum;
        self.peptide.copy_from(peptide);
        self.scores = *scores;
    }

    /// Position of the spectrum in the searched collection.
    pub fn spectrum_index(&self) -> usize {
        self.spectrum_index
    }

    pub fn spectrum(&self) -> &'a TandemMassSpectrum {
        self.spectrum
    }

    pub fn peptide(&self) -> &Peptide<'a> {
        &self.peptide
    }

    pub fn scores(&self) -> &MatchScores {
        &self.scores
    }

    pub fn score(&self) -> f64 {
        self.scores.score
    }

    pub fn is_decoy(&self) -> bool {
        self.peptide.is_decoy()
    }

    pub fn is_target(&self) -> bool {
        !self.is_decoy()
    }

    pub fn theoretical_mass(&self) -> f64 {
        self.peptide.mass(self.precursor_mass_type)
    }

    pub fn outranks(&self, other: &PeptideSpectrumMatch<'_>) -> bool {
        outranks(self.score(), self.is_decoy(), other.score(), other.is_decoy())
    }
}

pub fn ascending_spectrum_number(a: &PeptideSpectrumMatch<'_>, b: &PeptideSpectrumMatch<'_>) -> Ordering {
    a.spectrum.spectrum_number.cmp(&b.spectrum.spectrum_number)
}

/// Best first; targets ahead of decoys on equal scores.
pub fn descending_score(a: &PeptideSpectrumMatch<'_>, b: &PeptideSpectrumMatch<'_>) -> Ordering {
    b.score()
        .total_cmp(&a.score())
        .then_with(|| a.is_decoy().cmp(&b.is_decoy()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::FragmentationMethod;
    use crate::models::{
        PeptideInterval,
        Protein,
    };

    fn scores(score: f64) -> MatchScores {
        MatchScores {
            score,
            ..Default::default()
        }
    }

    #[test]
    fn test_outranks_prefers_targets_on_ties() {
        assert!(outranks(3.0, true, 2.0, false));
        assert!(outranks(3.0, false, 3.0, true));
        assert!(!outranks(3.0, true, 3.0, false));
        assert!(!outranks(3.0, false, 3.0, false));
        assert!(!outranks(3.0, true, 3.0, true));
    }

    #[test]
    fn test_sort_orders() {
        let target = Protein::new("PEPTIDEK", "target", false);
        let decoy = target.reversed_decoy("DECOY_");
        let s1 = TandemMassSpectrum::try_new(7, 900.0, FragmentationMethod::Hcd, vec![], vec![]).unwrap();
        let s2 = TandemMassSpectrum::try_new(3, 800.0, FragmentationMethod::Hcd, vec![], vec![]).unwrap();
        let tp = Peptide::new(&target, PeptideInterval::new(1, 8, 0));
        let dp = Peptide::new(&decoy, PeptideInterval::new(1, 8, 0));
        let mt = MassType::Monoisotopic;

        let mut psms = vec![
            PeptideSpectrumMatch::new(0, &s1, &dp, scores(2.0), mt),
            PeptideSpectrumMatch::new(1, &s2, &tp, scores(2.0), mt),
            PeptideSpectrumMatch::new(1, &s2, &tp, scores(5.0), mt),
        ];
        psms.sort_by(descending_score);
        assert_eq!(psms[0].score(), 5.0);
        assert!(psms[1].is_target());
        assert!(psms[2].is_decoy());

        psms.sort_by(ascending_spectrum_number);
        assert_eq!(psms[0].spectrum().spectrum_number, 3);
        assert_eq!(psms[2].spectrum().spectrum_number, 7);
    }

    #[test]
    fn test_assign_replaces_peptide() {
        let protein = Protein::new("PEPTIDEKSAMPLER", "p", false);
        let s = TandemMassSpectrum::try_new(1, 900.0, FragmentationMethod::Hcd, vec![], vec![]).unwrap();
        let first = Peptide::new(&protein, PeptideInterval::new(1, 8, 0));
        let second = Peptide::new(&protein, PeptideInterval::new(9, 15, 0));
        let mut psm = PeptideSpectrumMatch::new(0, &s, &first, scores(1.0), MassType::Monoisotopic);
        psm.assign(0, &s, &second, &scores(4.0));
        assert_eq!(psm.peptide().base_sequence(), "SAMPLER");
        assert_eq!(psm.score(), 4.0);
        assert_eq!(psm.theoretical_mass(), second.monoisotopic_mass());
    }
}
