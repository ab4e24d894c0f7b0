use crate::chemistry::MassType;
use crate::models::{
    MassTolerance,
    Peptide,
    TandemMassSpectrum,
};
use crate::utils::QuickSorter;
use serde::Serialize;

/// Everything the scorer computes for one peptide against one spectrum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MatchScores {
    pub precursor_mass_error_da: f64,
    pub precursor_mass_error_ppm: f64,
    pub matching_products: usize,
    pub total_products: usize,
    pub matching_products_fraction: f64,
    pub matching_intensity: f64,
    pub matching_intensity_fraction: f64,
    /// Matched ion count plus the matched fraction of the total intensity.
    pub score: f64,
}

/// Number of theoretical masses that have at least one experimental peak
/// within tolerance. Both slices must be sorted ascending.
pub fn count_matching_products(
    theoretical: &[f64],
    experimental: &[f64],
    tolerance: &MassTolerance,
) -> usize {
    let mut matched = 0;
    let (mut t, mut e) = (0, 0);
    while t < theoretical.len() && e < experimental.len() {
        let difference = experimental[e] - theoretical[t];
        if tolerance.accepts(difference, theoretical[t]) {
            matched += 1;
            t += 1;
        } else if difference < 0.0 {
            e += 1;
        } else {
            t += 1;
        }
    }
    matched
}

/// Summed intensity of the experimental peaks that lie within tolerance of
/// some theoretical mass. Each peak counts at most once.
pub fn sum_matching_intensity(
    theoretical: &[f64],
    experimental: &[f64],
    intensities: &[f64],
    tolerance: &MassTolerance,
) -> f64 {
    let mut intensity = 0.0;
    let (mut t, mut e) = (0, 0);
    while t < theoretical.len() && e < experimental.len() {
        let difference = experimental[e] - theoretical[t];
        if tolerance.accepts(difference, theoretical[t]) {
            intensity += intensities[e];
            e += 1;
        } else if difference < 0.0 {
            e += 1;
        } else {
            t += 1;
        }
    }
    intensity
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchScorer {
    pub precursor_mass_type: MassType,
    pub product_mass_type: MassType,
    pub product_tolerance: MassTolerance,
}

impl MatchScorer {
    /// Scores `peptide` against `spectrum`, overwriting `out`.
    ///
    /// `product_masses` and `sorter` are caller-owned scratch; nothing is
    /// allocated once the product buffer is large enough.
    #[cfg_attr(
        feature = "instrumentation",
        tracing::instrument(skip_all, level = "trace")
    )]
    pub fn score_into(
        &self,
        spectrum: &TandemMassSpectrum,
        peptide: &mut Peptide<'_>,
        product_masses: &mut Vec<f64>,
        sorter: &mut QuickSorter,
        out: &mut MatchScores,
    ) {
        let theoretical_mass = peptide.mass(self.precursor_mass_type);
        out.precursor_mass_error_da = spectrum.precursor_mass - theoretical_mass;
        out.precursor_mass_error_ppm = out.precursor_mass_error_da / theoretical_mass * 1e6;

        let products = spectrum.fragmentation_method.product_types();
        let total = peptide.calculate_product_masses(
            products,
            product_masses,
            sorter,
            self.product_mass_type,
        );
        let theoretical = &product_masses[..total];

        let matched = count_matching_products(theoretical, spectrum.masses(), &self.product_tolerance);
        let intensity = sum_matching_intensity(
            theoretical,
            spectrum.masses(),
            spectrum.intensities(),
            &self.product_tolerance,
        );

        out.total_products = total;
        out.matching_products = matched;
        out.matching_products_fraction = if total == 0 {
            0.0
        } else {
            matched as f64 / total as f64
        };
        out.matching_intensity = intensity;
        out.matching_intensity_fraction = if spectrum.total_intensity() > 0.0 {
            intensity / spectrum.total_intensity()
        } else {
            0.0
        };
        out.score = matched as f64 + out.matching_intensity_fraction;
    }

    pub fn score(
        &self,
        spectrum: &TandemMassSpectrum,
        peptide: &mut Peptide<'_>,
        product_masses: &mut Vec<f64>,
        sorter: &mut QuickSorter,
    ) -> MatchScores {
        let mut out = MatchScores::default();
        self.score_into(spectrum, peptide, product_masses, sorter, &mut out);
        out
    }
}
