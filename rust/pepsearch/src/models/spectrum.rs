use super::tolerance::MassTolerance;
use crate::chemistry::{
    C12_C13_MASS_DIFFERENCE,
    FragmentationMethod,
};
use crate::errors::{
    DataProcessingError,
    SearchError,
};
use serde::Serialize;
use std::ops::Index;

/// One MS/MS scan with its precursor information.
///
/// Peak masses are neutral (charge-reduced) and sorted ascending; the
/// intensity at position `i` belongs to the mass at position `i`.
#[derive(Debug, Clone, Serialize)]
pub struct TandemMassSpectrum {
    pub spectrum_number: usize,
    pub spectrum_id: String,
    pub title: String,
    pub retention_time_minutes: f64,
    pub fragmentation_method: FragmentationMethod,
    pub precursor_mz: f64,
    pub precursor_intensity: f64,
    pub precursor_charge: i32,
    pub precursor_mass: f64,
    masses: Vec<f64>,
    intensities: Vec<f64>,
    total_intensity: f64,
}

impl TandemMassSpectrum {
    pub fn try_new(
        spectrum_number: usize,
        precursor_mass: f64,
        fragmentation_method: FragmentationMethod,
        masses: Vec<f64>,
        intensities: Vec<f64>,
    ) -> Result<Self, DataProcessingError> {
        if masses.len() != intensities.len() {
            return Err(DataProcessingError::ExpectedSlicesSameLength {
                expected: masses.len(),
                other: intensities.len(),
                context: format!("peak arrays of spectrum {}", spectrum_number),
            });
        }
        if !precursor_mass.is_finite() || precursor_mass <= 0.0 {
            return Err(DataProcessingError::InvalidValue {
                field: "precursor_mass",
                context: format!("spectrum {} has precursor mass {}", spectrum_number, precursor_mass),
            });
        }
        if masses.iter().chain(intensities.iter()).any(|x| !x.is_finite()) {
            return Err(DataProcessingError::ExpectedFiniteNonNanData {
                context: format!("peaks of spectrum {}", spectrum_number),
            });
        }

        let (masses, intensities) = if masses.windows(2).all(|w| w[0] <= w[1]) {
            (masses, intensities)
        } else {
            let mut peaks: Vec<(f64, f64)> = masses.into_iter().zip(intensities).collect();
            peaks.sort_by(|a, b| a.0.total_cmp(&b.0));
            peaks.into_iter().unzip()
        };
        let total_intensity = intensities.iter().sum();

        Ok(Self {
            spectrum_number,
            spectrum_id: String::new(),
            title: String::new(),
            retention_time_minutes: 0.0,
            fragmentation_method,
            precursor_mz: 0.0,
            precursor_intensity: 0.0,
            precursor_charge: 0,
            precursor_mass,
            masses,
            intensities,
            total_intensity,
        })
    }

    pub fn with_spectrum_id(mut self, spectrum_id: impl Into<String>) -> Self {
        self.spectrum_id = spectrum_id.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_retention_time_minutes(mut self, retention_time_minutes: f64) -> Self {
        self.retention_time_minutes = retention_time_minutes;
        self
    }

    pub fn with_precursor(mut self, mz: f64, charge: i32, intensity: f64) -> Self {
        self.precursor_mz = mz;
        self.precursor_charge = charge;
        self.precursor_intensity = intensity;
        self
    }

    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    pub fn num_peaks(&self) -> usize {
        self.masses.len()
    }

    pub fn total_intensity(&self) -> f64 {
        self.total_intensity
    }
}

/// Spectra sorted ascending by precursor mass.
#[derive(Debug, Clone)]
pub struct TandemMassSpectra {
    spectra: Vec<TandemMassSpectrum>,
}

#[inline]
fn next_higher_f64(x: f64) -> f64 {
    // Masses are positive, so the next representable value is one ulp up.
    f64::from_bits(x.to_bits() + 1)
}

impl TandemMassSpectra {
    /// Sorts `spectra` by precursor mass. Spectra with equal masses keep
    /// their input order.
    pub fn try_new(mut spectra: Vec<TandemMassSpectrum>) -> Result<Self, SearchError> {
        if spectra.is_empty() {
            return Err(SearchError::config("no spectra to search"));
        }
        spectra.sort_by(|a, b| a.precursor_mass.total_cmp(&b.precursor_mass));
        Ok(Self { spectra })
    }

    pub fn len(&self) -> usize {
        self.spectra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spectra.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TandemMassSpectrum> {
        self.spectra.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TandemMassSpectrum> {
        self.spectra.iter()
    }

    pub fn as_slice(&self) -> &[TandemMassSpectrum] {
        &self.spectra
    }

    /// Writes into `out` the indices of every spectrum whose precursor mass
    /// is within `tolerance` of `precursor_mass` shifted by any isotope
    /// offset in `min_isotope_offset..=max_isotope_offset`.
    ///
    /// Indices come out per offset, highest mass first. A spectrum matching
    /// several offsets is listed once per offset.
    #[cfg_attr(
        feature = "instrumentation",
        tracing::instrument(skip_all, level = "trace")
    )]
    pub fn find_in_mass_range(
        &self,
        precursor_mass: f64,
        tolerance: &MassTolerance,
        min_isotope_offset: i32,
        max_isotope_offset: i32,
        out: &mut Vec<usize>,
    ) {
        out.clear();
        for offset in min_isotope_offset..=max_isotope_offset {
            let mass = precursor_mass + offset as f64 * C12_C13_MASS_DIFFERENCE;
            let (low, high) = tolerance.mass_range(mass);
            let upper = next_higher_f64(high);
            let mut index = self
                .spectra
                .partition_point(|s| s.precursor_mass < upper);
            while index > 0 {
                index -= 1;
                let candidate = self.spectra[index].precursor_mass;
                if candidate < low {
                    break;
                }
                if candidate <= high {
                    out.push(index);
                }
            }
        }
    }
}

impl Index<usize> for TandemMassSpectra {
    type Output = TandemMassSpectrum;

    fn index(&self, index: usize) -> &TandemMassSpectrum {
        &self.spectra[index]
    }
}
