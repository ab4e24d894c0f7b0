use super::psm::PeptideSpectrumMatch;
use crate::errors::SearchError;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{
    Path,
    PathBuf,
};
use tracing::error;

/// One row of the PSM report.
///
/// Flat on purpose: csv cannot serialize `#[serde(flatten)]` fields.
#[derive(Debug, Serialize)]
struct PsmRecord<'r> {
    #[serde(rename = "Spectrum Number")]
    spectrum_number: usize,
    #[serde(rename = "Spectrum ID")]
    spectrum_id: &'r str,
    #[serde(rename = "Spectrum Title")]
    spectrum_title: &'r str,
    #[serde(rename = "Retention Time (minutes)")]
    retention_time_minutes: f64,
    #[serde(rename = "Precursor m/z")]
    precursor_mz: f64,
    #[serde(rename = "Precursor Intensity")]
    precursor_intensity: f64,
    #[serde(rename = "Precursor Charge")]
    precursor_charge: i32,
    #[serde(rename = "Precursor Mass (Da)")]
    precursor_mass: f64,
    #[serde(rename = "Experimental Peaks")]
    experimental_peaks: usize,
    #[serde(rename = "Total Intensity")]
    total_intensity: f64,

    #[serde(rename = "Peptide Sequence")]
    peptide_sequence: String,
    #[serde(rename = "Base Peptide Sequence")]
    base_peptide_sequence: &'r str,
    #[serde(rename = "Protein Description")]
    protein_description: &'r str,
    #[serde(rename = "Start Residue Number")]
    start_residue: usize,
    #[serde(rename = "Stop Residue Number")]
    stop_residue: usize,
    #[serde(rename = "Missed Cleavages")]
    missed_cleavages: u32,
    #[serde(rename = "Theoretical Mass (Da)")]
    theoretical_mass: f64,

    #[serde(rename = "Precursor Mass Error (Da)")]
    precursor_mass_error_da: f64,
    #[serde(rename = "Precursor Mass Error (ppm)")]
    precursor_mass_error_ppm: f64,
    #[serde(rename = "Matching Products")]
    matching_products: usize,
    #[serde(rename = "Total Products")]
    total_products: usize,
    #[serde(rename = "Ratio of Matching Products")]
    matching_products_fraction: f64,
    #[serde(rename = "Matching Intensity")]
    matching_intensity: f64,
    #[serde(rename = "Fraction of Intensity Matching")]
    matching_intensity_fraction: f64,
    #[serde(rename = "Score")]
    score: f64,
    #[serde(rename = "Target/Decoy")]
    target_decoy: &'static str,
}

impl<'r> PsmRecord<'r> {
    fn new(psm: &'r PeptideSpectrumMatch<'_>) -> Self {
        let spectrum = psm.spectrum();
        let peptide = psm.peptide();
        let scores = psm.scores();
        Self {
            spectrum_number: spectrum.spectrum_number,
            spectrum_id: &spectrum.spectrum_id,
            spectrum_title: &spectrum.title,
            retention_time_minutes: spectrum.retention_time_minutes,
            precursor_mz: spectrum.precursor_mz,
            precursor_intensity: spectrum.precursor_intensity,
            precursor_charge: spectrum.precursor_charge,
            precursor_mass: spectrum.precursor_mass,
            experimental_peaks: spectrum.num_peaks(),
            total_intensity: spectrum.total_intensity(),
            peptide_sequence: peptide.extended_sequence(),
            base_peptide_sequence: peptide.base_sequence().as_str(),
            protein_description: peptide.parent().description(),
            start_residue: peptide.start_residue(),
            stop_residue: peptide.end_residue(),
            missed_cleavages: peptide.missed_cleavages(),
            theoretical_mass: psm.theoretical_mass(),
            precursor_mass_error_da: scores.precursor_mass_error_da,
            precursor_mass_error_ppm: scores.precursor_mass_error_ppm,
            matching_products: scores.matching_products,
            total_products: scores.total_products,
            matching_products_fraction: scores.matching_products_fraction,
            matching_intensity: scores.matching_intensity,
            matching_intensity_fraction: scores.matching_intensity_fraction,
            score: scores.score,
            target_decoy: peptide.parent().decoy_marking().as_str(),
        }
    }
}

/// Tab-separated PSM report writer.
pub struct PsmTsvWriter<W: Write> {
    writer: csv::Writer<W>,
    path: Option<PathBuf>,
    written: usize,
}

impl PsmTsvWriter<File> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SearchError> {
        let path = path.as_ref();
        let file = match File::create(path) {
            Ok(file) => file,
            Err(err) => {
                error!("Failed to open file {:?} with error: {}", path, err);
                return Err(SearchError::Io {
                    source: err,
                    path: Some(path.to_path_buf()),
                });
            }
        };
        let mut out = Self::from_writer(file);
        out.path = Some(path.to_path_buf());
        Ok(out)
    }
}

impl<W: Write> PsmTsvWriter<W> {
    pub fn from_writer(writer: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(writer);
        Self {
            writer,
            path: None,
            written: 0,
        }
    }

    pub fn write(&mut self, psm: &PeptideSpectrumMatch<'_>) -> Result<(), SearchError> {
        self.writer
            .serialize(PsmRecord::new(psm))
            .map_err(|e| self.io_error(e))?;
        self.written += 1;
        Ok(())
    }

    pub fn write_all<'p, 'a: 'p>(
        &mut self,
        psms: impl IntoIterator<Item = &'p PeptideSpectrumMatch<'a>>,
    ) -> Result<(), SearchError> {
        for psm in psms {
            self.write(psm)?;
        }
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(self) -> Result<W, SearchError> {
        let path = self.path;
        self.writer.into_inner().map_err(|e| SearchError::Io {
            source: e.into_error(),
            path,
        })
    }

    fn io_error(&self, e: csv::Error) -> SearchError {
        SearchError::Io {
            source: e.into(),
            path: self.path.clone(),
        }
    }
}
