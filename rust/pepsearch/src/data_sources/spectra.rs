//! Spectrum input.
//!
//! Spectra come as JSON records, either one array in a `.json` file or one
//! record per line in a `.ndjson` file. Peak and precursor m/z values are
//! converted to neutral masses assuming singly charged fragments.

use crate::chemistry::{
    FragmentationMethod,
    PROTON_MASS,
};
use crate::errors::{
    DataProcessingError,
    DataReadingError,
    SearchError,
};
use crate::models::{
    TandemMassSpectra,
    TandemMassSpectrum,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::io::{
    BufRead,
    BufReader,
    Read,
};
use std::path::{
    Path,
    PathBuf,
};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectrumRecord {
    pub spectrum_number: usize,
    #[serde(default)]
    pub spectrum_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub retention_time_minutes: f64,
    pub precursor_mz: f64,
    pub precursor_charge: i32,
    #[serde(default)]
    pub precursor_intensity: f64,
    #[serde(default)]
    pub fragmentation_method: FragmentationMethod,
    pub mzs: Vec<f64>,
    pub intensities: Vec<f64>,
}

impl TryFrom<SpectrumRecord> for TandemMassSpectrum {
    type Error = DataProcessingError;

    fn try_from(x: SpectrumRecord) -> Result<Self, Self::Error> {
        if x.precursor_charge < 1 {
            return Err(DataProcessingError::InvalidValue {
                field: "precursor_charge",
                context: format!(
                    "spectrum {} has charge {}",
                    x.spectrum_number, x.precursor_charge
                ),
            });
        }
        let precursor_mass = (x.precursor_mz - PROTON_MASS) * x.precursor_charge as f64;
        let masses = x.mzs.iter().map(|mz| mz - PROTON_MASS).collect();
        let spectrum = TandemMassSpectrum::try_new(
            x.spectrum_number,
            precursor_mass,
            x.fragmentation_method,
            masses,
            x.intensities,
        )?;
        Ok(spectrum
            .with_spectrum_id(x.spectrum_id)
            .with_title(x.title)
            .with_retention_time_minutes(x.retention_time_minutes)
            .with_precursor(x.precursor_mz, x.precursor_charge, x.precursor_intensity))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectraFormat {
    Json,
    NdJson,
}

impl SpectraFormat {
    pub fn detect_from_path(path: &Path) -> Self {
        let path_str = path.to_string_lossy().to_lowercase();
        if path_str.ends_with(".ndjson") || path_str.ends_with(".jsonl") {
            SpectraFormat::NdJson
        } else {
            SpectraFormat::Json
        }
    }
}

/// Parses spectrum records from `reader`.
pub fn parse_spectrum_records<R: BufRead>(
    reader: R,
    format: SpectraFormat,
) -> Result<Vec<SpectrumRecord>, DataReadingError> {
    match format {
        SpectraFormat::Json => {
            serde_json::from_reader(reader).map_err(|e| DataReadingError::SpectraParsingError {
                source: e,
                context: "Error parsing JSON spectrum array",
            })
        }
        SpectraFormat::NdJson => {
            let mut out = Vec::new();
            for line in reader.lines() {
                let line = line.map_err(|e| DataReadingError::FileReadingError {
                    source: e,
                    context: "Error reading line",
                    path: PathBuf::new(),
                })?;
                if line.trim().is_empty() {
                    continue;
                }
                let record = serde_json::from_str(&line).map_err(|e| {
                    DataReadingError::SpectraParsingError {
                        source: e,
                        context: "Error parsing NDJSON line",
                    }
                })?;
                out.push(record);
            }
            Ok(out)
        }
    }
}

/// Parses and converts spectra, returning them sorted by precursor mass.
pub fn parse_spectra<R: Read>(reader: R, format: SpectraFormat) -> Result<TandemMassSpectra, SearchError> {
    let records = parse_spectrum_records(BufReader::new(reader), format)?;
    let spectra = records
        .into_iter()
        .map(TandemMassSpectrum::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    TandemMassSpectra::try_new(spectra)
}

pub fn read_spectra(path: &Path) -> Result<TandemMassSpectra, SearchError> {
    let file = std::fs::File::open(path).map_err(|e| DataReadingError::FileReadingError {
        source: e,
        context: "Error opening spectra file",
        path: PathBuf::from(path),
    })?;
    let format = SpectraFormat::detect_from_path(path);
    let spectra = parse_spectra(file, format)?;
    info!("Read {} spectra from {}", spectra.len(), path.display());
    Ok(spectra)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SPECTRA: &str = r#"[
        {"spectrum_number": 2, "precursor_mz": 500.5, "precursor_charge": 2,
         "mzs": [300.0, 200.0], "intensities": [1.0, 3.0]},
        {"spectrum_number": 1, "precursor_mz": 400.0, "precursor_charge": 1,
         "fragmentation_method": "ETD", "title": "scan=1",
         "mzs": [], "intensities": []}
    ]"#;

    #[test]
    fn test_parse_json_array() {
        let spectra = parse_spectra(TWO_SPECTRA.as_bytes(), SpectraFormat::Json).unwrap();
        assert_eq!(spectra.len(), 2);
        // Sorted by precursor mass.
        let first = &spectra[0];
        assert_eq!(first.spectrum_number, 1);
        assert_eq!(first.fragmentation_method, FragmentationMethod::Etd);
        assert_eq!(first.title, "scan=1");
        assert!((first.precursor_mass - (400.0 - PROTON_MASS)).abs() < 1e-9);

        let second = &spectra[1];
        assert!((second.precursor_mass - (500.5 - PROTON_MASS) * 2.0).abs() < 1e-9);
        assert_eq!(second.fragmentation_method, FragmentationMethod::Hcd);
        assert!((second.masses()[0] - (200.0 - PROTON_MASS)).abs() < 1e-9);
        assert_eq!(second.intensities(), &[3.0, 1.0]);
        assert_eq!(second.total_intensity(), 4.0);
    }

    #[test]
    fn test_parse_ndjson() {
        let text = "\
{\"spectrum_number\": 1, \"precursor_mz\": 400.0, \"precursor_charge\": 1, \"mzs\": [], \"intensities\": []}

{\"spectrum_number\": 2, \"precursor_mz\": 450.0, \"precursor_charge\": 1, \"mzs\": [], \"intensities\": []}
";
        let spectra = parse_spectra(text.as_bytes(), SpectraFormat::NdJson).unwrap();
        assert_eq!(spectra.len(), 2);
    }

    #[test]
    fn test_bad_charge_and_mismatched_peaks() {
        let zero_charge = r#"[{"spectrum_number": 1, "precursor_mz": 400.0, "precursor_charge": 0,
                              "mzs": [], "intensities": []}]"#;
        assert!(matches!(
            parse_spectra(zero_charge.as_bytes(), SpectraFormat::Json),
            Err(SearchError::DataProcessingError(
                DataProcessingError::InvalidValue { .. }
            ))
        ));

        let mismatched = r#"[{"spectrum_number": 1, "precursor_mz": 400.0, "precursor_charge": 1,
                             "mzs": [100.0], "intensities": []}]"#;
        assert!(matches!(
            parse_spectra(mismatched.as_bytes(), SpectraFormat::Json),
            Err(SearchError::DataProcessingError(
                DataProcessingError::ExpectedSlicesSameLength { .. }
            ))
        ));
    }

    #[test]
    fn test_empty_collection_is_a_config_error() {
        assert!(matches!(
            parse_spectra("[]".as_bytes(), SpectraFormat::Json),
            Err(SearchError::Config { .. })
        ));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(SpectraFormat::detect_from_path(Path::new("a/B.NDJSON")), SpectraFormat::NdJson);
        assert_eq!(SpectraFormat::detect_from_path(Path::new("spectra.json")), SpectraFormat::Json);
    }
}
