use pepsearch::digest::DigestionConfig;
use pepsearch::models::Modification;
use pepsearch::scoring::SearchParameters;
use serde::{
    Deserialize,
    Serialize,
};
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub input: Option<InputConfig>,
    pub search: SearchConfig,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct InputConfig {
    pub fasta: Option<PathBuf>,
    pub spectra: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(flatten)]
    pub parameters: SearchParameters,
    #[serde(default)]
    pub digestion: DigestionConfig,
    #[serde(default)]
    pub fixed_modifications: Vec<Modification>,
    #[serde(default)]
    pub variable_modifications: Vec<Modification>,
    #[serde(default = "default_decoy_prefix")]
    pub decoy_prefix: String,
    /// 0 lets rayon pick.
    #[serde(default)]
    pub threads: usize,
}

fn default_decoy_prefix() -> String {
    "DECOY_".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pepsearch::models::MassTolerance;

    #[test]
    fn test_minimal_config() {
        let config: Config = serde_json::from_str(
            r#"{
                "search": {
                    "precursor_tolerance": "10 ppm",
                    "product_tolerance": {"da": 0.02}
                }
            }"#,
        )
        .unwrap();
        assert!(config.input.is_none());
        assert_eq!(config.search.parameters.precursor_tolerance, MassTolerance::Ppm(10.0));
        assert_eq!(config.search.digestion.min_length, 7);
        assert_eq!(config.search.decoy_prefix, "DECOY_");
        assert_eq!(config.search.threads, 0);
    }

    #[test]
    fn test_sample_config_parses() {
        let config: Config =
            serde_json::from_str(include_str!("../../../config.example.json")).unwrap();
        let input = config.input.unwrap();
        assert!(input.fasta.is_some());
        assert_eq!(config.search.fixed_modifications.len(), 1);
        assert_eq!(config.search.variable_modifications.len(), 1);
        assert_eq!(config.search.parameters.max_isotope_offset, 1);
    }
}
