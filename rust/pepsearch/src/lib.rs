pub mod chemistry;
pub mod data_sources;
pub mod digest;
pub mod errors;
pub mod models;
pub mod scoring;
pub mod utils;

pub use chemistry::{
    FragmentationMethod,
    MassType,
    ProductType,
};
pub use digest::{
    Digestion,
    DigestionConfig,
    Protease,
};
pub use errors::{
    Result,
    SearchError,
};
pub use models::{
    MassTolerance,
    Modification,
    Peptide,
    Protein,
    TandemMassSpectra,
    TandemMassSpectrum,
};
pub use scoring::{
    DatabaseSearcher,
    PeptideSpectrumMatch,
    SearchParameters,
    SearchResults,
};
