mod accumulator;
pub mod psm;
pub mod scorer;
pub mod search;
pub mod search_results;
pub mod timings;

pub use psm::{
    PeptideSpectrumMatch,
    ascending_spectrum_number,
    descending_score,
};
pub use scorer::{
    MatchScorer,
    MatchScores,
};
pub use search::{
    DatabaseSearcher,
    SearchParameters,
    SearchResults,
};
pub use search_results::PsmTsvWriter;
pub use timings::{
    SearchCounts,
    SearchSummary,
};
