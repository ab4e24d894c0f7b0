mod decoy;
pub mod isoforms;
mod leucine;
mod modification;
pub mod modified_sequence;
pub mod peptide;
pub mod polymer;
mod protein;
mod sequence_view;
mod site;
mod spectrum;
mod tolerance;

pub use decoy::DecoyMarking;
pub use isoforms::{
    ModificationPattern,
    PossibleModifications,
};
pub use leucine::{
    LeucineKey,
    leucine_equal,
    leucine_hash,
};
pub use modification::{
    Modification,
    ModificationType,
    validate_modifications,
};
pub use modified_sequence::{
    ParsedSequence,
    Placement,
    parse_modified_sequence,
};
pub use peptide::{
    Peptide,
    PeptideInterval,
};
pub use polymer::{
    Anchoring,
    Polymer,
    TerminusAnchored,
};
pub use protein::{
    Protein,
    append_reversed_decoys,
};
pub use sequence_view::SeqView;
pub use site::{
    Site,
    SiteModifications,
    VariableModifications,
};
pub use spectrum::{
    TandemMassSpectra,
    TandemMassSpectrum,
};
pub use tolerance::MassTolerance;
