use super::decoy::{
    DecoyMarking,
    as_decoy_string,
};
use super::polymer::{
    Anchoring,
    Polymer,
    TerminusAnchored,
};
use super::sequence_view::SeqView;
use serde::Serialize;

/// A whole protein chain as read from the database.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Protein {
    sequence: String,
    description: String,
    decoy: DecoyMarking,
}

/// Parent of peptides that have not been bound to a protein yet.
pub(crate) static DETACHED_PROTEIN: Protein = Protein {
    sequence: String::new(),
    description: String::new(),
    decoy: DecoyMarking::Target,
};

impl Protein {
    pub fn new(sequence: impl Into<String>, description: impl Into<String>, decoy: bool) -> Self {
        Self {
            sequence: sequence.into(),
            description: description.into(),
            decoy: if decoy {
                DecoyMarking::ReversedDecoy
            } else {
                DecoyMarking::Target
            },
        }
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn view(&self) -> SeqView<'_> {
        SeqView::whole(&self.sequence)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Residue at a 0-based position.
    #[inline]
    pub fn residue(&self, index: usize) -> u8 {
        self.sequence.as_bytes()[index]
    }

    pub fn decoy_marking(&self) -> DecoyMarking {
        self.decoy
    }

    pub fn is_decoy(&self) -> bool {
        self.decoy.is_decoy()
    }

    /// Mass model over the whole chain, with no modifications attached.
    pub fn polymer(&self) -> Polymer<'_> {
        Polymer::new(self.view())
    }

    /// Reversed copy of this protein, labelled as a decoy.
    pub fn reversed_decoy(&self, description_prefix: &str) -> Protein {
        Protein {
            sequence: as_decoy_string(&self.sequence),
            description: format!("{}{}", description_prefix, self.description),
            decoy: DecoyMarking::ReversedDecoy,
        }
    }
}

impl TerminusAnchored for Protein {
    fn anchoring(&self) -> Anchoring {
        Anchoring::BOTH
    }
}

/// Appends a reversed decoy for every target protein.
pub fn append_reversed_decoys(proteins: &mut Vec<Protein>, description_prefix: &str) {
    let decoys: Vec<Protein> = proteins
        .iter()
        .filter(|p| !p.is_decoy())
        .map(|p| p.reversed_decoy(description_prefix))
        .collect();
    proteins.extend(decoys);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::{
        MassType,
        WATER_MONOISOTOPIC_MASS,
        residue_mass,
    };

    #[test]
    fn test_protein_mass() {
        let protein = Protein::new("GG", "glycylglycine", false);
        let expected = WATER_MONOISOTOPIC_MASS + 2.0 * residue_mass(b'G', MassType::Monoisotopic);
        assert!((protein.polymer().monoisotopic_mass() - expected).abs() < 1e-9);
        assert_eq!(protein.anchoring(), Anchoring::BOTH);
    }

    #[test]
    fn test_append_reversed_decoys() {
        let mut proteins = vec![
            Protein::new("MPEPTIDEK", "sp|P1|first", false),
            Protein::new("MSAMPLER", "sp|P2|second", false),
        ];
        append_reversed_decoys(&mut proteins, "DECOY_");
        assert_eq!(proteins.len(), 4);
        assert_eq!(proteins[2].sequence(), "KEDITPEPM");
        assert_eq!(proteins[2].description(), "DECOY_sp|P1|first");
        assert!(proteins[3].is_decoy());
        assert!(!proteins[0].is_decoy());
    }
}
