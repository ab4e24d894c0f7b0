use serde::Serialize;

/// The different labels that denote if a sequence is a decoy or not.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, std::hash::Hash, PartialOrd, Ord)]
pub enum DecoyMarking {
    Target,
    ReversedDecoy,
}

impl DecoyMarking {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecoyMarking::Target => "Target",
            DecoyMarking::ReversedDecoy => "Decoy",
        }
    }

    pub fn is_decoy(&self) -> bool {
        match self {
            DecoyMarking::Target => false,
            DecoyMarking::ReversedDecoy => true,
        }
    }

    pub fn is_target(&self) -> bool {
        !self.is_decoy()
    }
}

/// Reverses a whole protein chain.
pub(crate) fn as_decoy_string(sequence: &str) -> String {
    sequence.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoy() {
        let sequence = "MPEPTIDEPINK";
        let decoy = as_decoy_string(sequence);
        assert_eq!(sequence, "MPEPTIDEPINK");
        assert_eq!(decoy, "KNIPEDITPEPM");
    }

    #[test]
    fn test_marking_labels() {
        assert_eq!(DecoyMarking::Target.as_str(), "Target");
        assert!(DecoyMarking::ReversedDecoy.is_decoy());
        assert!(DecoyMarking::Target.is_target());
    }
}
