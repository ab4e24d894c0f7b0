//! Enzymatic digestion of proteins into candidate peptide intervals.

use crate::errors::SearchError;
use crate::models::{
    PeptideInterval,
    Protein,
};
use serde::{
    Deserialize,
    Serialize,
};

/// Produces the peptide intervals to search for a protein.
///
/// Implementations are shared by every search worker.
pub trait Digestion: Sync {
    /// Appends the intervals of `protein` to `out`. Does not clear `out`.
    fn digest(&self, protein: &Protein, out: &mut Vec<PeptideInterval>);
}

/// What to do with a leading methionine.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InitiatorMethionine {
    Retain,
    Cleave,
    /// Produce peptides both with and without it.
    #[default]
    Variable,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DigestionConfig {
    #[serde(default = "default_cleave_at")]
    pub cleave_at: String,
    #[serde(default = "default_restrict")]
    pub restrict: Option<char>,
    pub min_length: usize,
    pub max_length: usize,
    pub max_missed_cleavages: u32,
    #[serde(default)]
    pub initiator_methionine: InitiatorMethionine,
    pub build_decoys: bool,
}

fn default_cleave_at() -> String {
    "KR".to_string()
}

fn default_restrict() -> Option<char> {
    Some('P')
}

impl Default for DigestionConfig {
    fn default() -> Self {
        Self {
            cleave_at: default_cleave_at(),
            restrict: default_restrict(),
            min_length: 7,
            max_length: 30,
            max_missed_cleavages: 2,
            initiator_methionine: InitiatorMethionine::default(),
            build_decoys: true,
        }
    }
}

/// Cleavage-rule enzyme: cuts after any residue in `cleave_at` unless the
/// next residue is `restrict`. Trypsin is `cleave_at = "KR"`,
/// `restrict = 'P'`.
#[derive(Debug, Clone)]
pub struct Protease {
    cleave_at: Vec<u8>,
    restrict: Option<u8>,
    min_length: usize,
    max_length: usize,
    max_missed_cleavages: u32,
    initiator_methionine: InitiatorMethionine,
}

impl TryFrom<&DigestionConfig> for Protease {
    type Error = SearchError;

    fn try_from(config: &DigestionConfig) -> Result<Self, Self::Error> {
        if config.cleave_at.is_empty() || !config.cleave_at.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(SearchError::config(format!(
                "cleavage residues must be uppercase letters, got '{}'",
                config.cleave_at
            )));
        }
        let restrict = match config.restrict {
            None => None,
            Some(c) if c.is_ascii_uppercase() => Some(c as u8),
            Some(c) => {
                return Err(SearchError::config(format!(
                    "cleavage restriction must be an uppercase letter, got '{}'",
                    c
                )));
            }
        };
        if config.min_length == 0 || config.min_length > config.max_length {
            return Err(SearchError::config(format!(
                "invalid peptide length range {}..={}",
                config.min_length, config.max_length
            )));
        }
        Ok(Self {
            cleave_at: config.cleave_at.bytes().collect(),
            restrict,
            min_length: config.min_length,
            max_length: config.max_length,
            max_missed_cleavages: config.max_missed_cleavages,
            initiator_methionine: config.initiator_methionine,
        })
    }
}

impl Protease {
    pub fn trypsin() -> Self {
        Self {
            cleave_at: b"KR".to_vec(),
            restrict: Some(b'P'),
            min_length: 1,
            max_length: usize::MAX,
            max_missed_cleavages: 0,
            initiator_methionine: InitiatorMethionine::Retain,
        }
    }

    pub fn with_length_range(mut self, min_length: usize, max_length: usize) -> Self {
        self.min_length = min_length;
        self.max_length = max_length;
        self
    }

    pub fn with_max_missed_cleavages(mut self, max_missed_cleavages: u32) -> Self {
        self.max_missed_cleavages = max_missed_cleavages;
        self
    }

    pub fn with_initiator_methionine(mut self, behavior: InitiatorMethionine) -> Self {
        self.initiator_methionine = behavior;
        self
    }

    /// True if the enzyme cuts between `index` and `index + 1`.
    #[inline]
    fn cleaves_after(&self, sequence: &[u8], index: usize) -> bool {
        index + 1 < sequence.len()
            && self.cleave_at.contains(&sequence[index])
            && self.restrict != Some(sequence[index + 1])
    }

    /// Emits the intervals starting at 0-based `start`.
    fn digest_from(&self, sequence: &[u8], start: usize, out: &mut Vec<PeptideInterval>) {
        let mut missed = 0;
        for end in (start + 1)..=sequence.len() {
            let len = end - start;
            if len > self.max_length {
                break;
            }
            if end == sequence.len() || self.cleaves_after(sequence, end - 1) {
                if len >= self.min_length {
                    out.push(PeptideInterval::new(start + 1, end, missed));
                }
                if missed == self.max_missed_cleavages {
                    break;
                }
                missed += 1;
            }
        }
    }
}

impl Digestion for Protease {
    fn digest(&self, protein: &Protein, out: &mut Vec<PeptideInterval>) {
        let sequence = protein.sequence().as_bytes();
        if sequence.is_empty() {
            return;
        }
        let leading_methionine = sequence[0] == b'M' && !self.cleaves_after(sequence, 0);

        if !(leading_methionine && self.initiator_methionine == InitiatorMethionine::Cleave) {
            self.digest_from(sequence, 0, out);
        }
        if leading_methionine
            && self.initiator_methionine != InitiatorMethionine::Retain
            && sequence.len() > 1
        {
            self.digest_from(sequence, 1, out);
        }
        for index in 0..sequence.len() {
            if self.cleaves_after(sequence, index) {
                self.digest_from(sequence, index + 1, out);
            }
        }
    }
}
