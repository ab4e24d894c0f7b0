//! Sequence identity up to the isobaric I/L pair.
//!
//! Isoleucine and leucine have the same mass, so two peptides that only
//! differ at I/L positions cannot be told apart by mass spectrometry and
//! are counted once.
use super::sequence_view::SeqView;
use std::hash::{
    Hash,
    Hasher,
};

#[inline]
fn fold_isoleucine(residue: u8) -> u8 {
    if residue == b'I' { b'L' } else { residue }
}

/// Jenkins one-at-a-time hash over the residues, with `I` hashed as `L`.
pub fn leucine_hash(sequence: SeqView<'_>) -> u32 {
    let mut hash: u32 = 0;
    for residue in sequence.iter() {
        hash = hash.wrapping_add(fold_isoleucine(residue) as u32);
        hash = hash.wrapping_add(hash << 10);
        hash ^= hash >> 6;
    }
    hash = hash.wrapping_add(hash << 3);
    hash ^= hash >> 11;
    hash = hash.wrapping_add(hash << 15);
    hash
}

pub fn leucine_equal(a: SeqView<'_>, b: SeqView<'_>) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b.iter())
            .all(|(x, y)| fold_isoleucine(x) == fold_isoleucine(y))
}

/// Hash map key that compares sequences with `I == L`.
#[derive(Debug, Clone, Copy)]
pub struct LeucineKey<'a>(pub SeqView<'a>);

impl PartialEq for LeucineKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        leucine_equal(self.0, other.0)
    }
}

impl Eq for LeucineKey<'_> {}

impl Hash for LeucineKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(leucine_hash(self.0));
    }
}
