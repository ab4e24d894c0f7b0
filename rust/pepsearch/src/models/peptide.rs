use super::isoforms::PossibleModifications;
use super::modification::Modification;
use super::polymer::{
    Anchoring,
    Polymer,
    TerminusAnchored,
};
use super::protein::{
    DETACHED_PROTEIN,
    Protein,
};
use super::sequence_view::SeqView;
use super::site::{
    SiteModifications,
    VariableModifications,
};
use crate::chemistry::{
    MassType,
    ProductType,
};
use crate::utils::{
    QuickSorter,
    ReusablePool,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::fmt;
use std::ops::ControlFlow;

/// A peptide's position in its protein. Residue numbers are 1-based and
/// inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeptideInterval {
    pub start_residue: usize,
    pub end_residue: usize,
    pub missed_cleavages: u32,
}

impl PeptideInterval {
    pub fn new(start_residue: usize, end_residue: usize, missed_cleavages: u32) -> Self {
        Self {
            start_residue,
            end_residue,
            missed_cleavages,
        }
    }

    pub fn len(&self) -> usize {
        self.end_residue + 1 - self.start_residue
    }

    pub fn is_empty(&self) -> bool {
        self.end_residue < self.start_residue
    }

    /// Whether this is a non-empty 1-based range inside a protein of
    /// `protein_len` residues.
    pub fn fits_within(&self, protein_len: usize) -> bool {
        self.start_residue >= 1 && !self.is_empty() && self.end_residue <= protein_len
    }
}

/// A slice of a protein plus the modifications placed on it.
///
/// Peptides live in [`ReusablePool`]s and get re-initialized in place, so a
/// peptide is identified by its content and not by its slot.
#[derive(Debug, Clone)]
pub struct Peptide<'a> {
    polymer: Polymer<'a>,
    parent: &'a Protein,
    start_residue: usize,
    end_residue: usize,
    missed_cleavages: u32,
    previous_residue: u8,
    next_residue: u8,
}

impl Default for Peptide<'_> {
    fn default() -> Self {
        Self {
            polymer: Polymer::default(),
            parent: &DETACHED_PROTEIN,
            start_residue: 0,
            end_residue: 0,
            missed_cleavages: 0,
            previous_residue: b'-',
            next_residue: b'-',
        }
    }
}

impl<'a> Peptide<'a> {
    pub fn new(parent: &'a Protein, interval: PeptideInterval) -> Self {
        let mut peptide = Self::default();
        peptide.init(parent, interval);
        peptide
    }

    /// Re-binds this record to `interval` of `parent`, dropping all
    /// modifications.
    pub fn init(&mut self, parent: &'a Protein, interval: PeptideInterval) {
        assert!(
            interval.fits_within(parent.len()),
            "interval {:?} outside of a protein of length {}",
            interval,
            parent.len()
        );
        self.polymer.reset(SeqView::new(
            parent.sequence(),
            interval.start_residue - 1,
            interval.len(),
        ));
        self.parent = parent;
        self.start_residue = interval.start_residue;
        self.end_residue = interval.end_residue;
        self.missed_cleavages = interval.missed_cleavages;
        self.previous_residue = if interval.start_residue >= 2 {
            parent.residue(interval.start_residue - 2)
        } else {
            b'-'
        };
        self.next_residue = if interval.end_residue < parent.len() {
            parent.residue(interval.end_residue)
        } else {
            b'-'
        };
    }

    /// Copies parent, interval and flanks of `other`, without modifications.
    pub fn copy_identity_from(&mut self, other: &Peptide<'a>) {
        self.init(other.parent, other.interval());
    }

    /// Deep copy of `other`, modifications included, reusing this record's
    /// buffers.
    pub fn copy_from(&mut self, other: &Peptide<'a>) {
        self.polymer.copy_from(&other.polymer);
        self.parent = other.parent;
        self.start_residue = other.start_residue;
        self.end_residue = other.end_residue;
        self.missed_cleavages = other.missed_cleavages;
        self.previous_residue = other.previous_residue;
        self.next_residue = other.next_residue;
    }

    pub fn interval(&self) -> PeptideInterval {
        PeptideInterval::new(self.start_residue, self.end_residue, self.missed_cleavages)
    }

    pub fn parent(&self) -> &'a Protein {
        self.parent
    }

    pub fn start_residue(&self) -> usize {
        self.start_residue
    }

    pub fn end_residue(&self) -> usize {
        self.end_residue
    }

    pub fn missed_cleavages(&self) -> u32 {
        self.missed_cleavages
    }

    pub fn previous_residue(&self) -> char {
        self.previous_residue as char
    }

    pub fn next_residue(&self) -> char {
        self.next_residue as char
    }

    pub fn is_decoy(&self) -> bool {
        self.parent.is_decoy()
    }

    pub fn is_target(&self) -> bool {
        !self.is_decoy()
    }

    pub fn len(&self) -> usize {
        self.polymer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polymer.is_empty()
    }

    pub fn base_sequence(&self) -> SeqView<'a> {
        self.polymer.sequence()
    }

    /// Base sequence with every `I` written as `L`. Allocates.
    pub fn leucine_sequence(&self) -> String {
        self.base_sequence()
            .iter()
            .map(|r| if r == b'I' { 'L' } else { r as char })
            .collect()
    }

    /// Modified sequence between its flanking residues, e.g. `K.PEPTIDE.R`.
    /// Allocates.
    pub fn extended_sequence(&self) -> String {
        format!(
            "{}.{}.{}",
            self.previous_residue(),
            self.polymer,
            self.next_residue()
        )
    }

    pub fn polymer(&self) -> &Polymer<'a> {
        &self.polymer
    }

    pub fn fixed_modifications(&self) -> Option<&SiteModifications<'a>> {
        self.polymer.fixed_modifications()
    }

    pub fn variable_modifications(&self) -> &VariableModifications<'a> {
        self.polymer.variable_modifications()
    }

    pub fn set_fixed_modifications<I>(&mut self, candidates: I, scratch: &mut SiteModifications<'a>)
    where
        I: IntoIterator<Item = &'a Modification>,
    {
        let anchoring = self.anchoring();
        self.polymer
            .set_fixed_modifications(candidates, anchoring, scratch);
    }

    pub fn mass(&self, mass_type: MassType) -> f64 {
        self.polymer.mass(mass_type)
    }

    pub fn monoisotopic_mass(&self) -> f64 {
        self.polymer.monoisotopic_mass()
    }

    pub fn average_mass(&self) -> f64 {
        self.polymer.average_mass()
    }

    pub fn calculate_product_mass(
        &mut self,
        product: ProductType,
        number: usize,
        mass_type: MassType,
    ) -> f64 {
        self.polymer
            .calculate_product_mass(product, number, mass_type)
    }

    pub fn calculate_product_masses(
        &mut self,
        products: &[ProductType],
        buffer: &mut Vec<f64>,
        sorter: &mut QuickSorter,
        mass_type: MassType,
    ) -> usize {
        self.polymer
            .calculate_product_masses(products, buffer, sorter, mass_type)
    }

    /// Fills `out` with up to `max_isoforms` variably modified copies of
    /// this peptide, least modified first.
    ///
    /// Every isoform carries this peptide's fixed modifications. The first
    /// one is always the unmodified form.
    pub fn variably_modified_peptides<I>(
        &self,
        candidates: I,
        max_isoforms: usize,
        out: &mut ReusablePool<Peptide<'a>>,
        scratch: &mut PossibleModifications<'a>,
    ) where
        I: IntoIterator<Item = &'a Modification>,
    {
        out.clear();
        if max_isoforms == 0 {
            return;
        }
        scratch.collect(self.base_sequence(), self.anchoring(), candidates);
        let _ = scratch.for_each_pattern(|pattern| {
            let isoform = out.add();
            isoform.copy_identity_from(self);
            isoform
                .polymer
                .copy_fixed_modifications_from(&self.polymer);
            isoform.polymer.set_variable_modifications(pattern.iter());
            if out.len() >= max_isoforms {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
    }
}

impl TerminusAnchored for Peptide<'_> {
    fn anchoring(&self) -> Anchoring {
        let initiator_methionine_removed =
            self.start_residue == 2 && self.parent.residue(0) == b'M';
        Anchoring {
            protein_n_terminus: self.start_residue == 1 || initiator_methionine_removed,
            protein_c_terminus: self.end_residue == self.parent.len(),
        }
    }
}

impl fmt::Display for Peptide<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.polymer, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::modification::ModificationType;
    use crate::models::site::Site;

    #[test]
    fn test_init_sets_flanks() {
        let protein = Protein::new("MPEPTIDEKSAMPLER", "test", false);
        let peptide = Peptide::new(&protein, PeptideInterval::new(2, 9, 0));
        assert_eq!(peptide.base_sequence(), "PEPTIDEK");
        assert_eq!(peptide.previous_residue(), 'M');
        assert_eq!(peptide.next_residue(), 'S');
        assert_eq!(peptide.extended_sequence(), "M.PEPTIDEK.S");

        let last = Peptide::new(&protein, PeptideInterval::new(10, 16, 1));
        assert_eq!(last.base_sequence(), "SAMPLER");
        assert_eq!(last.next_residue(), '-');
        assert_eq!(last.missed_cleavages(), 1);
        assert!(last.anchoring().protein_c_terminus);
        assert!(!last.anchoring().protein_n_terminus);
    }

    #[test]
    fn test_interval_fits_within() {
        assert!(PeptideInterval::new(1, 16, 0).fits_within(16));
        assert!(PeptideInterval::new(16, 16, 0).fits_within(16));
        assert!(!PeptideInterval::new(0, 4, 0).fits_within(16));
        assert!(!PeptideInterval::new(5, 4, 0).fits_within(16));
        assert!(!PeptideInterval::new(10, 17, 0).fits_within(16));
    }

    #[test]
    fn test_initiator_methionine_counts_as_protein_terminus() {
        let protein = Protein::new("MPEPTIDEK", "test", false);
        let cleaved = Peptide::new(&protein, PeptideInterval::new(2, 9, 0));
        assert!(cleaved.anchoring().protein_n_terminus);
        let full = Peptide::new(&protein, PeptideInterval::new(1, 9, 0));
        assert!(full.anchoring().protein_n_terminus);
        assert_eq!(full.previous_residue(), '-');

        let other = Protein::new("APEPTIDEK", "test", false);
        let inner = Peptide::new(&other, PeptideInterval::new(2, 9, 0));
        assert!(!inner.anchoring().protein_n_terminus);
    }

    #[test]
    fn test_leucine_sequence() {
        let protein = Protein::new("LIKEIT", "test", false);
        let peptide = Peptide::new(&protein, PeptideInterval::new(1, 6, 0));
        assert_eq!(peptide.leucine_sequence(), "LLKELT");
    }

    #[test]
    fn test_isoforms_keep_fixed_modifications() {
        let protein = Protein::new("MCMK", "test", false);
        let cam = Modification::new("cam", ModificationType::Residue, Some('C'), 57.0, 57.0);
        let ox = Modification::new("ox", ModificationType::Residue, Some('M'), 16.0, 16.0);
        let fixed = [cam];
        let variable = [ox];

        let mut fixed_scratch = SiteModifications::default();
        let mut possible = PossibleModifications::default();
        let mut pool = ReusablePool::with_capacity(4);

        let mut peptide = Peptide::new(&protein, PeptideInterval::new(1, 4, 0));
        peptide.set_fixed_modifications(fixed.iter(), &mut fixed_scratch);
        peptide.variably_modified_peptides(variable.iter(), 10, &mut pool, &mut possible);

        let rendered: Vec<String> = pool.iter().map(|p| p.to_string()).collect();
        assert_eq!(
            rendered,
            vec!["MC[cam]MK", "M(ox)C[cam]MK", "MC[cam]M(ox)K", "M(ox)C[cam]M(ox)K"]
        );
        let base = peptide.monoisotopic_mass();
        assert!((pool.get(3).unwrap().monoisotopic_mass() - base - 32.0).abs() < 1e-9);
        assert!(pool.iter().all(|p| p.fixed_modifications().is_some()));

        // Truncated, then reused for a smaller budget.
        peptide.variably_modified_peptides(variable.iter(), 2, &mut pool, &mut possible);
        assert_eq!(pool.len(), 2);
        assert!(pool.get(0).unwrap().variable_modifications().is_empty());
        assert_eq!(
            pool.get(1).unwrap().variable_modifications().get(Site::Residue(0)),
            Some(&variable[0])
        );

        peptide.variably_modified_peptides(variable.iter(), 0, &mut pool, &mut possible);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_copy_from_keeps_modifications() {
        let protein = Protein::new("MAMK", "test", false);
        let ox = Modification::new("ox", ModificationType::Residue, Some('M'), 16.0, 16.0);
        let mut source = Peptide::new(&protein, PeptideInterval::new(1, 4, 0));
        source.polymer.set_variable_modifications([(Site::Residue(2), &ox)]);

        let mut copy = Peptide::default();
        copy.copy_from(&source);
        assert_eq!(copy.to_string(), "MAM(ox)K");
        assert_eq!(copy.monoisotopic_mass(), source.monoisotopic_mass());

        // The copy is independent of later changes to the source.
        source.init(&protein, PeptideInterval::new(2, 3, 0));
        assert_eq!(copy.to_string(), "MAM(ox)K");
        assert_eq!(source.to_string(), "AM");
    }
}
