use super::modification::Modification;
use crate::chemistry::MassType;

/// A position on a polymer that can carry modifications.
///
/// Residue indices are 0-based within the polymer. Variants are declared
/// in positional order so the derived ordering walks the polymer N to C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Site {
    ProteinNTerm,
    PeptideNTerm,
    Residue(usize),
    PeptideCTerm,
    ProteinCTerm,
}

impl Site {
    /// Integer code of this site on a polymer of `len` residues:
    /// protein N `0`, peptide N `1`, residues `2..len + 2`,
    /// peptide C `len + 2`, protein C `len + 3`.
    pub fn code(self, len: usize) -> usize {
        match self {
            Site::ProteinNTerm => 0,
            Site::PeptideNTerm => 1,
            Site::Residue(index) => index + 2,
            Site::PeptideCTerm => len + 2,
            Site::ProteinCTerm => len + 3,
        }
    }

    pub fn from_code(code: usize, len: usize) -> Option<Site> {
        match code {
            0 => Some(Site::ProteinNTerm),
            1 => Some(Site::PeptideNTerm),
            c if c < len + 2 => Some(Site::Residue(c - 2)),
            c if c == len + 2 => Some(Site::PeptideCTerm),
            c if c == len + 3 => Some(Site::ProteinCTerm),
            _ => None,
        }
    }

    fn fits(self, len: usize) -> bool {
        match self {
            Site::Residue(index) => index < len,
            _ => true,
        }
    }
}

/// Per-site lists of modifications, laid out densely by site code.
///
/// Used both for the fixed modifications of a polymer (several may stack on
/// one site) and for the candidates of the isoform enumerator. `sites` keeps
/// the order in which occupied sites were first discovered. Resetting keeps
/// every inner buffer, so refilling for the next polymer does not allocate
/// once the buffers have warmed up.
#[derive(Debug, Clone, Default)]
pub struct SiteModifications<'a> {
    len: usize,
    sites: Vec<Site>,
    slots: Vec<Vec<&'a Modification>>,
}

impl<'a> SiteModifications<'a> {
    /// Empties the map and lays it out for a polymer of `polymer_len` residues.
    pub fn reset(&mut self, polymer_len: usize) {
        for site in self.sites.drain(..) {
            let code = site.code(self.len);
            self.slots[code].clear();
        }
        self.len = polymer_len;
        if self.slots.len() < polymer_len + 4 {
            self.slots.resize_with(polymer_len + 4, Vec::new);
        }
    }

    pub fn push(&mut self, site: Site, modification: &'a Modification) {
        debug_assert!(site.fits(self.len));
        let code = site.code(self.len);
        if self.slots[code].is_empty() {
            self.sites.push(site);
        }
        self.slots[code].push(modification);
    }

    pub fn get(&self, site: Site) -> &[&'a Modification] {
        if !site.fits(self.len) {
            return &[];
        }
        match self.slots.get(site.code(self.len)) {
            Some(mods) => mods.as_slice(),
            None => &[],
        }
    }

    /// Occupied sites in discovery order.
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Site, &'a Modification)> + '_ {
        self.sites
            .iter()
            .flat_map(move |&site| self.get(site).iter().map(move |m| (site, *m)))
    }

    pub fn total_shift(&self, mass_type: MassType) -> f64 {
        self.iter().map(|(_, m)| m.mass_shift(mass_type)).sum()
    }

    /// Overwrites this map with the contents of `other`, reusing buffers.
    pub fn copy_from(&mut self, other: &SiteModifications<'a>) {
        self.reset(other.len);
        for &site in other.sites.iter() {
            for &m in other.get(site) {
                self.push(site, m);
            }
        }
    }
}

/// One variable-modification isoform: at most one modification per site.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableModifications<'a> {
    entries: Vec<(Site, &'a Modification)>,
}

impl<'a> VariableModifications<'a> {
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Places `modification` on `site`, replacing whatever was there.
    pub fn insert(&mut self, site: Site, modification: &'a Modification) {
        match self.entries.iter_mut().find(|(s, _)| *s == site) {
            Some(entry) => entry.1 = modification,
            None => self.entries.push((site, modification)),
        }
    }

    pub fn get(&self, site: Site) -> Option<&'a Modification> {
        self.entries
            .iter()
            .find(|(s, _)| *s == site)
            .map(|(_, m)| *m)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Site, &'a Modification)> + '_ {
        self.entries.iter().copied()
    }

    pub fn total_shift(&self, mass_type: MassType) -> f64 {
        self.entries
            .iter()
            .map(|(_, m)| m.mass_shift(mass_type))
            .sum()
    }

    pub fn copy_from(&mut self, other: &VariableModifications<'a>) {
        self.entries.clear();
        self.entries.extend_from_slice(&other.entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::modification::ModificationType;

    #[test]
    fn test_site_code_round_trip() {
        for len in [1usize, 2, 9] {
            for code in 0..(len + 4) {
                let site = Site::from_code(code, len).unwrap();
                assert_eq!(site.code(len), code);
            }
            assert_eq!(Site::from_code(len + 4, len), None);
        }
        assert_eq!(Site::from_code(2, 9), Some(Site::Residue(0)));
        assert_eq!(Site::from_code(11, 9), Some(Site::PeptideCTerm));
        assert_eq!(Site::ProteinCTerm.code(9), 12);
    }

    #[test]
    fn test_site_order_is_positional() {
        let mut sites = vec![
            Site::ProteinCTerm,
            Site::Residue(3),
            Site::PeptideNTerm,
            Site::Residue(0),
            Site::PeptideCTerm,
            Site::ProteinNTerm,
        ];
        sites.sort();
        assert_eq!(
            sites,
            vec![
                Site::ProteinNTerm,
                Site::PeptideNTerm,
                Site::Residue(0),
                Site::Residue(3),
                Site::PeptideCTerm,
                Site::ProteinCTerm,
            ]
        );
    }

    #[test]
    fn test_site_modifications_stack_and_reset() {
        let ox = Modification::new("ox", ModificationType::Residue, Some('M'), 15.99, 16.0);
        let other = Modification::new("other", ModificationType::Residue, None, 1.0, 1.0);
        let acetyl = Modification::new(
            "ac",
            ModificationType::PeptideNTerminus,
            None,
            42.01,
            42.04,
        );
        let mut map = SiteModifications::default();
        map.reset(5);
        map.push(Site::Residue(2), &ox);
        map.push(Site::PeptideNTerm, &acetyl);
        map.push(Site::Residue(2), &other);

        assert_eq!(map.sites(), &[Site::Residue(2), Site::PeptideNTerm]);
        assert_eq!(map.get(Site::Residue(2)).len(), 2);
        assert!(map.get(Site::Residue(9)).is_empty());
        assert!((map.total_shift(MassType::Monoisotopic) - (15.99 + 1.0 + 42.01)).abs() < 1e-9);

        let mut copy = SiteModifications::default();
        copy.copy_from(&map);
        assert_eq!(copy.iter().count(), 3);

        map.reset(3);
        assert!(map.is_empty());
        assert!(map.get(Site::Residue(2)).is_empty());
        assert_eq!(copy.get(Site::PeptideNTerm)[0].description, "ac");
    }

    #[test]
    fn test_variable_modifications_replace_per_site() {
        let a = Modification::new("a", ModificationType::Residue, None, 1.0, 1.0);
        let b = Modification::new("b", ModificationType::Residue, None, 2.0, 2.0);
        let mut map = VariableModifications::default();
        map.insert(Site::Residue(1), &a);
        map.insert(Site::Residue(1), &b);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(Site::Residue(1)).unwrap().description, "b");
        assert_eq!(map.get(Site::Residue(0)), None);
        assert_eq!(map.total_shift(MassType::Average), 2.0);
    }
}
