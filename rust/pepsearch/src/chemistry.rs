//! Mass constants, residue mass tables and product ion definitions.
//!
//! All masses are in daltons. Residue masses are the masses of the residue
//! inside a chain (the free amino acid minus one water).

use serde::{
    Deserialize,
    Serialize,
};

pub const WATER_MONOISOTOPIC_MASS: f64 = 18.0105646863;
pub const WATER_AVERAGE_MASS: f64 = 18.01528;
pub const PROTON_MASS: f64 = 1.00727638;
/// Mass difference between a 13C and a 12C atom, used for isotope-offset windows.
pub const C12_C13_MASS_DIFFERENCE: f64 = 1.0033548378;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MassType {
    #[default]
    Monoisotopic,
    Average,
}

impl MassType {
    pub fn water(self) -> f64 {
        match self {
            MassType::Monoisotopic => WATER_MONOISOTOPIC_MASS,
            MassType::Average => WATER_AVERAGE_MASS,
        }
    }
}

// Indexed by `residue - b'A'`. Letters that are not one of the twenty
// standard amino acids weigh nothing; sequences are sanitized at load.
const MONOISOTOPIC_RESIDUE_MASSES: [f64; 26] = [
    71.03711381,  // A
    0.0,          // B
    103.00918496, // C
    115.02694303, // D
    129.04259309, // E
    147.06841391, // F
    57.02146374,  // G
    137.05891186, // H
    113.08406398, // I
    0.0,          // J
    128.09496302, // K
    113.08406398, // L
    131.04048509, // M
    114.04292744, // N
    0.0,          // O
    97.05276385,  // P
    128.05857751, // Q
    156.10111103, // R
    87.03202841,  // S
    101.04767847, // T
    0.0,          // U
    99.06841391,  // V
    186.07931296, // W
    0.0,          // X
    163.06332853, // Y
    0.0,          // Z
];

const AVERAGE_RESIDUE_MASSES: [f64; 26] = [
    71.0779,  // A
    0.0,      // B
    103.1429, // C
    115.0874, // D
    129.114,  // E
    147.1739, // F
    57.0513,  // G
    137.1393, // H
    113.1576, // I
    0.0,      // J
    128.1723, // K
    113.1576, // L
    131.1961, // M
    114.1026, // N
    0.0,      // O
    97.1152,  // P
    128.1292, // Q
    156.1857, // R
    87.0773,  // S
    101.1039, // T
    0.0,      // U
    99.1311,  // V
    186.2099, // W
    0.0,      // X
    163.1733, // Y
    0.0,      // Z
];

/// Residue letters this crate knows masses for.
pub const STANDARD_RESIDUES: &str = "ACDEFGHIKLMNPQRSTVWY";

#[inline]
pub fn residue_mass(residue: u8, mass_type: MassType) -> f64 {
    if !residue.is_ascii_uppercase() {
        return 0.0;
    }
    let index = (residue - b'A') as usize;
    match mass_type {
        MassType::Monoisotopic => MONOISOTOPIC_RESIDUE_MASSES[index],
        MassType::Average => AVERAGE_RESIDUE_MASSES[index],
    }
}

pub fn is_standard_residue(residue: u8) -> bool {
    STANDARD_RESIDUES.as_bytes().contains(&residue)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IonSeriesTerminality {
    NTerm,
    CTerm,
}

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductType {
    b,
    c,
    y,
    zdot,
}

impl ProductType {
    pub fn terminality(self) -> IonSeriesTerminality {
        match self {
            ProductType::b | ProductType::c => IonSeriesTerminality::NTerm,
            ProductType::y | ProductType::zdot => IonSeriesTerminality::CTerm,
        }
    }

    /// Mass added on top of the cumulative residue mass of the fragment.
    pub fn mass_cap(self, mass_type: MassType) -> f64 {
        match (self, mass_type) {
            (ProductType::b, _) => 0.0,
            (ProductType::c, MassType::Monoisotopic) => 17.02654910112,
            (ProductType::c, MassType::Average) => 17.03052,
            (ProductType::y, MassType::Monoisotopic) => WATER_MONOISOTOPIC_MASS,
            (ProductType::y, MassType::Average) => WATER_AVERAGE_MASS,
            (ProductType::zdot, MassType::Monoisotopic) => 1.991840552567,
            (ProductType::zdot, MassType::Average) => 1.99285,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum FragmentationMethod {
    Cid,
    #[default]
    Hcd,
    Etd,
    Ecd,
}

const COLLISIONAL_PRODUCTS: [ProductType; 2] = [ProductType::b, ProductType::y];
const ELECTRON_PRODUCTS: [ProductType; 2] = [ProductType::c, ProductType::zdot];

impl FragmentationMethod {
    pub fn product_types(self) -> &'static [ProductType] {
        match self {
            FragmentationMethod::Cid | FragmentationMethod::Hcd => &COLLISIONAL_PRODUCTS,
            FragmentationMethod::Etd | FragmentationMethod::Ecd => &ELECTRON_PRODUCTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leucine_isoleucine_isobaric() {
        assert_eq!(
            residue_mass(b'I', MassType::Monoisotopic),
            residue_mass(b'L', MassType::Monoisotopic)
        );
        assert_eq!(
            residue_mass(b'I', MassType::Average),
            residue_mass(b'L', MassType::Average)
        );
    }

    #[test]
    fn test_non_standard_residues_are_massless() {
        assert_eq!(residue_mass(b'X', MassType::Monoisotopic), 0.0);
        assert_eq!(residue_mass(b'a', MassType::Monoisotopic), 0.0);
        assert!(!is_standard_residue(b'B'));
        assert!(is_standard_residue(b'W'));
    }

    #[test]
    fn test_every_standard_residue_has_a_mass() {
        for residue in STANDARD_RESIDUES.bytes() {
            assert!(residue_mass(residue, MassType::Monoisotopic) > 50.0);
            assert!(residue_mass(residue, MassType::Average) > 50.0);
        }
    }

    #[test]
    fn test_product_types_per_fragmentation() {
        assert_eq!(
            FragmentationMethod::Hcd.product_types(),
            &[ProductType::b, ProductType::y]
        );
        assert_eq!(
            FragmentationMethod::Etd.product_types(),
            &[ProductType::c, ProductType::zdot]
        );
        assert_eq!(
            ProductType::zdot.terminality(),
            IonSeriesTerminality::CTerm
        );
    }

    #[test]
    fn test_fragmentation_serde() {
        let method: FragmentationMethod = serde_json::from_str("\"ETD\"").unwrap();
        assert_eq!(method, FragmentationMethod::Etd);
    }
}
