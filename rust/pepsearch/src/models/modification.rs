use crate::chemistry::MassType;
use crate::errors::SearchError;
use serde::{
    Deserialize,
    Serialize,
};

/// Where on a polymer a modification can sit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ModificationType {
    ProteinNTerminus,
    PeptideNTerminus,
    Residue,
    PeptideCTerminus,
    ProteinCTerminus,
}

/// A chemical modification as configured by the user.
///
/// `residue: None` is the wildcard: a residue modification without a target
/// applies to every residue, a terminus modification without a target
/// applies whatever the terminal residue is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Modification {
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ModificationType,
    #[serde(default)]
    pub residue: Option<char>,
    pub monoisotopic_mass_shift: f64,
    pub average_mass_shift: f64,
}

impl Modification {
    pub fn new(
        description: impl Into<String>,
        kind: ModificationType,
        residue: Option<char>,
        monoisotopic_mass_shift: f64,
        average_mass_shift: f64,
    ) -> Self {
        Self {
            description: description.into(),
            kind,
            residue,
            monoisotopic_mass_shift,
            average_mass_shift,
        }
    }

    #[inline]
    pub fn mass_shift(&self, mass_type: MassType) -> f64 {
        match mass_type {
            MassType::Monoisotopic => self.monoisotopic_mass_shift,
            MassType::Average => self.average_mass_shift,
        }
    }

    /// True if this modification may sit on `residue`.
    #[inline]
    pub fn targets(&self, residue: u8) -> bool {
        match self.residue {
            None => true,
            Some(target) => target as u32 == residue as u32,
        }
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if self.description.is_empty() {
            return Err(SearchError::config("modification with an empty description"));
        }
        if !self.monoisotopic_mass_shift.is_finite() || !self.average_mass_shift.is_finite() {
            return Err(SearchError::config(format!(
                "modification '{}' has a non-finite mass shift",
                self.description
            )));
        }
        if let Some(target) = self.residue {
            if !target.is_ascii_uppercase() {
                return Err(SearchError::config(format!(
                    "modification '{}' targets '{}', expected an uppercase residue letter",
                    self.description, target
                )));
            }
        }
        Ok(())
    }
}

pub fn validate_modifications(modifications: &[Modification]) -> Result<(), SearchError> {
    modifications.iter().try_for_each(Modification::validate)
}
