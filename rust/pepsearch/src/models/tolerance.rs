use crate::errors::SearchError;
use serde::{
    Deserialize,
    Deserializer,
    Serialize,
};
use std::str::FromStr;

/// Symmetric mass tolerance.
///
/// Serialized as `{"da": 0.01}` or `{"ppm": 10.0}`; deserialization also
/// takes the string form, e.g. `"10 ppm"`. Like the rest of the
/// crate, the value is the half-width of the window: a tolerance of 1 Da on
/// a mass of 10 means the range `[9, 11]`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub enum MassTolerance {
    #[serde(rename = "da")]
    Absolute(f64),
    #[serde(rename = "ppm")]
    Ppm(f64),
}

impl MassTolerance {
    pub fn value(&self) -> f64 {
        match self {
            MassTolerance::Absolute(x) | MassTolerance::Ppm(x) => *x,
        }
    }

    /// Half-width of the window around `mass`, in daltons.
    #[inline]
    pub fn absolute_at(&self, mass: f64) -> f64 {
        match self {
            MassTolerance::Absolute(da) => *da,
            MassTolerance::Ppm(ppm) => mass * ppm / 1e6,
        }
    }

    /// Inclusive `(low, high)` window around `mass`.
    #[inline]
    pub fn mass_range(&self, mass: f64) -> (f64, f64) {
        let width = self.absolute_at(mass);
        (mass - width, mass + width)
    }

    /// Whether an observed-minus-theoretical difference is inside the
    /// tolerance. Ppm differences are relative to `theoretical`.
    #[inline]
    pub fn accepts(&self, difference: f64, theoretical: f64) -> bool {
        match self {
            MassTolerance::Absolute(da) => difference.abs() <= *da,
            MassTolerance::Ppm(ppm) => (difference / theoretical * 1e6).abs() <= *ppm,
        }
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        let value = self.value();
        if !value.is_finite() || value < 0.0 {
            return Err(SearchError::config(format!(
                "mass tolerance must be a finite non-negative number, got {:?}",
                self
            )));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
enum TaggedTolerance {
    #[serde(rename = "da")]
    Absolute(f64),
    #[serde(rename = "ppm")]
    Ppm(f64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ToleranceRepr {
    Text(String),
    Tagged(TaggedTolerance),
}

impl<'de> Deserialize<'de> for MassTolerance {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match ToleranceRepr::deserialize(deserializer)? {
            ToleranceRepr::Text(text) => text.parse().map_err(serde::de::Error::custom),
            ToleranceRepr::Tagged(TaggedTolerance::Absolute(x)) => Ok(MassTolerance::Absolute(x)),
            ToleranceRepr::Tagged(TaggedTolerance::Ppm(x)) => Ok(MassTolerance::Ppm(x)),
        }
    }
}

impl std::fmt::Display for MassTolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MassTolerance::Absolute(x) => write!(f, "{} Da", x),
            MassTolerance::Ppm(x) => write!(f, "{} ppm", x),
        }
    }
}

impl FromStr for MassTolerance {
    type Err = SearchError;

    /// Parses strings such as `"10 ppm"`, `"0.5da"` or `"0.02 Da"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s.trim_end_matches(|c: char| c.is_ascii_alphabetic()).len();
        if split == s.len() {
            return Err(SearchError::config(format!(
                "mass tolerance '{}' has no unit",
                s
            )));
        }
        let (value, unit) = s.split_at(split);
        let value: f64 = value.trim().parse()?;
        let tolerance = match unit.trim().to_lowercase().as_str() {
            "da" | "dalton" | "daltons" | "th" => MassTolerance::Absolute(value),
            "ppm" => MassTolerance::Ppm(value),
            other => {
                return Err(SearchError::config(format!(
                    "unknown mass tolerance unit '{}', expected 'da' or 'ppm'",
                    other
                )));
            }
        };
        tolerance.validate()?;
        Ok(tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ppm_range() {
        let tol = MassTolerance::Ppm(20.0);
        let (lo, hi) = tol.mass_range(500.0);
        assert!((lo - 499.99).abs() < 1e-9);
        assert!((hi - 500.01).abs() < 1e-9);
        assert!(tol.accepts(0.009, 500.0));
        assert!(!tol.accepts(-0.011, 500.0));
    }

    #[test]
    fn test_absolute_range() {
        let tol = MassTolerance::Absolute(0.5);
        assert_eq!(tol.mass_range(100.0), (99.5, 100.5));
        assert!(tol.accepts(-0.5, 1000.0));
    }

    #[test]
    fn test_parse_from_str() {
        assert_eq!("10 ppm".parse::<MassTolerance>().unwrap(), MassTolerance::Ppm(10.0));
        assert_eq!("0.5da".parse::<MassTolerance>().unwrap(), MassTolerance::Absolute(0.5));
        assert_eq!(" 0.02 Da ".parse::<MassTolerance>().unwrap(), MassTolerance::Absolute(0.02));
        assert!(matches!(
            "10 furlongs".parse::<MassTolerance>(),
            Err(SearchError::Config { .. })
        ));
        assert!("10".parse::<MassTolerance>().is_err());
        assert!("-1 ppm".parse::<MassTolerance>().is_err());
    }

    #[test]
    fn test_serde_layout() {
        let tol: MassTolerance = serde_json::from_str(r#"{"ppm": 10.0}"#).unwrap();
        assert_eq!(tol, MassTolerance::Ppm(10.0));
        assert_eq!(
            serde_json::to_string(&MassTolerance::Absolute(0.01)).unwrap(),
            r#"{"da":0.01}"#
        );
        let tol: MassTolerance = serde_json::from_str(r#""20 ppm""#).unwrap();
        assert_eq!(tol, MassTolerance::Ppm(20.0));
        assert!(serde_json::from_str::<MassTolerance>(r#""20 parsecs""#).is_err());
    }
}
