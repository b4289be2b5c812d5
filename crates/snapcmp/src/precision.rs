use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("precision must be between 0.0 and 1.0, got {0}")]
pub struct InvalidPrecision(pub f64);

/// Fraction of canonical bytes that must match for two snapshots to be
/// considered the same.
///
/// `1.0` demands byte equality, `0.0` accepts any amount of difference.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Precision(f64);

impl Precision {
    pub const EXACT: Self = Self(1.0);

    pub fn new(value: f64) -> Result<Self, InvalidPrecision> {
        // NaN fails the range check too.
        if !(0.0..=1.0).contains(&value) {
            return Err(InvalidPrecision(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Whether `differing` out of `total` bytes is more than this precision allows.
    ///
    /// Checked on the matching share, so a mismatch ratio exactly at
    /// `1 - precision` is accepted even when that subtraction is inexact.
    pub fn is_exceeded_by(self, total: usize, differing: usize) -> bool {
        if total == 0 {
            return false;
        }
        let matching = total.saturating_sub(differing) as f64 / total as f64;
        matching < self.0
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self::EXACT
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for Precision {
    type Error = InvalidPrecision;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Precision> for f64 {
    fn from(p: Precision) -> Self {
        p.0
    }
}

impl FromStr for Precision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v: f64 = s.parse().map_err(|e| format!("{e}"))?;
        Self::new(v).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range() {
        assert!(Precision::new(-0.01).is_err());
        assert!(Precision::new(1.01).is_err());
        assert!(Precision::new(f64::NAN).is_err());
        assert!(Precision::new(0.0).is_ok());
        assert!(Precision::new(1.0).is_ok());
    }

    #[test]
    fn exact_precision_rejects_any_difference() {
        assert!(Precision::EXACT.is_exceeded_by(400, 1));
        assert!(!Precision::EXACT.is_exceeded_by(400, 0));
    }

    #[test]
    fn zero_precision_accepts_everything() {
        let p = Precision::new(0.0).unwrap();
        assert!(!p.is_exceeded_by(400, 400));
    }

    #[test]
    fn ratio_at_tolerance_is_accepted() {
        let p = Precision::new(0.5).unwrap();
        assert!(!p.is_exceeded_by(400, 200));
        assert!(p.is_exceeded_by(400, 201));
    }

    #[test]
    fn inexact_tolerance_boundary_is_accepted() {
        // 1.0 - 0.9 is slightly below 0.1 in f64.
        let p = Precision::new(0.9).unwrap();
        assert!(!p.is_exceeded_by(400, 40));
        assert!(p.is_exceeded_by(400, 41));

        let p = Precision::new(0.7).unwrap();
        assert!(!p.is_exceeded_by(1000, 300));
        assert!(p.is_exceeded_by(1000, 301));
    }

    #[test]
    fn parses_from_cli_string() {
        assert_eq!("0.9".parse::<Precision>().unwrap().value(), 0.9);
        let err = "2".parse::<Precision>().unwrap_err();
        assert!(err.contains("between 0.0 and 1.0"), "{err}");
        assert!("abc".parse::<Precision>().is_err());
    }

    #[test]
    fn deserializes_with_validation() {
        #[derive(Deserialize)]
        struct Wrapper {
            precision: Precision,
        }
        let ok: Wrapper = toml::from_str("precision = 0.25").unwrap();
        assert_eq!(ok.precision.value(), 0.25);
        assert!(toml::from_str::<Wrapper>("precision = 1.5").is_err());
    }
}
