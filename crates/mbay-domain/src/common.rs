//! Shared traits, area measurements, and billing enums.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Square metre to square foot conversion factor used by the reserve fund study.
pub const SQM_TO_SQFT: f64 = 10.7639;

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Unit in which a rate table quotes its per-area rates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AreaUnit {
    #[default]
    SquareMetre,
    SquareFoot,
}

impl fmt::Display for AreaUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AreaUnit::SquareMetre => "sqm",
            AreaUnit::SquareFoot => "sqft",
        };
        f.write_str(label)
    }
}

/// A validated built-up area, stored in square metres.
///
/// Construction rejects zero, negative, and non-finite values, so every `Area`
/// in the system is a usable billing basis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(try_from = "f64", into = "f64")]
pub struct Area(f64);

impl Area {
    pub fn sqm(value: f64) -> Result<Self, AreaError> {
        if !value.is_finite() {
            return Err(AreaError::NotFinite);
        }
        if value <= 0.0 {
            return Err(AreaError::NonPositive(value));
        }
        Ok(Self(value))
    }

    pub fn square_metres(self) -> f64 {
        self.0
    }

    pub fn square_feet(self) -> f64 {
        self.0 * SQM_TO_SQFT
    }

    /// Returns the area expressed in `unit`.
    pub fn in_unit(self, unit: AreaUnit) -> f64 {
        match unit {
            AreaUnit::SquareMetre => self.square_metres(),
            AreaUnit::SquareFoot => self.square_feet(),
        }
    }
}

impl TryFrom<f64> for Area {
    type Error = AreaError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Area::sqm(value)
    }
}

impl From<Area> for f64 {
    fn from(area: Area) -> Self {
        area.0
    }
}

impl FromStr for Area {
    type Err = AreaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: f64 = trimmed
            .parse()
            .map_err(|_| AreaError::NotANumber(trimmed.to_string()))?;
        Area::sqm(value)
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} sqm", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AreaError {
    NotANumber(String),
    NonPositive(f64),
    NotFinite,
}

impl fmt::Display for AreaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AreaError::NotANumber(raw) => write!(f, "BUA `{raw}` is not a number"),
            AreaError::NonPositive(value) => {
                write!(f, "BUA must be greater than 0 (got {value})")
            }
            AreaError::NotFinite => f.write_str("BUA must be a finite number"),
        }
    }
}

impl std::error::Error for AreaError {}

/// Billing cadences an annual amount can be split into.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BillingPeriod {
    Annual,
    Quarterly,
    Monthly,
}

impl BillingPeriod {
    /// Number of instalments per year.
    pub fn per_year(self) -> u32 {
        match self {
            BillingPeriod::Annual => 1,
            BillingPeriod::Quarterly => 4,
            BillingPeriod::Monthly => 12,
        }
    }

    /// Splits an annual amount by plain division; no remainder distribution.
    pub fn split(self, annual: f64) -> f64 {
        annual / self.per_year() as f64
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BillingPeriod::Annual => "Annual",
            BillingPeriod::Quarterly => "Quarterly",
            BillingPeriod::Monthly => "Monthly",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_rejects_non_positive_values() {
        assert_eq!(Area::sqm(0.0), Err(AreaError::NonPositive(0.0)));
        assert_eq!(Area::sqm(-5.0), Err(AreaError::NonPositive(-5.0)));
        assert_eq!(Area::sqm(f64::NAN), Err(AreaError::NotFinite));
    }

    #[test]
    fn area_parses_and_converts() {
        let area: Area = " 199.00 ".parse().expect("valid area");
        assert_eq!(area.square_metres(), 199.0);
        assert!((area.square_feet() - 199.0 * SQM_TO_SQFT).abs() < 1e-9);
        assert!(matches!("abc".parse::<Area>(), Err(AreaError::NotANumber(_))));
    }

    #[test]
    fn area_deserialization_is_validated() {
        let ok: Area = serde_json::from_str("79.5").unwrap();
        assert_eq!(ok.square_metres(), 79.5);
        assert!(serde_json::from_str::<Area>("0").is_err());
    }

    #[test]
    fn billing_period_splits_by_plain_division() {
        assert_eq!(BillingPeriod::Monthly.split(120.0), 10.0);
        assert_eq!(BillingPeriod::Quarterly.split(100.0), 25.0);
        assert_eq!(BillingPeriod::Annual.split(7.5), 7.5);
    }
}
