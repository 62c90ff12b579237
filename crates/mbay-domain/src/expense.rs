//! Operating expenses that feed the service-charge allocation.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::common::*;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ExpenseStatus {
    #[default]
    Active,
    Pending,
    Expired,
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExpenseStatus::Active => "Active",
            ExpenseStatus::Pending => "Pending",
            ExpenseStatus::Expired => "Expired",
        };
        f.write_str(label)
    }
}

impl FromStr for ExpenseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "active" => Ok(ExpenseStatus::Active),
            "pending" => Ok(ExpenseStatus::Pending),
            "expired" => Ok(ExpenseStatus::Expired),
            other => Err(format!("unknown expense status `{other}`")),
        }
    }
}

/// A contracted operating cost of the development.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperatingExpense {
    pub id: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub service_provider: String,
    #[serde(default)]
    pub service_type: String,
    pub monthly_cost: f64,
    pub annual_cost: f64,
    /// Free-form allocation method, e.g. "BUA" or "Lift units only".
    #[serde(default)]
    pub allocation: String,
    #[serde(default)]
    pub status: ExpenseStatus,
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl OperatingExpense {
    /// Builds an expense from its annual cost; the monthly figure is derived.
    pub fn annual(
        id: impl Into<String>,
        category: impl Into<String>,
        service_provider: impl Into<String>,
        annual_cost: f64,
        year: i32,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            description: String::new(),
            service_provider: service_provider.into(),
            service_type: String::new(),
            monthly_cost: BillingPeriod::Monthly.split(annual_cost),
            annual_cost,
            allocation: "BUA".into(),
            status: ExpenseStatus::Active,
            year,
            notes: None,
        }
    }

    pub fn with_status(mut self, status: ExpenseStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_allocation(mut self, allocation: impl Into<String>) -> Self {
        self.allocation = allocation.into();
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == ExpenseStatus::Active
    }

    /// Lift and elevator maintenance is only billed to units with lift access.
    /// Matches whole words of the category, so "Forklift Rental" is not a lift cost.
    pub fn is_lift_related(&self) -> bool {
        self.category
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|word| LIFT_WORDS.iter().any(|lift| word.eq_ignore_ascii_case(lift)))
    }
}

const LIFT_WORDS: [&str; 4] = ["lift", "lifts", "elevator", "elevators"];

impl Displayable for OperatingExpense {
    fn display_label(&self) -> String {
        format!("{} ({})", self.category, self.service_provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lift_detection_is_case_insensitive() {
        let lift = OperatingExpense::annual("e1", "Lift Maintenance", "Otis", 1200.0, 2025);
        let elevator = OperatingExpense::annual("e2", "ELEVATOR service", "Kone", 600.0, 2025);
        let cleaning = OperatingExpense::annual("e3", "Cleaning", "Tadoom", 900.0, 2025);
        assert!(lift.is_lift_related());
        assert!(elevator.is_lift_related());
        assert!(!cleaning.is_lift_related());
    }

    #[test]
    fn lift_detection_ignores_words_that_only_contain_lift() {
        for category in ["Forklift Rental", "Uplift Works", "Airlift", "Elevated Tank Cleaning"] {
            let expense = OperatingExpense::annual("e1", category, "Acme", 1200.0, 2025);
            assert!(!expense.is_lift_related(), "{category}");
        }
        let plural = OperatingExpense::annual("e2", "Lifts & Escalators", "Kone", 1200.0, 2025);
        assert!(plural.is_lift_related());
    }

    #[test]
    fn annual_constructor_derives_monthly_cost() {
        let expense = OperatingExpense::annual("e1", "Security", "G4S", 2400.0, 2025);
        assert_eq!(expense.monthly_cost, 200.0);
        assert!(expense.is_active());
    }
}
