//! Derived calculation records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

/// Which calculator produced a record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CalculationKind {
    #[default]
    ServiceCharge,
    ReserveFund,
    ExpenseAllocation,
}

impl std::fmt::Display for CalculationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            CalculationKind::ServiceCharge => "service-charge",
            CalculationKind::ReserveFund => "reserve-fund",
            CalculationKind::ExpenseAllocation => "expense-allocation",
        };
        f.write_str(label)
    }
}

/// Snapshot of a single calculation, suitable for persisting as history.
///
/// The record is derived data: it is rebuilt on every request and saved only
/// when the user asks for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceChargeCalculation {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,
    pub calculated_at: DateTime<Utc>,
    #[serde(default)]
    pub kind: CalculationKind,
    pub zone_code: String,
    pub year: i32,
    /// Property size in square metres.
    pub property_size: f64,
    pub has_lift_access: bool,
    pub base_rate: f64,
    pub lift_rate: f64,
    pub reserve_rate: f64,
    pub operating_share: f64,
    pub lift_share: f64,
    pub reserve_contribution: f64,
    #[serde(default)]
    pub vat: f64,
    pub total_annual: f64,
    pub quarterly: f64,
    pub monthly: f64,
}

impl ServiceChargeCalculation {
    /// Creates an empty record for `zone_code`; amounts are filled by the calculators.
    pub fn new(kind: CalculationKind, zone_code: impl Into<String>, year: i32, size: Area) -> Self {
        Self {
            id: Uuid::new_v4(),
            property_id: None,
            calculated_at: Utc::now(),
            kind,
            zone_code: zone_code.into(),
            year,
            property_size: size.square_metres(),
            has_lift_access: false,
            base_rate: 0.0,
            lift_rate: 0.0,
            reserve_rate: 0.0,
            operating_share: 0.0,
            lift_share: 0.0,
            reserve_contribution: 0.0,
            vat: 0.0,
            total_annual: 0.0,
            quarterly: 0.0,
            monthly: 0.0,
        }
    }

    /// Sets the annual total and derives the quarterly and monthly instalments.
    pub fn set_total_annual(&mut self, total_annual: f64) {
        self.total_annual = total_annual;
        self.quarterly = BillingPeriod::Quarterly.split(total_annual);
        self.monthly = BillingPeriod::Monthly.split(total_annual);
    }

    pub fn for_property(mut self, property_id: impl Into<String>) -> Self {
        self.property_id = Some(property_id.into());
        self
    }
}

impl Displayable for ServiceChargeCalculation {
    fn display_label(&self) -> String {
        let subject = self
            .property_id
            .clone()
            .unwrap_or_else(|| format!("zone {}", self.zone_code));
        format!("{} {} ({})", self.kind, subject, self.year)
    }
}

/// Named, ordered collection of saved calculations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalculationHistory {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub records: Vec<ServiceChargeCalculation>,
}

impl CalculationHistory {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            created_at: now,
            updated_at: now,
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: ServiceChargeCalculation) -> Uuid {
        let id = record.id;
        self.records.push(record);
        self.touch();
        id
    }

    pub fn remove(&mut self, id: Uuid) -> Option<ServiceChargeCalculation> {
        let index = self.records.iter().position(|record| record.id == id)?;
        let removed = self.records.remove(index);
        self.touch();
        Some(removed)
    }

    pub fn latest(&self) -> Option<&ServiceChargeCalculation> {
        self.records.iter().max_by_key(|record| record.calculated_at)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_annual_derives_instalments() {
        let mut record = ServiceChargeCalculation::new(
            CalculationKind::ServiceCharge,
            "3",
            2025,
            Area::sqm(100.0).unwrap(),
        );
        record.set_total_annual(1200.0);
        assert_eq!(record.quarterly, 300.0);
        assert_eq!(record.monthly, 100.0);
    }

    #[test]
    fn record_round_trips_through_json() {
        let record = ServiceChargeCalculation::new(
            CalculationKind::ReserveFund,
            "5",
            2026,
            Area::sqm(498.0).unwrap(),
        )
        .for_property("Z5-001");
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"kind\":\"reserve_fund\""));
        let back: ServiceChargeCalculation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn history_tracks_and_removes_records() {
        let mut history = CalculationHistory::new("default");
        let record = ServiceChargeCalculation::new(
            CalculationKind::ServiceCharge,
            "8",
            2025,
            Area::sqm(750.0).unwrap(),
        );
        let id = history.push(record);
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest().map(|r| r.id), Some(id));
        assert!(history.remove(id).is_some());
        assert!(history.is_empty());
        assert!(history.remove(id).is_none());
    }
}
