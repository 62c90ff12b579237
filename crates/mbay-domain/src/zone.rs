//! Development zones and their reference rates.

use serde::{Deserialize, Serialize};

use crate::common::*;

/// Code of the master-community pseudo zone covering shared infrastructure.
pub const MASTER_COMMUNITY_CODE: &str = "MC";

/// Geographic/administrative subdivision of the development.
///
/// Zone records are reference data for a given year and are never mutated by
/// calculations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Zone {
    pub code: String,
    pub name: String,
    /// Total built-up area across the zone, in square metres.
    pub total_bua: f64,
    pub unit_count: u32,
    /// Annual service charge in OMR per square metre.
    pub service_charge_rate: f64,
    /// Reserve fund contribution in OMR per square metre.
    pub reserve_fund_rate: f64,
}

impl Zone {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            total_bua: 0.0,
            unit_count: 0,
            service_charge_rate: 0.0,
            reserve_fund_rate: 0.0,
        }
    }

    pub fn with_totals(mut self, total_bua: f64, unit_count: u32) -> Self {
        self.total_bua = total_bua;
        self.unit_count = unit_count;
        self
    }

    pub fn with_rates(mut self, service_charge_rate: f64, reserve_fund_rate: f64) -> Self {
        self.service_charge_rate = service_charge_rate;
        self.reserve_fund_rate = reserve_fund_rate;
        self
    }

    /// Compares a user-supplied code against this zone, ignoring case and padding.
    pub fn matches_code(&self, code: &str) -> bool {
        self.code.eq_ignore_ascii_case(code.trim())
    }
}

impl Displayable for Zone {
    fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.code)
    }
}
