//! Rate tables and the annual escalation rule.
//!
//! A [`RateTable`] is the single parameter of every calculator in this crate.
//! Rates are quoted for `quoted_year` and normalised back to `base_year`, so
//! `adjusted_rate(year) = base_rate × (1 + escalation)^(year - base_year)` holds
//! for every component regardless of the year the source document used.

use mbay_domain::{AreaUnit, PropertyType, Zone};
use serde::{Deserialize, Serialize};

use crate::{reference, CoreError};

pub const BASE_YEAR: i32 = 2021;
pub const ANNUAL_ESCALATION: f64 = 0.005;
pub const VAT_RATE: f64 = 0.05;
pub const LIFT_RATE: f64 = 0.15;

pub const RFS_2025_TABLE: &str = "rfs-2025";
pub const RFS_2021_SQFT_TABLE: &str = "rfs-2021-sqft";

/// Reserve fund categories a contribution can be attributed to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReserveComponent {
    MasterCommunity,
    Zone,
    TypicalBuilding,
}

impl std::fmt::Display for ReserveComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ReserveComponent::MasterCommunity => "Master Community",
            ReserveComponent::Zone => "Zone",
            ReserveComponent::TypicalBuilding => "Typical Building",
        };
        f.write_str(label)
    }
}

/// Share of a component's contribution earmarked for an asset category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryShare {
    pub category: String,
    pub share: f64,
}

impl CategoryShare {
    pub fn new(category: impl Into<String>, share: f64) -> Self {
        Self {
            category: category.into(),
            share,
        }
    }
}

/// One per-area reserve fund rate and the units it applies to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentRate {
    pub component: ReserveComponent,
    pub label: String,
    /// Rate in OMR per table area unit, quoted for the table's `quoted_year`.
    pub rate: f64,
    /// Restricts the component to one zone; `None` applies it everywhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_zones: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<PropertyType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<CategoryShare>,
}

impl ComponentRate {
    pub fn new(component: ReserveComponent, label: impl Into<String>, rate: f64) -> Self {
        Self {
            component,
            label: label.into(),
            rate,
            zone: None,
            excluded_zones: Vec::new(),
            property_type: None,
            categories: Vec::new(),
        }
    }

    pub fn for_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    pub fn excluding(mut self, zone: impl Into<String>) -> Self {
        self.excluded_zones.push(zone.into());
        self
    }

    pub fn for_property_type(mut self, property_type: PropertyType) -> Self {
        self.property_type = Some(property_type);
        self
    }

    pub fn with_categories(mut self, categories: Vec<CategoryShare>) -> Self {
        self.categories = categories;
        self
    }

    pub fn applies(&self, zone_code: &str, property_type: PropertyType) -> bool {
        let zone_matches = match &self.zone {
            Some(zone) => zone.eq_ignore_ascii_case(zone_code),
            None => !self
                .excluded_zones
                .iter()
                .any(|excluded| excluded.eq_ignore_ascii_case(zone_code)),
        };
        let type_matches = self
            .property_type
            .map(|wanted| wanted == property_type)
            .unwrap_or(true);
        zone_matches && type_matches
    }
}

/// Annual service charge rate for a (zone, property type) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceRate {
    pub zone: String,
    pub property_type: PropertyType,
    /// OMR per square metre per year, quoted for the table's `quoted_year`.
    pub rate: f64,
}

impl ServiceRate {
    pub fn new(zone: impl Into<String>, property_type: PropertyType, rate: f64) -> Self {
        Self {
            zone: zone.into(),
            property_type,
            rate,
        }
    }
}

/// Reference rates that parameterise every calculation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateTable {
    pub name: String,
    pub base_year: i32,
    /// Year the rates below are quoted for.
    pub quoted_year: i32,
    pub escalation: f64,
    pub vat_rate: f64,
    /// Lift maintenance rate in OMR per square metre. Not escalated.
    pub lift_rate: f64,
    pub area_unit: AreaUnit,
    pub zones: Vec<Zone>,
    pub components: Vec<ComponentRate>,
    #[serde(default)]
    pub service_rates: Vec<ServiceRate>,
}

impl Default for RateTable {
    fn default() -> Self {
        Self::rfs_2025()
    }
}

impl RateTable {
    /// 2025 reserve fund rates in OMR/sqm with per-component breakdowns.
    pub fn rfs_2025() -> Self {
        let components = reference::reserve_components_2025();
        let service_rates = reference::service_rates_2025();
        let mut table = Self {
            name: RFS_2025_TABLE.into(),
            base_year: BASE_YEAR,
            quoted_year: 2025,
            escalation: ANNUAL_ESCALATION,
            vat_rate: VAT_RATE,
            lift_rate: LIFT_RATE,
            area_unit: AreaUnit::SquareMetre,
            zones: Vec::new(),
            components,
            service_rates,
        };
        table.zones = reference::zones(&table);
        table
    }

    /// The 2021 study's single per-square-foot rate per zone.
    pub fn rfs_2021_sqft() -> Self {
        let mut table = Self {
            name: RFS_2021_SQFT_TABLE.into(),
            base_year: BASE_YEAR,
            quoted_year: BASE_YEAR,
            escalation: ANNUAL_ESCALATION,
            vat_rate: VAT_RATE,
            lift_rate: LIFT_RATE,
            area_unit: AreaUnit::SquareFoot,
            zones: Vec::new(),
            components: reference::study_components_2021(),
            service_rates: Vec::new(),
        };
        table.zones = reference::zones(&table);
        table
    }

    /// Looks up one of the built-in tables by name.
    pub fn builtin(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            RFS_2025_TABLE => Some(Self::rfs_2025()),
            RFS_2021_SQFT_TABLE => Some(Self::rfs_2021_sqft()),
            _ => None,
        }
    }

    pub fn builtin_names() -> [&'static str; 2] {
        [RFS_2025_TABLE, RFS_2021_SQFT_TABLE]
    }

    pub fn zone(&self, code: &str) -> Result<&Zone, CoreError> {
        self.zones
            .iter()
            .find(|zone| zone.matches_code(code))
            .ok_or_else(|| CoreError::UnknownZone(code.trim().to_string()))
    }

    /// Rejects years before the base year; later years are unbounded.
    pub fn validate_year(&self, year: i32) -> Result<(), CoreError> {
        if year < self.base_year {
            return Err(CoreError::Validation(format!(
                "calculation year {} precedes base year {}",
                year, self.base_year
            )));
        }
        Ok(())
    }

    /// Growth multiplier between the base year and `year`.
    pub fn escalation_factor(&self, year: i32) -> f64 {
        (1.0 + self.escalation).powi(year - self.base_year)
    }

    /// Normalises a quoted rate to the base year.
    pub fn base_rate(&self, quoted_rate: f64) -> f64 {
        quoted_rate / self.escalation_factor(self.quoted_year)
    }

    /// `base_rate × (1 + escalation)^(year - base_year)`.
    pub fn adjusted_rate(&self, quoted_rate: f64, year: i32) -> f64 {
        self.base_rate(quoted_rate) * self.escalation_factor(year)
    }

    pub fn components_for(
        &self,
        zone_code: &str,
        property_type: PropertyType,
    ) -> impl Iterator<Item = &ComponentRate> + '_ {
        let zone_code = zone_code.trim().to_string();
        self.components
            .iter()
            .filter(move |component| component.applies(&zone_code, property_type))
    }

    /// Sum of the quoted reserve fund rates applying to a unit.
    pub fn reserve_rate(&self, zone_code: &str, property_type: PropertyType) -> f64 {
        self.components_for(zone_code, property_type)
            .map(|component| component.rate)
            .sum()
    }

    pub fn service_rate(
        &self,
        zone_code: &str,
        property_type: PropertyType,
    ) -> Result<&ServiceRate, CoreError> {
        let zone = self.zone(zone_code)?;
        self.service_rates
            .iter()
            .find(|rate| zone.matches_code(&rate.zone) && rate.property_type == property_type)
            .ok_or_else(|| CoreError::RateNotFound {
                zone: zone.code.clone(),
                property_type: property_type.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjusted_rate_reproduces_quoted_rate_in_quoted_year() {
        let table = RateTable::rfs_2025();
        assert!((table.adjusted_rate(1.75, 2025) - 1.75).abs() < 1e-12);
    }

    #[test]
    fn adjusted_rate_escalates_half_a_percent_per_year() {
        let table = RateTable::rfs_2025();
        for year in 2022..2040 {
            let ratio = table.adjusted_rate(0.44, year) / table.adjusted_rate(0.44, year - 1);
            assert!((ratio - 1.005).abs() < 1e-12, "year {year}: {ratio}");
        }
    }

    #[test]
    fn years_before_base_are_rejected() {
        let table = RateTable::rfs_2021_sqft();
        assert!(table.validate_year(2021).is_ok());
        assert!(matches!(
            table.validate_year(2020),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn component_applicability_respects_exclusions() {
        let master = ComponentRate::new(ReserveComponent::MasterCommunity, "MC", 1.75).excluding("1");
        assert!(master.applies("3", PropertyType::Villa));
        assert!(!master.applies("1", PropertyType::Staff));
        let building = ComponentRate::new(ReserveComponent::TypicalBuilding, "TB", 1.65)
            .for_zone("3")
            .for_property_type(PropertyType::Apartment);
        assert!(building.applies("3", PropertyType::Apartment));
        assert!(!building.applies("3", PropertyType::Villa));
        assert!(!building.applies("5", PropertyType::Apartment));
    }

    #[test]
    fn builtin_lookup_is_case_insensitive() {
        assert!(RateTable::builtin("RFS-2025").is_some());
        assert!(RateTable::builtin("rfs-2021-sqft").is_some());
        assert!(RateTable::builtin("rfs-1999").is_none());
    }
}
