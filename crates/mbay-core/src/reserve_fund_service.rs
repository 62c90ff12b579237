//! Reserve fund contributions broken down by component and asset category.

use mbay_domain::{
    Area, AreaUnit, BillingPeriod, CalculationKind, PropertyType, ServiceChargeCalculation,
    SQM_TO_SQFT,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    rates::{RateTable, ReserveComponent},
    service_charge_service::ChargeRequest,
    CoreError,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAmount {
    pub category: String,
    pub amount: f64,
}

/// One component's share of a unit's reserve fund contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionLine {
    pub component: ReserveComponent,
    pub name: String,
    /// Escalated rate in OMR per table area unit.
    pub rate_applied: f64,
    /// Billed area in the table's area unit.
    pub area: f64,
    pub contribution: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<CategoryAmount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReserveFundQuote {
    pub zone_code: String,
    pub zone_name: String,
    pub property_type: PropertyType,
    pub year: i32,
    pub bua: Area,
    pub area_unit: AreaUnit,
    /// `bua` expressed in `area_unit`.
    pub area: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,
    pub breakdown: Vec<ContributionLine>,
    pub subtotal: f64,
    pub vat: f64,
    pub total_annual: f64,
    pub quarterly: f64,
    pub monthly: f64,
}

impl ReserveFundQuote {
    pub fn line(&self, component: ReserveComponent) -> Option<&ContributionLine> {
        self.breakdown.iter().find(|line| line.component == component)
    }

    pub fn to_record(&self) -> ServiceChargeCalculation {
        let mut record = ServiceChargeCalculation::new(
            CalculationKind::ReserveFund,
            self.zone_code.clone(),
            self.year,
            self.bua,
        );
        record.property_id = self.property_id.clone();
        record.reserve_rate = self.subtotal / self.bua.square_metres();
        record.reserve_contribution = self.subtotal;
        record.vat = self.vat;
        record.set_total_annual(self.total_annual);
        record
    }
}

pub struct ReserveFundService;

impl ReserveFundService {
    /// Per-component contributions for a unit. Zero-rate components are skipped.
    pub fn contributions(
        table: &RateTable,
        request: &ChargeRequest,
    ) -> Result<Vec<ContributionLine>, CoreError> {
        table.validate_year(request.year)?;
        let zone = table.zone(&request.zone_code)?;
        let area = request.bua.in_unit(table.area_unit);

        let lines: Vec<ContributionLine> = table
            .components_for(&zone.code, request.property_type)
            .filter(|component| component.rate > 0.0)
            .map(|component| {
                let rate_applied = table.adjusted_rate(component.rate, request.year);
                let contribution = rate_applied * area;
                ContributionLine {
                    component: component.component,
                    name: component.label.clone(),
                    rate_applied,
                    area,
                    contribution,
                    categories: component
                        .categories
                        .iter()
                        .map(|share| CategoryAmount {
                            category: share.category.clone(),
                            amount: contribution * share.share,
                        })
                        .collect(),
                }
            })
            .collect();

        if lines.is_empty() {
            warn!(zone = %zone.code, property_type = %request.property_type, "no reserve fund rate");
            return Err(CoreError::RateNotFound {
                zone: zone.code.clone(),
                property_type: request.property_type.to_string(),
            });
        }
        Ok(lines)
    }

    /// Annual reserve fund contribution with instalments. VAT is excluded unless requested.
    pub fn quote(table: &RateTable, request: &ChargeRequest) -> Result<ReserveFundQuote, CoreError> {
        let breakdown = Self::contributions(table, request)?;
        let zone = table.zone(&request.zone_code)?;
        let subtotal: f64 = breakdown.iter().map(|line| line.contribution).sum();
        let vat = if request.include_vat.unwrap_or(false) {
            subtotal * table.vat_rate
        } else {
            0.0
        };
        let total_annual = subtotal + vat;
        debug!(
            table = %table.name,
            zone = %zone.code,
            property_type = %request.property_type,
            year = request.year,
            total = total_annual,
            "reserve fund quoted"
        );

        Ok(ReserveFundQuote {
            zone_code: zone.code.clone(),
            zone_name: zone.name.clone(),
            property_type: request.property_type,
            year: request.year,
            bua: request.bua,
            area_unit: table.area_unit,
            area: request.bua.in_unit(table.area_unit),
            property_id: request.property_id.clone(),
            breakdown,
            subtotal,
            vat,
            total_annual,
            quarterly: BillingPeriod::Quarterly.split(total_annual),
            monthly: BillingPeriod::Monthly.split(total_annual),
        })
    }

    /// Escalated reserve rate expressed per square metre, whatever the table's area unit.
    pub fn rate_per_sqm(
        table: &RateTable,
        zone_code: &str,
        property_type: PropertyType,
        year: i32,
    ) -> Result<f64, CoreError> {
        table.validate_year(year)?;
        let zone = table.zone(zone_code)?;
        let rate: f64 = table
            .components_for(&zone.code, property_type)
            .map(|component| table.adjusted_rate(component.rate, year))
            .sum();
        Ok(match table.area_unit {
            AreaUnit::SquareMetre => rate,
            AreaUnit::SquareFoot => rate * SQM_TO_SQFT,
        })
    }
}
