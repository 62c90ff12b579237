//! Zone-rate service charge calculator.

use mbay_domain::{
    Area, BillingPeriod, CalculationKind, PropertyType, PropertyUnit, ServiceChargeCalculation,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    rates::RateTable,
    reserve_fund_service::{ContributionLine, ReserveFundService},
    CoreError,
};

/// Everything a calculator needs to price one unit for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeRequest {
    pub zone_code: String,
    pub property_type: PropertyType,
    pub bua: Area,
    pub year: i32,
    #[serde(default)]
    pub has_lift: bool,
    #[serde(default)]
    pub include_reserve: bool,
    /// `None` keeps the calculator's own default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_vat: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,
}

impl ChargeRequest {
    pub fn new(
        zone_code: impl Into<String>,
        property_type: PropertyType,
        bua: Area,
        year: i32,
    ) -> Self {
        Self {
            zone_code: zone_code.into().trim().to_string(),
            property_type,
            bua,
            year,
            has_lift: false,
            include_reserve: false,
            include_vat: None,
            property_id: None,
        }
    }

    /// Builds a request from an unvalidated BUA figure.
    pub fn from_raw(
        zone_code: impl Into<String>,
        property_type: PropertyType,
        bua: f64,
        year: i32,
    ) -> Result<Self, CoreError> {
        Ok(Self::new(zone_code, property_type, Area::sqm(bua)?, year))
    }

    /// Prices a registered unit; its lift flag and id carry over.
    pub fn for_unit(unit: &PropertyUnit, year: i32) -> Self {
        Self {
            has_lift: unit.has_lift,
            property_id: Some(unit.id.clone()),
            ..Self::new(unit.zone_code.clone(), unit.property_type, unit.bua, year)
        }
    }

    pub fn with_lift(mut self, has_lift: bool) -> Self {
        self.has_lift = has_lift;
        self
    }

    pub fn with_reserve(mut self, include_reserve: bool) -> Self {
        self.include_reserve = include_reserve;
        self
    }

    pub fn with_vat(mut self, include_vat: bool) -> Self {
        self.include_vat = Some(include_vat);
        self
    }
}

/// Charge components for one billing period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChargeAmounts {
    pub base_charge: f64,
    pub lift_charge: f64,
    pub reserve_fund: f64,
    pub vat: f64,
    pub total: f64,
}

impl ChargeAmounts {
    /// Divides every component of an annual figure into `period` instalments.
    pub fn scaled(&self, period: BillingPeriod) -> Self {
        Self {
            base_charge: period.split(self.base_charge),
            lift_charge: period.split(self.lift_charge),
            reserve_fund: period.split(self.reserve_fund),
            vat: period.split(self.vat),
            total: period.split(self.total),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceChargeQuote {
    pub request: ChargeRequest,
    pub zone_name: String,
    /// Escalated service rate in OMR per square metre.
    pub service_rate: f64,
    pub lift_rate: f64,
    /// Escalated reserve fund rate in OMR per square metre; 0 when not included.
    pub reserve_rate: f64,
    pub annual: ChargeAmounts,
    pub quarterly: ChargeAmounts,
    pub monthly: ChargeAmounts,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reserve_breakdown: Vec<ContributionLine>,
}

impl ServiceChargeQuote {
    pub fn amounts(&self, period: BillingPeriod) -> &ChargeAmounts {
        match period {
            BillingPeriod::Annual => &self.annual,
            BillingPeriod::Quarterly => &self.quarterly,
            BillingPeriod::Monthly => &self.monthly,
        }
    }

    pub fn to_record(&self) -> ServiceChargeCalculation {
        let request = &self.request;
        let mut record = ServiceChargeCalculation::new(
            CalculationKind::ServiceCharge,
            request.zone_code.clone(),
            request.year,
            request.bua,
        );
        record.property_id = request.property_id.clone();
        record.has_lift_access = request.has_lift;
        record.base_rate = self.service_rate;
        record.lift_rate = self.lift_rate;
        record.reserve_rate = self.reserve_rate;
        record.operating_share = self.annual.base_charge;
        record.lift_share = self.annual.lift_charge;
        record.reserve_contribution = self.annual.reserve_fund;
        record.vat = self.annual.vat;
        record.set_total_annual(self.annual.total);
        record
    }
}

pub struct ServiceChargeService;

impl ServiceChargeService {
    /// Prices `request` against the zone's service rate.
    ///
    /// VAT is added unless the request opts out. Lift maintenance is charged at
    /// the table's flat lift rate, which does not escalate.
    pub fn quote(table: &RateTable, request: &ChargeRequest) -> Result<ServiceChargeQuote, CoreError> {
        table.validate_year(request.year)?;
        let zone = table.zone(&request.zone_code)?;
        let quoted = table.service_rate(&zone.code, request.property_type)?;
        let area = request.bua.square_metres();

        let service_rate = table.adjusted_rate(quoted.rate, request.year);
        let base_charge = service_rate * area;
        let lift_rate = if request.has_lift { table.lift_rate } else { 0.0 };
        let lift_charge = lift_rate * area;

        let (reserve_breakdown, reserve_fund) = if request.include_reserve {
            let lines = ReserveFundService::contributions(table, request)?;
            let total: f64 = lines.iter().map(|line| line.contribution).sum();
            (lines, total)
        } else {
            (Vec::new(), 0.0)
        };
        let reserve_rate = if reserve_fund > 0.0 { reserve_fund / area } else { 0.0 };

        let subtotal = base_charge + lift_charge + reserve_fund;
        let vat = if request.include_vat.unwrap_or(true) {
            subtotal * table.vat_rate
        } else {
            0.0
        };
        let annual = ChargeAmounts {
            base_charge,
            lift_charge,
            reserve_fund,
            vat,
            total: subtotal + vat,
        };
        debug!(
            zone = %zone.code,
            property_type = %request.property_type,
            year = request.year,
            total = annual.total,
            "service charge quoted"
        );

        Ok(ServiceChargeQuote {
            request: request.clone(),
            zone_name: zone.name.clone(),
            service_rate,
            lift_rate,
            reserve_rate,
            annual,
            quarterly: annual.scaled(BillingPeriod::Quarterly),
            monthly: annual.scaled(BillingPeriod::Monthly),
            reserve_breakdown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(zone: &str, property_type: PropertyType, bua: f64) -> ChargeRequest {
        ChargeRequest::from_raw(zone, property_type, bua, 2025).unwrap()
    }

    #[test]
    fn base_charge_uses_zone_rate_and_vat() {
        let table = RateTable::rfs_2025();
        let quote = ServiceChargeService::quote(&table, &request("5", PropertyType::Villa, 100.0))
            .unwrap();
        assert!((quote.annual.base_charge - 698.0).abs() < 1e-9);
        assert!((quote.annual.vat - 34.9).abs() < 1e-9);
        assert!((quote.annual.total - 732.9).abs() < 1e-9);
        assert_eq!(quote.annual.lift_charge, 0.0);
    }

    #[test]
    fn lift_charge_is_flat_and_not_escalated() {
        let table = RateTable::rfs_2025();
        let req = ChargeRequest::from_raw("3", PropertyType::Apartment, 100.0, 2030)
            .unwrap()
            .with_lift(true)
            .with_vat(false);
        let quote = ServiceChargeService::quote(&table, &req).unwrap();
        assert!((quote.annual.lift_charge - 15.0).abs() < 1e-9);
        assert_eq!(quote.annual.vat, 0.0);
    }

    #[test]
    fn reserve_fund_can_be_folded_in() {
        let table = RateTable::rfs_2025();
        let req = request("3", PropertyType::Apartment, 199.0)
            .with_reserve(true)
            .with_vat(false);
        let quote = ServiceChargeService::quote(&table, &req).unwrap();
        assert!((quote.annual.reserve_fund - 764.16).abs() < 1e-6);
        assert_eq!(quote.reserve_breakdown.len(), 3);
        assert!((quote.reserve_rate - 3.84).abs() < 1e-9);
    }

    #[test]
    fn commercial_zone_has_no_service_rate() {
        let table = RateTable::rfs_2025();
        let err = ServiceChargeService::quote(&table, &request("2", PropertyType::Commercial, 150.0))
            .unwrap_err();
        assert!(matches!(err, CoreError::RateNotFound { .. }));
    }

    #[test]
    fn record_carries_amounts() {
        let table = RateTable::rfs_2025();
        let unit = table_unit();
        let quote = ServiceChargeService::quote(&table, &ChargeRequest::for_unit(&unit, 2025)).unwrap();
        let record = quote.to_record();
        assert_eq!(record.property_id.as_deref(), Some("Z3-044-1"));
        assert!(record.has_lift_access);
        assert!((record.total_annual - quote.annual.total).abs() < 1e-12);
        assert!((record.monthly * 12.0 - record.total_annual).abs() < 1e-9);
    }

    fn table_unit() -> PropertyUnit {
        crate::UnitRegistry::builtin()
            .require("Z3-044-1")
            .cloned()
            .unwrap()
    }
}
