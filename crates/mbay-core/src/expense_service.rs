//! Operating-expense allocation and expense summaries.

use std::collections::BTreeMap;

use mbay_domain::{
    Area, CalculationKind, OperatingExpense, PropertyUnit, ServiceChargeCalculation, Zone,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::CoreError;

/// The unit being billed from the operating-expense ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationRequest {
    pub zone_code: String,
    pub year: i32,
    pub size: Area,
    pub has_lift: bool,
    /// Reserve fund rate in OMR per square metre.
    pub reserve_rate: f64,
    pub property_id: Option<String>,
}

impl AllocationRequest {
    pub fn new(zone_code: impl Into<String>, year: i32, size: Area) -> Self {
        Self {
            zone_code: zone_code.into(),
            year,
            size,
            has_lift: false,
            reserve_rate: 0.0,
            property_id: None,
        }
    }

    pub fn for_unit(unit: &PropertyUnit, year: i32, reserve_rate: f64) -> Self {
        Self {
            has_lift: unit.has_lift,
            reserve_rate,
            property_id: Some(unit.id.clone()),
            ..Self::new(unit.zone_code.clone(), year, unit.bua)
        }
    }

    pub fn with_lift(mut self, has_lift: bool) -> Self {
        self.has_lift = has_lift;
        self
    }

    pub fn with_reserve_rate(mut self, reserve_rate: f64) -> Self {
        self.reserve_rate = reserve_rate;
        self
    }
}

/// One expense's contribution to a unit's operating share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseBreakdownItem {
    pub expense_id: String,
    pub category: String,
    pub service_provider: String,
    pub annual_cost: f64,
    pub applicable: bool,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationResult {
    pub record: ServiceChargeCalculation,
    pub total_expenses: f64,
    pub lift_expenses: f64,
    pub portfolio_bua: f64,
    pub lift_bua: f64,
    pub breakdown: Vec<ExpenseBreakdownItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub amount: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneExpenseSummary {
    pub zone_code: String,
    pub zone_name: String,
    pub total_bua: f64,
    pub unit_count: u32,
    pub service_charge_rate: f64,
    pub total_annual_charge: f64,
    pub average_charge: f64,
}

pub struct ExpenseService;

impl ExpenseService {
    /// Spreads the active expense ledger over the portfolio by BUA.
    ///
    /// Lift and elevator expenses are spread only over units with lift access
    /// and billed only to such units.
    pub fn allocate(
        expenses: &[OperatingExpense],
        portfolio: &[PropertyUnit],
        request: &AllocationRequest,
    ) -> Result<AllocationResult, CoreError> {
        let portfolio_bua: f64 = portfolio.iter().map(|unit| unit.bua.square_metres()).sum();
        if portfolio_bua <= 0.0 {
            return Err(CoreError::Validation(
                "portfolio has no built-up area to allocate over".into(),
            ));
        }
        let lift_bua: f64 = portfolio
            .iter()
            .filter(|unit| unit.has_lift)
            .map(|unit| unit.bua.square_metres())
            .sum();

        let active: Vec<&OperatingExpense> = expenses.iter().filter(|e| e.is_active()).collect();
        let total_expenses: f64 = active.iter().map(|e| e.annual_cost).sum();
        let lift_expenses: f64 = active
            .iter()
            .filter(|e| e.is_lift_related())
            .map(|e| e.annual_cost)
            .sum();
        let non_lift = total_expenses - lift_expenses;

        let base_rate = non_lift / portfolio_bua;
        let lift_rate = if lift_bua > 0.0 {
            lift_expenses / lift_bua
        } else {
            0.0
        };

        let size = request.size.square_metres();
        let operating_share = base_rate * size;
        let lift_share = if request.has_lift { lift_rate * size } else { 0.0 };
        let reserve_contribution = request.reserve_rate * size;

        let breakdown = active
            .iter()
            .map(|expense| {
                let (applicable, amount) = if expense.is_lift_related() {
                    (request.has_lift, if request.has_lift { lift_rate * size } else { 0.0 })
                } else if non_lift > 0.0 {
                    (true, expense.annual_cost / non_lift * operating_share)
                } else {
                    (true, 0.0)
                };
                ExpenseBreakdownItem {
                    expense_id: expense.id.clone(),
                    category: expense.category.clone(),
                    service_provider: expense.service_provider.clone(),
                    annual_cost: expense.annual_cost,
                    applicable,
                    amount,
                }
            })
            .collect();

        let mut record = ServiceChargeCalculation::new(
            CalculationKind::ExpenseAllocation,
            request.zone_code.clone(),
            request.year,
            request.size,
        );
        record.property_id = request.property_id.clone();
        record.has_lift_access = request.has_lift;
        record.base_rate = base_rate;
        record.lift_rate = lift_rate;
        record.reserve_rate = request.reserve_rate;
        record.operating_share = operating_share;
        record.lift_share = lift_share;
        record.reserve_contribution = reserve_contribution;
        record.set_total_annual(operating_share + lift_share + reserve_contribution);
        debug!(
            zone = %request.zone_code,
            expenses = active.len(),
            total = record.total_annual,
            "operating expenses allocated"
        );

        Ok(AllocationResult {
            record,
            total_expenses,
            lift_expenses,
            portfolio_bua,
            lift_bua,
            breakdown,
        })
    }

    /// Active expenses grouped by category, largest first.
    pub fn category_summary(expenses: &[OperatingExpense]) -> Vec<CategorySummary> {
        let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
        for expense in expenses.iter().filter(|e| e.is_active()) {
            *totals.entry(expense.category.as_str()).or_default() += expense.annual_cost;
        }
        let grand_total: f64 = totals.values().sum();
        let mut summary: Vec<CategorySummary> = totals
            .into_iter()
            .map(|(category, amount)| CategorySummary {
                category: category.to_string(),
                amount,
                percentage: if grand_total > 0.0 {
                    amount / grand_total * 100.0
                } else {
                    0.0
                },
            })
            .collect();
        summary.sort_by(|a, b| b.amount.total_cmp(&a.amount));
        summary
    }

    pub fn zone_summary(zones: &[Zone]) -> Vec<ZoneExpenseSummary> {
        zones
            .iter()
            .map(|zone| {
                let total_annual_charge = zone.total_bua * zone.service_charge_rate;
                ZoneExpenseSummary {
                    zone_code: zone.code.clone(),
                    zone_name: zone.name.clone(),
                    total_bua: zone.total_bua,
                    unit_count: zone.unit_count,
                    service_charge_rate: zone.service_charge_rate,
                    total_annual_charge,
                    average_charge: if zone.unit_count > 0 {
                        total_annual_charge / zone.unit_count as f64
                    } else {
                        0.0
                    },
                }
            })
            .collect()
    }
}
