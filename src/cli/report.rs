//! Plain-text renderings of quotes, allocations and reference data.
//!
//! Everything here returns strings so the shell can print them and tests can
//! compare them without a terminal.

use mbay_core::{
    AllocationResult, CategorySummary, ChargeAmounts, ReserveFundQuote, ServiceChargeQuote,
    ZoneExpenseSummary,
};
use mbay_domain::{BillingPeriod, CalculationHistory, OperatingExpense, PropertyUnit, Zone};
use mbay_storage_json::HistoryMetadata;

use crate::cli::table::{Table, TableColumn};
use crate::currency::MoneyFormatter;

fn summary_line(label: &str, value: impl std::fmt::Display) -> String {
    format!("{label:<12} {value}")
}

pub fn reserve_fund_report(quote: &ReserveFundQuote, money: &MoneyFormatter) -> String {
    let mut lines = vec![format!(
        "{} · {} · {:.2} sqm · {}",
        quote.zone_name,
        quote.property_type,
        quote.bua.square_metres(),
        quote.year
    )];
    if let Some(id) = &quote.property_id {
        lines.push(format!("Unit {id}"));
    }

    let mut table = Table::new(vec![
        TableColumn::left("Component"),
        TableColumn::right("Rate"),
        TableColumn::right("Area"),
        TableColumn::right("Contribution"),
    ]);
    for line in &quote.breakdown {
        table.add_row(vec![
            line.name.clone(),
            money.rate(line.rate_applied, quote.area_unit),
            money.number(line.area, 2),
            money.amount(line.contribution),
        ]);
    }
    lines.push(table.render());

    let vat = if quote.vat > 0.0 {
        money.amount(quote.vat)
    } else {
        "excluded".to_string()
    };
    lines.push(summary_line("Subtotal", money.amount(quote.subtotal)));
    lines.push(summary_line("VAT", vat));
    lines.push(summary_line("Annual", money.amount(quote.total_annual)));
    lines.push(summary_line("Quarterly", money.amount(quote.quarterly)));
    lines.push(summary_line("Monthly", money.amount(quote.monthly)));
    lines.join("\n")
}

/// Category allocation of each component that carries one.
pub fn category_breakdown(quote: &ReserveFundQuote, money: &MoneyFormatter) -> Option<String> {
    let mut table = Table::new(vec![
        TableColumn::left("Component"),
        TableColumn::left("Category"),
        TableColumn::right("Amount"),
    ]);
    for line in &quote.breakdown {
        for category in &line.categories {
            table.add_row(vec![
                line.name.clone(),
                category.category.clone(),
                money.amount(category.amount),
            ]);
        }
    }
    (!table.is_empty()).then(|| table.render())
}

pub fn service_charge_report(quote: &ServiceChargeQuote, money: &MoneyFormatter) -> String {
    let request = &quote.request;
    let mut lines = vec![format!(
        "{} · {} · {:.2} sqm · {}",
        quote.zone_name,
        request.property_type,
        request.bua.square_metres(),
        request.year
    )];
    if let Some(id) = &request.property_id {
        lines.push(format!("Unit {id}"));
    }

    let mut table = Table::new(vec![
        TableColumn::left("Charge"),
        TableColumn::right("Annual"),
        TableColumn::right("Quarterly"),
        TableColumn::right("Monthly"),
    ]);
    let periods = [
        BillingPeriod::Annual,
        BillingPeriod::Quarterly,
        BillingPeriod::Monthly,
    ];
    let mut row = |label: &str, pick: fn(&ChargeAmounts) -> f64| {
        let mut cells = vec![label.to_string()];
        cells.extend(
            periods
                .iter()
                .map(|period| money.amount(pick(quote.amounts(*period)))),
        );
        table.add_row(cells);
    };
    row("Base charge", |amounts: &ChargeAmounts| amounts.base_charge);
    if request.has_lift {
        row("Lift", |amounts: &ChargeAmounts| amounts.lift_charge);
    }
    if request.include_reserve {
        row("Reserve fund", |amounts: &ChargeAmounts| amounts.reserve_fund);
    }
    row("VAT", |amounts: &ChargeAmounts| amounts.vat);
    row("Total", |amounts: &ChargeAmounts| amounts.total);
    lines.push(table.render());

    lines.push(summary_line(
        "Service rate",
        money.rate(quote.service_rate, "sqm"),
    ));
    if request.has_lift {
        lines.push(summary_line("Lift rate", money.rate(quote.lift_rate, "sqm")));
    }
    if request.include_reserve {
        lines.push(summary_line(
            "Reserve rate",
            money.rate(quote.reserve_rate, "sqm"),
        ));
    }
    lines.join("\n")
}

pub fn allocation_report(result: &AllocationResult, money: &MoneyFormatter) -> String {
    let record = &result.record;
    let mut lines = vec![format!(
        "Zone {} · {:.2} sqm · {}{}",
        record.zone_code,
        record.property_size,
        record.year,
        if record.has_lift_access { " · lift access" } else { "" }
    )];

    let mut table = Table::new(vec![
        TableColumn::left("Expense").max_width(28),
        TableColumn::left("Provider").max_width(24),
        TableColumn::right("Annual cost"),
        TableColumn::right("Share"),
    ]);
    for item in &result.breakdown {
        let share = if item.applicable {
            money.amount(item.amount)
        } else {
            "n/a".to_string()
        };
        table.add_row(vec![
            item.category.clone(),
            item.service_provider.clone(),
            money.amount(item.annual_cost),
            share,
        ]);
    }
    lines.push(table.render());

    lines.push(summary_line("Base rate", money.rate(record.base_rate, "sqm")));
    lines.push(summary_line("Lift rate", money.rate(record.lift_rate, "sqm")));
    lines.push(summary_line(
        "Reserve rate",
        money.rate(record.reserve_rate, "sqm"),
    ));
    lines.push(summary_line("Operating", money.amount(record.operating_share)));
    lines.push(summary_line("Lift share", money.amount(record.lift_share)));
    lines.push(summary_line(
        "Reserve",
        money.amount(record.reserve_contribution),
    ));
    lines.push(summary_line("Annual", money.amount(record.total_annual)));
    lines.push(summary_line("Quarterly", money.amount(record.quarterly)));
    lines.push(summary_line("Monthly", money.amount(record.monthly)));
    lines.join("\n")
}

pub fn zones_table(zones: &[&Zone], money: &MoneyFormatter) -> String {
    let mut table = Table::new(vec![
        TableColumn::left("Code"),
        TableColumn::left("Name"),
        TableColumn::right("Units"),
        TableColumn::right("Total BUA"),
        TableColumn::right("Service rate"),
        TableColumn::right("Reserve rate"),
    ]);
    for zone in zones {
        table.add_row(vec![
            zone.code.clone(),
            zone.name.clone(),
            zone.unit_count.to_string(),
            money.number(zone.total_bua, 2),
            money.rate(zone.service_charge_rate, "sqm"),
            money.rate(zone.reserve_fund_rate, "sqm"),
        ]);
    }
    table.render()
}

pub fn units_table(units: &[&PropertyUnit]) -> String {
    let mut table = Table::new(vec![
        TableColumn::left("Id"),
        TableColumn::left("Unit"),
        TableColumn::left("Type").max_width(30),
        TableColumn::right("BUA"),
        TableColumn::left("Lift"),
        TableColumn::left("Status"),
    ]);
    for unit in units {
        table.add_row(vec![
            unit.id.clone(),
            unit.unit_no.clone(),
            unit.unit_type.clone(),
            format!("{:.2}", unit.bua.square_metres()),
            if unit.has_lift { "yes" } else { "no" }.to_string(),
            unit.status.to_string(),
        ]);
    }
    table.render()
}

pub fn expenses_table(expenses: &[&OperatingExpense], money: &MoneyFormatter) -> String {
    let mut table = Table::new(vec![
        TableColumn::left("Id"),
        TableColumn::left("Category"),
        TableColumn::left("Provider").max_width(28),
        TableColumn::right("Monthly"),
        TableColumn::right("Annual"),
        TableColumn::left("Allocation"),
        TableColumn::left("Status"),
    ]);
    for expense in expenses {
        table.add_row(vec![
            expense.id.clone(),
            expense.category.clone(),
            expense.service_provider.clone(),
            money.amount(expense.monthly_cost),
            money.amount(expense.annual_cost),
            expense.allocation.clone(),
            expense.status.to_string(),
        ]);
    }
    table.render()
}

pub fn category_summary_table(summary: &[CategorySummary], money: &MoneyFormatter) -> String {
    let mut table = Table::new(vec![
        TableColumn::left("Category"),
        TableColumn::right("Annual"),
        TableColumn::right("Share"),
    ]);
    for row in summary {
        table.add_row(vec![
            row.category.clone(),
            money.amount(row.amount),
            format!("{:.1}%", row.percentage),
        ]);
    }
    table.render()
}

pub fn zone_summary_table(summary: &[ZoneExpenseSummary], money: &MoneyFormatter) -> String {
    let mut table = Table::new(vec![
        TableColumn::left("Zone"),
        TableColumn::right("Units"),
        TableColumn::right("Total BUA"),
        TableColumn::right("Rate"),
        TableColumn::right("Annual charge"),
        TableColumn::right("Per unit"),
    ]);
    for row in summary {
        table.add_row(vec![
            row.zone_name.clone(),
            row.unit_count.to_string(),
            money.number(row.total_bua, 2),
            money.rate(row.service_charge_rate, "sqm"),
            money.amount(row.total_annual_charge),
            money.amount(row.average_charge),
        ]);
    }
    table.render()
}

pub fn history_table(history: &CalculationHistory, money: &MoneyFormatter) -> String {
    let mut table = Table::new(vec![
        TableColumn::left("#"),
        TableColumn::left("Kind"),
        TableColumn::left("Subject"),
        TableColumn::right("Year"),
        TableColumn::right("BUA"),
        TableColumn::right("Annual"),
        TableColumn::right("Monthly"),
    ]);
    for (index, record) in history.records.iter().enumerate() {
        table.add_row(vec![
            (index + 1).to_string(),
            record.kind.to_string(),
            record
                .property_id
                .clone()
                .unwrap_or_else(|| format!("zone {}", record.zone_code)),
            record.year.to_string(),
            format!("{:.2}", record.property_size),
            money.amount(record.total_annual),
            money.amount(record.monthly),
        ]);
    }
    table.render()
}

pub fn saved_histories_table(rows: &[HistoryMetadata], money: &MoneyFormatter) -> String {
    let mut table = Table::new(vec![
        TableColumn::left("Name"),
        TableColumn::left("File"),
        TableColumn::right("Records"),
        TableColumn::right("Annual total"),
        TableColumn::left("Updated"),
    ]);
    for row in rows {
        table.add_row(vec![
            row.name.clone(),
            row.slug.clone(),
            row.record_count.to_string(),
            money.amount(row.total_annual),
            row.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }
    table.render()
}
