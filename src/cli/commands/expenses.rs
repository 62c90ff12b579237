use std::path::Path;

use mbay_core::ExpenseService;
use mbay_domain::OperatingExpense;
use tracing::info;

use crate::cli::core::{
    parse_year, reject_unknown_flags, split_flags, CommandError, CommandResult, ShellContext,
};
use crate::cli::io;
use crate::cli::output::{self, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::cli::report;
use crate::import;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "expenses",
            "List the operating-expense ledger with a category summary",
            "expenses [--all]",
            cmd_expenses,
        ),
        CommandEntry::new(
            "zone-summary",
            "Annual service charge totals per zone",
            "zone-summary",
            cmd_zone_summary,
        ),
        CommandEntry::new(
            "import-expenses",
            "Replace the expense ledger with rows from a CSV file",
            "import-expenses <path> [year]",
            cmd_import_expenses,
        ),
    ]
}

fn cmd_expenses(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (_, flags) = split_flags(args);
    reject_unknown_flags(&flags, &["all"])?;
    let show_all = flags.iter().any(|flag| flag == "all");

    let listed: Vec<&OperatingExpense> = context
        .expenses
        .iter()
        .filter(|expense| show_all || expense.is_active())
        .collect();
    if listed.is_empty() {
        io::print_warning("The expense ledger is empty.");
        return Ok(());
    }

    let active_total: f64 = context
        .expenses
        .iter()
        .filter(|expense| expense.is_active())
        .map(|expense| expense.annual_cost)
        .sum();
    output_section(format!("Operating expenses ({})", listed.len()));
    output::block(&report::expenses_table(&listed, &context.money));
    io::print_info(format!(
        "Active ledger total: {}",
        context.money.amount(active_total)
    ));

    let summary = ExpenseService::category_summary(&context.expenses);
    output_section("By category");
    output::block(&report::category_summary_table(&summary, &context.money));
    Ok(())
}

fn cmd_zone_summary(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let summary = ExpenseService::zone_summary(context.zones());
    output_section(format!("Zone summary ({})", context.rate_table.name));
    output::block(&report::zone_summary_table(&summary, &context.money));
    let total: f64 = summary.iter().map(|row| row.total_annual_charge).sum();
    io::print_info(format!(
        "Development total: {}",
        context.money.amount(total)
    ));
    Ok(())
}

fn cmd_import_expenses(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = args.first().ok_or_else(|| {
        CommandError::InvalidArguments("usage: import-expenses <path> [year]".into())
    })?;
    let year = match args.get(1) {
        Some(raw) => parse_year(raw)?,
        None => context.default_year(),
    };
    let report = import::import_expenses(Path::new(path), year)?;
    for row in &report.errors {
        io::print_warning(format!("line {}: {}", row.line, row.message));
    }
    if report.records.is_empty() {
        return Err(CommandError::Message(format!(
            "no expenses imported from {}; the ledger is unchanged",
            path
        )));
    }

    let skipped = report.skipped();
    context.expenses = report.records;
    info!(path = %path, expenses = context.expenses.len(), "expense ledger replaced");
    io::print_success(format!(
        "Loaded {} expenses; {} rows skipped.",
        context.expenses.len(),
        skipped
    ));
    Ok(())
}
