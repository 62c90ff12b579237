//! Reserve fund, service charge and expense allocation commands.
//!
//! Every calculation accepts either an explicit `<zone> <type> <bua>` triple, a
//! registered unit id, or nothing at all, in which case the current selection
//! is resolved to a unit.

use mbay_core::{
    AllocationRequest, ChargeRequest, ExpenseService, ReserveFundService, ServiceChargeService,
};
use mbay_domain::{Area, PropertyType, PropertyUnit};

use crate::cli::core::{
    parse_area, parse_property_type, parse_year, reject_unknown_flags, split_flags, CommandError,
    CommandResult, ShellContext,
};
use crate::cli::io;
use crate::cli::output::{self, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::cli::report;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "reserve",
            "Reserve fund contribution with component breakdown",
            "reserve [<zone> <type> <bua> | <unit-id>] [year] [--vat|--no-vat]",
            cmd_reserve,
        ),
        CommandEntry::new(
            "reserve-unit",
            "Reserve fund contribution for a registered or selected unit",
            "reserve-unit [unit-id] [year] [--vat|--no-vat]",
            cmd_reserve_unit,
        ),
        CommandEntry::new(
            "charge",
            "Annual, quarterly and monthly service charge",
            "charge [<zone> <type> <bua> | <unit-id>] [year] [--lift] [--reserve] [--no-vat]",
            cmd_charge,
        ),
        CommandEntry::new(
            "allocate",
            "Share of the operating-expense ledger for a unit",
            "allocate [<zone> <type> <bua> | <unit-id>] [year] [--lift] [--no-reserve]",
            cmd_allocate,
        ),
    ]
}

/// What is being priced.
enum Subject {
    Manual {
        zone: String,
        property_type: PropertyType,
        bua: Area,
    },
    Unit(PropertyUnit),
}

impl Subject {
    fn zone(&self) -> &str {
        match self {
            Subject::Manual { zone, .. } => zone,
            Subject::Unit(unit) => &unit.zone_code,
        }
    }

    fn property_type(&self) -> PropertyType {
        match self {
            Subject::Manual { property_type, .. } => *property_type,
            Subject::Unit(unit) => unit.property_type,
        }
    }

    fn request(&self, year: i32) -> ChargeRequest {
        match self {
            Subject::Manual {
                zone,
                property_type,
                bua,
            } => ChargeRequest::new(zone.clone(), *property_type, *bua, year),
            Subject::Unit(unit) => ChargeRequest::for_unit(unit, year),
        }
    }
}

/// Splits positionals into a subject and the optional year argument that follows it.
fn resolve_subject<'a>(
    context: &ShellContext,
    positional: &[&'a str],
    allow_manual: bool,
) -> Result<(Subject, Option<&'a str>), CommandError> {
    if allow_manual && positional.len() >= 3 {
        let property_type = parse_property_type(positional[1])?;
        let bua = parse_area(positional[2])?;
        let zone = context.rate_table.zone(positional[0])?.code.clone();
        if positional.len() > 4 {
            return Err(CommandError::InvalidArguments(
                "too many arguments".into(),
            ));
        }
        return Ok((
            Subject::Manual {
                zone,
                property_type,
                bua,
            },
            positional.get(3).copied(),
        ));
    }

    if let Some(first) = positional.first() {
        if let Some(unit) = context.units.get(first) {
            if positional.len() > 2 {
                return Err(CommandError::InvalidArguments(
                    "too many arguments".into(),
                ));
            }
            return Ok((Subject::Unit(unit.clone()), positional.get(1).copied()));
        }
        let looks_like_year = first.parse::<i32>().is_ok() && positional.len() == 1;
        if !looks_like_year {
            return Err(CommandError::InvalidArguments(format!(
                "`{}` is not a registered unit; give <zone> <type> <bua> or a unit id",
                first
            )));
        }
    }

    let unit = context
        .selection_model()
        .resolve(&context.selection)?
        .clone();
    Ok((Subject::Unit(unit), positional.first().copied()))
}

fn year_arg(context: &ShellContext, raw: Option<&str>) -> Result<i32, CommandError> {
    match raw {
        Some(raw) => parse_year(raw),
        None => Ok(context.default_year()),
    }
}

fn cmd_reserve(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    reserve(context, args, true)
}

fn cmd_reserve_unit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    reserve(context, args, false)
}

fn reserve(context: &mut ShellContext, args: &[&str], allow_manual: bool) -> CommandResult {
    let (positional, flags) = split_flags(args);
    reject_unknown_flags(&flags, &["vat", "no-vat"])?;
    let (subject, year) = resolve_subject(context, &positional, allow_manual)?;
    let year = year_arg(context, year)?;

    let include_vat = if flags.iter().any(|flag| flag == "no-vat") {
        false
    } else {
        flags.iter().any(|flag| flag == "vat") || context.config.include_vat_in_reserve
    };
    let request = subject.request(year).with_vat(include_vat);
    let quote = ReserveFundService::quote(&context.rate_table, &request)?;

    output_section(format!("Reserve fund {}", year));
    output::block(&report::reserve_fund_report(&quote, &context.money));
    if let Some(categories) = report::category_breakdown(&quote, &context.money) {
        output_section("Category allocation");
        output::block(&categories);
    }
    context.remember(quote.to_record());
    Ok(())
}

fn cmd_charge(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (positional, flags) = split_flags(args);
    reject_unknown_flags(&flags, &["lift", "reserve", "no-vat"])?;
    let (subject, year) = resolve_subject(context, &positional, true)?;
    let year = year_arg(context, year)?;

    let mut request = subject
        .request(year)
        .with_reserve(flags.iter().any(|flag| flag == "reserve"))
        .with_vat(!flags.iter().any(|flag| flag == "no-vat"));
    if flags.iter().any(|flag| flag == "lift") {
        request = request.with_lift(true);
    }
    let quote = ServiceChargeService::quote(&context.rate_table, &request)?;

    output_section(format!("Service charge {}", year));
    output::block(&report::service_charge_report(&quote, &context.money));
    context.remember(quote.to_record());
    Ok(())
}

fn cmd_allocate(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (positional, flags) = split_flags(args);
    reject_unknown_flags(&flags, &["lift", "no-reserve"])?;
    let (subject, year) = resolve_subject(context, &positional, true)?;
    let year = year_arg(context, year)?;

    let reserve_rate = if flags.iter().any(|flag| flag == "no-reserve") {
        0.0
    } else {
        ReserveFundService::rate_per_sqm(
            &context.rate_table,
            subject.zone(),
            subject.property_type(),
            year,
        )?
    };
    let mut request = match &subject {
        Subject::Manual { zone, bua, .. } => {
            AllocationRequest::new(zone.clone(), year, *bua).with_reserve_rate(reserve_rate)
        }
        Subject::Unit(unit) => AllocationRequest::for_unit(unit, year, reserve_rate),
    };
    if flags.iter().any(|flag| flag == "lift") {
        request = request.with_lift(true);
    }

    let result = ExpenseService::allocate(&context.expenses, context.units.units(), &request)?;
    output_section(format!("Operating expense allocation {}", year));
    io::print_info(format!(
        "Ledger {} ({} lift) over {} sqm ({} sqm with lift access)",
        context.money.amount(result.total_expenses),
        context.money.amount(result.lift_expenses),
        context.money.number(result.portfolio_bua, 2),
        context.money.number(result.lift_bua, 2)
    ));
    output::block(&report::allocation_report(&result, &context.money));
    context.remember(result.record);
    Ok(())
}
