//! Reference data browsing, the zone → type → building → unit selection, and unit import.

use std::path::Path;

use mbay_core::{ChargeRequest, CoreError, ReserveFundService, Selection, ServiceChargeService};
use mbay_domain::{PropertyType, PropertyUnit, UnitStatus};
use tracing::info;

use crate::cli::core::{
    parse_area, parse_property_type, reject_unknown_flags, split_flags, CliMode, CommandError,
    CommandResult, ShellContext,
};
use crate::cli::io;
use crate::cli::output::{self, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::cli::report;
use crate::import;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "zones",
            "List zones with unit counts and headline rates",
            "zones",
            cmd_zones,
        ),
        CommandEntry::new(
            "types",
            "List property types registered in a zone",
            "types <zone>",
            cmd_types,
        ),
        CommandEntry::new(
            "buildings",
            "List buildings for a zone and property type",
            "buildings <zone> <type>",
            cmd_buildings,
        ),
        CommandEntry::new(
            "units",
            "List registered units",
            "units <zone> [type] [building]",
            cmd_units,
        ),
        CommandEntry::new(
            "select",
            "Choose the unit to price step by step",
            "select [zone <code>|type <type>|building <name>|unit <id>|clear]",
            cmd_select,
        ),
        CommandEntry::new(
            "unit",
            "Add, edit or remove a registered unit",
            "unit [show <id>|add <id> <zone> <type> <bua> [building] [--lift]|set <id> <field> <value>|remove <id>]",
            cmd_unit,
        ),
        CommandEntry::new(
            "import-units",
            "Merge units from a CSV file into the registry",
            "import-units <path>",
            cmd_import_units,
        ),
    ]
}

fn cmd_zones(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output_section(format!("Zones ({})", context.rate_table.name));
    let zones: Vec<_> = context.zones().iter().collect();
    output::block(&report::zones_table(&zones, &context.money));
    Ok(())
}

fn cmd_types(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let code = args
        .first()
        .ok_or_else(|| CommandError::InvalidArguments("usage: types <zone>".into()))?;
    let zone = context.rate_table.zone(code)?.clone();
    output_section(format!("Property types in {}", zone.name));

    let year = context.default_year();
    let mut any = false;
    for property_type in PropertyType::ALL {
        let count = context.units.filter(&zone.code, property_type, None).count();
        let service = context.rate_table.service_rate(&zone.code, property_type).ok();
        let reserve =
            ReserveFundService::rate_per_sqm(&context.rate_table, &zone.code, property_type, year)
                .unwrap_or(0.0);
        if count == 0 && service.is_none() && reserve <= 0.0 {
            continue;
        }
        any = true;
        let service_label = match service {
            Some(rate) => context
                .money
                .rate(context.rate_table.adjusted_rate(rate.rate, year), "sqm"),
            None => "not priced".to_string(),
        };
        io::print_info(format!(
            "  {:<20} {:>4} units  service {}  reserve {}",
            property_type.label(),
            count,
            service_label,
            context.money.rate(reserve, "sqm")
        ));
    }
    if !any {
        io::print_warning(format!("No property types are registered in {}.", zone.name));
    }
    Ok(())
}

fn cmd_buildings(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 2 {
        return Err(CommandError::InvalidArguments(
            "usage: buildings <zone> <type>".into(),
        ));
    }
    let zone = context.rate_table.zone(args[0])?.code.clone();
    let property_type = parse_property_type(args[1])?;
    let mut selection = Selection::new();
    selection.select_zone(zone.clone());
    selection.select_property_type(property_type);
    let buildings = context.selection_model().buildings(&selection);

    if buildings.is_empty() {
        io::print_info(format!(
            "{} units in zone {} are not grouped by building.",
            property_type, zone
        ));
        return Ok(());
    }
    output_section(format!("Buildings · zone {} · {}", zone, property_type));
    for building in buildings {
        let count = context
            .units
            .filter(&zone, property_type, Some(building.as_str()))
            .count();
        io::print_info(format!("  {:<16} {} units", building, count));
    }
    Ok(())
}

fn cmd_units(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let code = args.first().ok_or_else(|| {
        CommandError::InvalidArguments("usage: units <zone> [type] [building]".into())
    })?;
    let zone = context.rate_table.zone(code)?.code.clone();
    let property_type = args.get(1).map(|raw| parse_property_type(raw)).transpose()?;
    let building = args.get(2).copied();

    let units: Vec<&PropertyUnit> = match property_type {
        Some(property_type) => context.units.filter(&zone, property_type, building).collect(),
        None => context.units.in_zone(&zone).collect(),
    };
    if units.is_empty() {
        io::print_warning("No units match.");
        return Ok(());
    }
    output_section(format!("Units · zone {} ({})", zone, units.len()));
    output::block(&report::units_table(&units));
    Ok(())
}

fn cmd_select(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(level) = args.first().map(|arg| arg.to_ascii_lowercase()) else {
        if context.mode == CliMode::Interactive {
            return select_interactively(context);
        }
        show_selection(context);
        return Ok(());
    };

    if level == "clear" {
        context.selection.clear();
        io::print_success("Selection cleared.");
        return Ok(());
    }
    if level == "show" {
        show_selection(context);
        return Ok(());
    }

    let value = args[1..].join(" ");
    if value.trim().is_empty() {
        return Err(CommandError::InvalidArguments(format!(
            "usage: select {} <value>",
            level
        )));
    }
    match level.as_str() {
        "zone" => choose_zone(context, &value)?,
        "type" => choose_type(context, &value)?,
        "building" => choose_building(context, &value)?,
        "unit" => choose_unit(context, &value)?,
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown selection level `{}` (use zone, type, building, unit or clear)",
                other
            )))
        }
    }
    show_selection(context);
    Ok(())
}

fn choose_zone(context: &mut ShellContext, code: &str) -> CommandResult {
    let zone = context.rate_table.zone(code)?.code.clone();
    context.selection.select_zone(zone);
    Ok(())
}

fn choose_type(context: &mut ShellContext, raw: &str) -> CommandResult {
    let property_type = parse_property_type(raw)?;
    if context.selection.zone().is_none() {
        return Err(CoreError::Selection("select a zone first".into()).into());
    }
    let available = context.selection_model().property_types(&context.selection);
    if !available.contains(&property_type) {
        return Err(CommandError::InvalidArguments(format!(
            "no {} units in the selected zone",
            property_type
        )));
    }
    context.selection.select_property_type(property_type);
    Ok(())
}

fn choose_building(context: &mut ShellContext, raw: &str) -> CommandResult {
    let buildings = context.selection_model().buildings(&context.selection);
    if buildings.is_empty() {
        return Err(CommandError::InvalidArguments(
            "the current selection has no buildings to choose from".into(),
        ));
    }
    let needle = raw.trim();
    let building = buildings
        .into_iter()
        .find(|name| {
            name.eq_ignore_ascii_case(needle)
                || name
                    .rsplit(' ')
                    .next()
                    .is_some_and(|suffix| suffix.eq_ignore_ascii_case(needle))
        })
        .ok_or_else(|| CommandError::InvalidArguments(format!("unknown building `{}`", needle)))?;
    context.selection.select_building(building);
    Ok(())
}

fn choose_unit(context: &mut ShellContext, raw: &str) -> CommandResult {
    let needle = raw.trim();
    let candidates: Vec<String> = context
        .selection_model()
        .units(&context.selection)
        .iter()
        .map(|unit| unit.id.clone())
        .collect();

    if candidates.is_empty() {
        // Selecting by id alone fills in the levels above it.
        let unit = context.units.require(needle)?.clone();
        context.selection.select_zone(unit.zone_code);
        context.selection.select_property_type(unit.property_type);
        if let Some(building) = unit.building {
            context.selection.select_building(building);
        }
        context.selection.select_unit(unit.id);
        return Ok(());
    }

    let id = candidates
        .into_iter()
        .find(|id| id.eq_ignore_ascii_case(needle))
        .ok_or_else(|| CoreError::UnitNotFound(needle.to_string()))?;
    context.selection.select_unit(id);
    Ok(())
}

fn show_selection(context: &ShellContext) {
    let selection = &context.selection;
    let model = context.selection_model();
    output_section("Selection");
    io::print_info(format!("  Zone     : {}", selection.zone().unwrap_or("-")));
    io::print_info(format!(
        "  Type     : {}",
        selection
            .property_type()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".into())
    ));
    if model.requires_building(selection) || selection.building().is_some() {
        io::print_info(format!(
            "  Building : {}",
            selection.building().unwrap_or("-")
        ));
    }
    io::print_info(format!("  Unit     : {}", selection.unit_id().unwrap_or("-")));

    match model.resolve(selection) {
        Ok(unit) => io::print_success(format!(
            "{} · {} · {}",
            unit.id,
            unit.unit_type,
            unit.bua
        )),
        Err(CoreError::Selection(missing)) => {
            let options: Vec<String> = if selection.zone().is_none() {
                model.zones().iter().map(|zone| zone.code.clone()).collect()
            } else if selection.property_type().is_none() {
                model
                    .property_types(selection)
                    .iter()
                    .map(|t| t.label().to_string())
                    .collect()
            } else if model.requires_building(selection) && selection.building().is_none() {
                model.buildings(selection)
            } else {
                model
                    .units(selection)
                    .iter()
                    .map(|unit| unit.id.clone())
                    .collect()
            };
            io::print_hint(format!("Next: {} ({})", missing, preview(&options)));
        }
        Err(err) => io::print_warning(err.to_string()),
    }
}

fn preview(options: &[String]) -> String {
    const LIMIT: usize = 8;
    if options.len() <= LIMIT {
        return options.join(", ");
    }
    format!(
        "{}, … {} more",
        options[..LIMIT].join(", "),
        options.len() - LIMIT
    )
}

fn select_interactively(context: &mut ShellContext) -> CommandResult {
    context.selection.clear();

    let zones: Vec<(String, String)> = context
        .selection_model()
        .zones()
        .iter()
        .map(|zone| (zone.code.clone(), zone.name.clone()))
        .collect();
    let labels: Vec<&str> = zones.iter().map(|(_, name)| name.as_str()).collect();
    let Some(index) = io::select_item(&context.theme, "Zone", &labels)? else {
        return cancelled();
    };
    context.selection.select_zone(zones[index].0.clone());

    let types = context.selection_model().property_types(&context.selection);
    let Some(index) = io::select_item(&context.theme, "Property type", &types)? else {
        return cancelled();
    };
    context.selection.select_property_type(types[index]);

    let buildings = context.selection_model().buildings(&context.selection);
    if !buildings.is_empty() {
        let Some(index) = io::select_item(&context.theme, "Building", &buildings)? else {
            return cancelled();
        };
        context.selection.select_building(buildings[index].clone());
    }

    let units: Vec<(String, String)> = context
        .selection_model()
        .units(&context.selection)
        .iter()
        .map(|unit| {
            (
                unit.id.clone(),
                format!("{} · {} · {}", unit.id, unit.unit_type, unit.bua),
            )
        })
        .collect();
    let labels: Vec<&str> = units.iter().map(|(_, label)| label.as_str()).collect();
    let Some(index) = io::select_item(&context.theme, "Unit", &labels)? else {
        return cancelled();
    };
    context.selection.select_unit(units[index].0.clone());

    show_selection(context);
    preview_charges(context)
}

/// Quick annual figures for the resolved unit, shown after an interactive selection.
fn preview_charges(context: &ShellContext) -> CommandResult {
    let unit = context.selection_model().resolve(&context.selection)?;
    let year = context.default_year();
    let request = ChargeRequest::for_unit(unit, year);
    if let Ok(quote) = ServiceChargeService::quote(&context.rate_table, &request) {
        io::print_info(format!(
            "  Service charge {}: {}",
            year,
            context.money.amount(quote.annual.total)
        ));
    }
    if let Ok(quote) = ReserveFundService::quote(&context.rate_table, &request) {
        io::print_info(format!(
            "  Reserve fund {}: {}",
            year,
            context.money.amount(quote.total_annual)
        ));
    }
    Ok(())
}

fn cancelled() -> CommandResult {
    io::print_info("Selection cancelled.");
    Ok(())
}

fn cmd_unit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (positional, flags) = split_flags(args);
    reject_unknown_flags(&flags, &["lift"])?;
    let action = positional
        .first()
        .map(|arg| arg.to_ascii_lowercase())
        .unwrap_or_else(|| "show".into());
    let rest = positional.get(1..).unwrap_or_default();

    match action.as_str() {
        "show" => {
            let id = rest
                .first()
                .ok_or_else(|| CommandError::InvalidArguments("usage: unit show <id>".into()))?;
            let unit = context.units.require(id)?;
            output_section(format!("Unit {}", unit.id));
            output::block(&report::units_table(&[unit]));
            if let Some(building) = &unit.building {
                io::print_info(format!("  Building: {building}"));
            }
            if let Some(owner) = &unit.owner {
                io::print_info(format!("  Owner: {owner}"));
            }
            Ok(())
        }
        "add" => {
            if rest.len() < 4 {
                return Err(CommandError::InvalidArguments(
                    "usage: unit add <id> <zone> <type> <bua> [building] [--lift]".into(),
                ));
            }
            let zone = context.rate_table.zone(rest[1])?.code.clone();
            let property_type = parse_property_type(rest[2])?;
            let bua = parse_area(rest[3])?;
            let mut unit = PropertyUnit::new(rest[0], zone, property_type, bua)
                .with_lift(flags.iter().any(|flag| flag == "lift"));
            if rest.len() > 4 {
                unit = unit.in_building(rest[4..].join(" "));
            }
            let id = unit.id.clone();
            context.units.add(unit)?;
            info!(unit = %id, "unit added");
            io::print_success(format!("Registered unit {}.", id));
            Ok(())
        }
        "set" => {
            if rest.len() < 3 {
                return Err(CommandError::InvalidArguments(
                    "usage: unit set <id> <owner|status|lift|bua|type|building> <value>".into(),
                ));
            }
            let id = rest[0];
            let value = rest[2..].join(" ");
            update_unit(context, id, &rest[1].to_ascii_lowercase(), value.trim())?;
            io::print_success(format!("Updated unit {}.", id));
            Ok(())
        }
        "remove" => {
            let id = rest
                .first()
                .ok_or_else(|| CommandError::InvalidArguments("usage: unit remove <id>".into()))?;
            if context.mode == CliMode::Interactive
                && !io::confirm_action(&context.theme, &format!("Remove unit {}?", id), false)?
            {
                io::print_info("Operation cancelled.");
                return Ok(());
            }
            let removed = context.units.remove(id)?;
            if context.selection.unit_id() == Some(removed.id.as_str()) {
                context.selection.clear();
            }
            info!(unit = %removed.id, "unit removed");
            io::print_success(format!("Removed unit {}.", removed.id));
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown unit action `{}`",
            other
        ))),
    }
}

fn update_unit(context: &mut ShellContext, id: &str, field: &str, value: &str) -> CommandResult {
    match field {
        "owner" => {
            let owner = (!value.is_empty() && value != "none").then(|| value.to_string());
            context.units.update(id, |unit| unit.owner = owner)?;
        }
        "status" => {
            let status: UnitStatus = value.parse().map_err(CommandError::InvalidArguments)?;
            context.units.update(id, |unit| unit.status = status)?;
        }
        "lift" | "has_lift" => {
            let has_lift = match value.to_ascii_lowercase().as_str() {
                "yes" | "true" | "on" | "1" => true,
                "no" | "false" | "off" | "0" => false,
                other => {
                    return Err(CommandError::InvalidArguments(format!(
                        "expected yes or no, got `{}`",
                        other
                    )))
                }
            };
            context.units.update(id, |unit| unit.has_lift = has_lift)?;
        }
        "bua" => {
            let bua = parse_area(value)?;
            context.units.update(id, |unit| unit.bua = bua)?;
        }
        "type" | "unit_type" => {
            context
                .units
                .update(id, |unit| unit.unit_type = value.to_string())?;
        }
        "building" => {
            let building = (!value.is_empty() && value != "none").then(|| value.to_string());
            context.units.update(id, |unit| unit.building = building)?;
        }
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown unit field `{}`",
                other
            )))
        }
    }
    Ok(())
}

fn cmd_import_units(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = args
        .first()
        .ok_or_else(|| CommandError::InvalidArguments("usage: import-units <path>".into()))?;
    let report = import::import_units(Path::new(path), context.zones())?;
    for row in &report.errors {
        io::print_warning(format!("line {}: {}", row.line, row.message));
    }
    let imported = report.imported();
    let skipped = report.skipped();
    let summary = context.units.merge(report.records);
    info!(path = %path, added = summary.added, replaced = summary.replaced, "units imported");
    io::print_success(format!(
        "Imported {} units ({} new, {} replaced); {} rows skipped.",
        imported, summary.added, summary.replaced, skipped
    ));
    Ok(())
}
