use mbay_core::RateTable;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "View and manage preferences",
        "config [show|set <key> <value>|backup [note]|backups|restore <file>]",
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() || args[0].eq_ignore_ascii_case("show") {
        show_config(context);
        return Ok(());
    }

    match args[0].to_lowercase().as_str() {
        "set" => {
            if args.len() < 3 {
                return Err(CommandError::InvalidArguments(
                    "usage: config set <key> <value>".into(),
                ));
            }
            set_config_value(context, args[1], args[2..].join(" ").trim())
        }
        "backup" => {
            let note = (args.len() > 1).then(|| args[1..].join(" "));
            let name = context
                .config_manager
                .backup(&context.config, note.as_deref())?;
            io::print_success(format!("Configuration backed up as {}.", name));
            Ok(())
        }
        "backups" => {
            let backups = context.config_manager.list_backups()?;
            if backups.is_empty() {
                io::print_info("No configuration backups yet.");
                return Ok(());
            }
            output_section("Configuration backups");
            for backup in backups {
                let created = backup
                    .created_at
                    .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "unknown".into());
                io::print_info(format!(
                    "  {}  {}{}",
                    created,
                    backup.file_name,
                    backup
                        .note
                        .map(|note| format!("  ({note})"))
                        .unwrap_or_default()
                ));
            }
            Ok(())
        }
        "restore" => {
            let name = args.get(1).ok_or_else(|| {
                CommandError::InvalidArguments("usage: config restore <file>".into())
            })?;
            context.config = context.config_manager.restore(name)?;
            context.apply_config();
            io::print_success(format!("Configuration restored from {}.", name));
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown config action `{}`",
            other
        ))),
    }
}

fn show_config(context: &ShellContext) {
    let config = &context.config;
    output_section("Configuration");
    io::print_info(format!("  Locale: {}", config.locale));
    io::print_info(format!("  Currency: {}", config.currency));
    io::print_info(format!("  Theme: {}", config.theme));
    io::print_info(format!(
        "  Colour output: {}",
        if config.ui_color_enabled { "on" } else { "off" }
    ));
    io::print_info(format!(
        "  Default year: {}",
        config
            .default_year
            .map(|year| year.to_string())
            .unwrap_or_else(|| format!("current ({})", context.default_year()))
    ));
    io::print_info(format!(
        "  VAT on reserve fund: {}",
        if config.include_vat_in_reserve { "included" } else { "excluded" }
    ));
    io::print_info(format!("  Rate table: {}", config.rate_table));
    io::print_info(format!(
        "  Currency precision: {}",
        config
            .currency_precision
            .map(|value| format!("{value} places"))
            .unwrap_or_else(|| "auto".into())
    ));
    io::print_info(format!(
        "  Last history: {}",
        config.last_history.as_deref().unwrap_or("(none)")
    ));
    io::print_info(format!(
        "  Config file: {}",
        context.config_manager.config_path().display()
    ));
}

fn set_config_value(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let mut updated = context.config.clone();
    updated
        .set(key, value)
        .map_err(CommandError::InvalidArguments)?;
    if RateTable::builtin(&updated.rate_table).is_none() {
        return Err(CommandError::InvalidArguments(format!(
            "unknown rate table `{}` (available: {})",
            updated.rate_table,
            RateTable::builtin_names().join(", ")
        )));
    }
    if updated.currency_precision.is_some_and(|places| places > 6) {
        return Err(CommandError::InvalidArguments(
            "currency precision must be between 0 and 6".into(),
        ));
    }

    context.config = updated;
    context.persist_config()?;
    context.apply_config();
    io::print_success("Configuration updated.");
    Ok(())
}
