//! Working calculation history and its JSON persistence.

use std::path::Path;

use mbay_core::CalculationStore;
use mbay_domain::CalculationHistory;
use tracing::info;

use crate::cli::core::{CliMode, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{self, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::cli::report;
use crate::import;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "history",
            "Show, switch and back up calculation histories",
            "history [show|list|new <name>|load <name>|delete <name>|remove <n>|backup [note]|backups [name]|restore <backup> [name]]",
            cmd_history,
        ),
        CommandEntry::new(
            "save",
            "Add the last calculation to a history and write it to disk",
            "save [name]",
            cmd_save,
        ),
        CommandEntry::new(
            "export-history",
            "Write a history to CSV",
            "export-history <path> [name]",
            cmd_export_history,
        ),
    ]
}

fn cmd_history(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let action = args
        .first()
        .map(|arg| arg.to_ascii_lowercase())
        .unwrap_or_else(|| "show".into());
    let rest = args.get(1..).unwrap_or_default();

    match action.as_str() {
        "show" => show_history(context),
        "list" => list_histories(context),
        "new" => {
            let name = required(rest, "usage: history new <name>")?;
            context.history = CalculationHistory::new(name.as_str());
            remember_history(context)?;
            io::print_success(format!("Started history `{}`.", name));
            Ok(())
        }
        "load" => {
            let name = required(rest, "usage: history load <name>")?;
            context.history = context.store.load_history(&name)?;
            remember_history(context)?;
            io::print_success(format!(
                "Loaded history `{}` ({} records).",
                context.history.name,
                context.history.len()
            ));
            Ok(())
        }
        "delete" => {
            let name = required(rest, "usage: history delete <name>")?;
            if context.mode == CliMode::Interactive
                && !io::confirm_action(
                    &context.theme,
                    &format!("Delete saved history `{}`?", name),
                    false,
                )?
            {
                io::print_info("Operation cancelled.");
                return Ok(());
            }
            context.store.delete_history(&name)?;
            info!(history = %name, "history deleted");
            io::print_success(format!("Deleted history `{}`.", name));
            Ok(())
        }
        "remove" => {
            let raw = required(rest, "usage: history remove <n>")?;
            let index: usize = raw
                .parse()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(|| CommandError::InvalidArguments(format!("invalid record number `{}`", raw)))?;
            let id = context
                .history
                .records
                .get(index - 1)
                .map(|record| record.id)
                .ok_or_else(|| {
                    CommandError::InvalidArguments(format!(
                        "history `{}` has {} records",
                        context.history.name,
                        context.history.len()
                    ))
                })?;
            context.history.remove(id);
            io::print_success(format!(
                "Removed record {}. Use `save` to write the change.",
                index
            ));
            Ok(())
        }
        "backup" => {
            let note = (!rest.is_empty()).then(|| rest.join(" "));
            let backup =
                context
                    .store
                    .backup_history(&context.history.name, &context.history, note.as_deref())?;
            io::print_success(format!("Backup written: {}", backup.id));
            Ok(())
        }
        "backups" => {
            let name = rest
                .first()
                .map(|name| name.to_string())
                .unwrap_or_else(|| context.history.name.clone());
            let backups = context.store.list_backups(&name)?;
            if backups.is_empty() {
                io::print_info(format!("No backups for `{}`.", name));
                return Ok(());
            }
            output_section(format!("Backups of `{}`", name));
            for backup in backups {
                io::print_info(format!("  {}  {}", backup.created_at, backup.id));
            }
            Ok(())
        }
        "restore" => {
            let id = required(rest, "usage: history restore <backup> [name]")?;
            let name = rest
                .get(1)
                .map(|name| name.to_string())
                .unwrap_or_else(|| context.history.name.clone());
            let backup = context
                .store
                .list_backups(&name)?
                .into_iter()
                .find(|backup| backup.id == id || backup.id.starts_with(id.as_str()))
                .ok_or_else(|| {
                    CommandError::InvalidArguments(format!("no backup `{}` for `{}`", id, name))
                })?;
            let restored = context.store.restore_backup(&backup)?;
            io::print_success(format!(
                "Restored `{}` from {} ({} records).",
                name,
                backup.id,
                restored.len()
            ));
            if restored.name == context.history.name {
                context.history = restored;
            }
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown history action `{}`",
            other
        ))),
    }
}

fn required(rest: &[&str], usage: &str) -> Result<String, CommandError> {
    let value = rest.join(" ");
    if value.trim().is_empty() {
        Err(CommandError::InvalidArguments(usage.into()))
    } else {
        Ok(value.trim().to_string())
    }
}

fn remember_history(context: &mut ShellContext) -> CommandResult {
    context.config.last_history = Some(context.history.name.clone());
    context.persist_config()
}

fn show_history(context: &ShellContext) -> CommandResult {
    let history = &context.history;
    if history.is_empty() {
        io::print_info(format!(
            "History `{}` is empty. Run a calculation, then `save`.",
            history.name
        ));
        return Ok(());
    }
    output_section(format!("History `{}` ({} records)", history.name, history.len()));
    output::block(&report::history_table(history, &context.money));
    Ok(())
}

fn list_histories(context: &ShellContext) -> CommandResult {
    let rows = context.store.list_metadata()?;
    if rows.is_empty() {
        io::print_info("No saved histories yet.");
        return Ok(());
    }
    output_section("Saved histories");
    output::block(&report::saved_histories_table(&rows, &context.money));
    Ok(())
}

fn cmd_save(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first().map(|_| args.join(" ")) {
        if name != context.history.name {
            context.history = context.store.load_or_new(&name)?;
        }
    }

    match context.last_record.take() {
        Some(record) => {
            context.history.push(record);
        }
        None if context.history.is_empty() => {
            return Err(CommandError::InvalidArguments(
                "nothing to save; run a calculation first".into(),
            ))
        }
        None => {}
    }

    context
        .store
        .save_history(&context.history.name, &context.history)?;
    remember_history(context)?;
    io::print_success(format!(
        "Saved history `{}` ({} records) to {}.",
        context.history.name,
        context.history.len(),
        context.store.history_path(&context.history.name).display()
    ));
    Ok(())
}

fn cmd_export_history(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = args.first().ok_or_else(|| {
        CommandError::InvalidArguments("usage: export-history <path> [name]".into())
    })?;
    let loaded;
    let history = match args.get(1) {
        Some(name) => {
            loaded = context.store.load_history(name)?;
            &loaded
        }
        None => &context.history,
    };
    let written = import::export_history(history, Path::new(path))?;
    io::print_success(format!(
        "Exported {} records from `{}` to {}.",
        written, history.name, path
    ));
    Ok(())
}
