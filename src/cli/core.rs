//! Shell construction, dispatch, and the helpers shared by command handlers.

use std::{env, io, path::PathBuf};

use chrono::{Datelike, Local};
use dialoguer::theme::ColorfulTheme;
use mbay_config::{Config, ConfigError, ConfigManager};
use mbay_core::{reference, CoreError, RateTable, Selection, UnitRegistry, RFS_2025_TABLE};
use mbay_domain::{Area, CalculationHistory, PropertyType, ServiceChargeCalculation, Zone};
use mbay_storage_json::JsonCalculationStore;
use strsim::levenshtein;
use tracing::{debug, warn};

use crate::currency::MoneyFormatter;
use crate::errors::{CliError, FacilityError};

use super::commands;
use super::io as cli_io;
use super::output;
use super::registry::CommandRegistry;
pub use super::shell_context::{CliMode, ShellContext};

/// Overrides the data root (config, histories, backups).
pub const HOME_ENV: &str = "MUSCAT_BAY_HOME";
pub const DEFAULT_HISTORY: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let base = env::var_os(HOME_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| Config::default().resolve_data_root());
        Self::with_home(mode, base)
    }

    /// Builds a shell whose config and histories live under `base`.
    pub fn with_home(mode: CliMode, base: PathBuf) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let config_manager = ConfigManager::with_base_dir(base.clone())?;
        let config = config_manager.load()?;
        output::apply_config(&config);

        let data_root = config.data_root.clone().unwrap_or(base);
        let store = JsonCalculationStore::at_data_root(&data_root)?;
        let rate_table = load_rate_table(&config.rate_table);
        let year = config.year_or(current_year());
        let money = MoneyFormatter::new(&config.currency, &config.locale, config.currency_precision);

        let history_name = config
            .last_history
            .clone()
            .unwrap_or_else(|| DEFAULT_HISTORY.to_string());
        let history = match store.load_or_new(&history_name) {
            Ok(history) => history,
            Err(err) => {
                warn!(history = %history_name, error = %err, "could not load last history");
                CalculationHistory::new(history_name.as_str())
            }
        };
        debug!(root = %data_root.display(), table = %rate_table.name, "shell ready");

        let app = ShellContext {
            mode,
            registry,
            theme: ColorfulTheme::default(),
            config_manager,
            config,
            store,
            rate_table,
            units: UnitRegistry::builtin(),
            expenses: reference::builtin_expenses(year),
            selection: Selection::new(),
            history,
            last_record: None,
            money,
            running: true,
        };
        if mode == CliMode::Interactive && !app.history.is_empty() {
            cli_io::print_success(format!(
                "Loaded history `{}` ({} records).",
                app.history.name,
                app.history.len()
            ));
        }
        Ok(app)
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn prompt(&self) -> String {
        match self.selection.zone() {
            Some(zone) => format!("mbay [{} · zone {}]> ", self.history.name, zone),
            None => format!("mbay [{}]> ", self.history.name),
        }
    }

    pub(crate) fn default_year(&self) -> i32 {
        self.config.year_or(current_year())
    }

    pub(crate) fn zones(&self) -> &[Zone] {
        &self.rate_table.zones
    }

    /// Re-derives formatter, rate table and output style after a config change.
    pub(crate) fn apply_config(&mut self) {
        output::apply_config(&self.config);
        self.money = MoneyFormatter::new(
            &self.config.currency,
            &self.config.locale,
            self.config.currency_precision,
        );
        if self.rate_table.name != self.config.rate_table {
            self.rate_table = load_rate_table(&self.config.rate_table);
        }
    }

    pub(crate) fn persist_config(&self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    pub(crate) fn remember(&mut self, record: ServiceChargeCalculation) {
        self.last_record = Some(record);
        cli_io::print_hint(format!(
            "Use `save` to add this calculation to history `{}`.",
            self.history.name
        ));
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    /// Runs one shell line. Blank lines and `#` comments are ignored.
    pub(crate) fn execute_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(LoopControl::Continue);
        }
        let tokens = match shell_words::split(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                self.print_warning(&format!("Could not parse `{}`: {}", line, err));
                return Ok(LoopControl::Continue);
            }
        };
        let Some((raw, rest)) = tokens.split_first() else {
            return Ok(LoopControl::Continue);
        };

        let args: Vec<&str> = rest.iter().map(String::as_str).collect();
        let control = self.dispatch(&raw.to_lowercase(), raw, &args)?;
        if control == LoopControl::Exit {
            self.running = false;
        }
        Ok(control)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let mut suggestions: Vec<_> = self
            .registry
            .names()
            .map(|key| (levenshtein(key, input), key))
            .collect();
        suggestions.sort_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = suggestions.first() {
            if *distance <= 3 {
                cli_io::print_info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(cli_io::confirm_action(&self.theme, "Exit shell?", true)?)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                self.print_error(&message);
                self.print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Core(FacilityError::Core(core)) => {
                self.report_core_error(&core);
                Ok(())
            }
            other => {
                self.print_error(&other.to_string());
                Ok(())
            }
        }
    }

    fn report_core_error(&self, err: &CoreError) {
        match err {
            CoreError::UnknownZone(_) => {
                self.print_error(&err.to_string());
                self.print_hint("Run `zones` to list the zones in the active rate table.");
            }
            CoreError::RateNotFound { zone, .. } => {
                self.print_error(&err.to_string());
                self.print_hint(&format!("Run `types {zone}` to see what is priced there."));
            }
            CoreError::UnitNotFound(_) => {
                self.print_error(&err.to_string());
                self.print_hint("Run `units <zone>` to list registered units.");
            }
            CoreError::Selection(_) => {
                self.print_warning(&err.to_string());
                self.print_hint("Use `select` to complete the selection.");
            }
            CoreError::Validation(_) => self.print_warning(&err.to_string()),
            _ => self.print_error(&err.to_string()),
        }
    }

    pub(crate) fn print_error(&self, message: &str) {
        cli_io::print_error(message);
    }

    pub(crate) fn print_warning(&self, message: &str) {
        cli_io::print_warning(message);
    }

    pub(crate) fn print_hint(&self, message: &str) {
        cli_io::print_hint(message);
    }
}

fn current_year() -> i32 {
    Local::now().year()
}

fn load_rate_table(name: &str) -> RateTable {
    RateTable::builtin(name).unwrap_or_else(|| {
        warn!(table = name, fallback = RFS_2025_TABLE, "unknown rate table");
        RateTable::rfs_2025()
    })
}

pub(crate) fn parse_property_type(input: &str) -> Result<PropertyType, CommandError> {
    input.parse().map_err(|_| {
        CommandError::InvalidArguments(format!(
            "unknown property type `{}` (use apartment, villa, commercial or staff)",
            input
        ))
    })
}

pub(crate) fn parse_area(input: &str) -> Result<Area, CommandError> {
    input
        .parse()
        .map_err(|err: mbay_domain::AreaError| CommandError::InvalidArguments(err.to_string()))
}

pub(crate) fn parse_year(input: &str) -> Result<i32, CommandError> {
    input
        .parse()
        .map_err(|_| CommandError::InvalidArguments(format!("invalid year `{}`", input)))
}

/// Splits `--flag` tokens from positional arguments.
pub(crate) fn split_flags<'a>(args: &[&'a str]) -> (Vec<&'a str>, Vec<String>) {
    let mut positional = Vec::new();
    let mut flags = Vec::new();
    for arg in args {
        match arg.strip_prefix("--") {
            Some(flag) => flags.push(flag.to_ascii_lowercase()),
            None => positional.push(*arg),
        }
    }
    (positional, flags)
}

pub(crate) fn reject_unknown_flags(flags: &[String], allowed: &[&str]) -> CommandResult {
    match flags.iter().find(|flag| !allowed.contains(&flag.as_str())) {
        Some(flag) => Err(CommandError::InvalidArguments(format!(
            "unknown option `--{}`",
            flag
        ))),
        None => Ok(()),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] FacilityError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CoreError> for CommandError {
    fn from(err: CoreError) -> Self {
        CommandError::Core(FacilityError::Core(err))
    }
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        CommandError::Core(FacilityError::from(err))
    }
}

impl From<CliError> for CommandError {
    fn from(err: CliError) -> Self {
        match err {
            CliError::Core(inner) => CommandError::Core(inner),
            CliError::Command(message) => CommandError::InvalidArguments(message),
        }
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

#[cfg(test)]
pub(crate) fn process_script(
    home: &std::path::Path,
    lines: &[&str],
) -> Result<ShellContext, CliError> {
    let mut app = ShellContext::with_home(CliMode::Script, home.to_path_buf())?;
    for line in lines {
        match app.execute_line(line)? {
            LoopControl::Continue => {}
            LoopControl::Exit => break,
        }
    }
    Ok(app)
}
