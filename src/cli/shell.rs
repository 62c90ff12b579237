use std::io::{self, BufRead};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};
use tracing::info;

use crate::cli::core::{CliMode, ShellContext};
use crate::cli::output::info as output_info;
use crate::errors::CliError;

/// When set, commands are read from stdin without prompts or confirmations.
pub const SCRIPT_ENV: &str = "MUSCAT_BAY_CLI_SCRIPT";

const PROPERTY_TYPES: [&str; 4] = ["apartment", "villa", "commercial", "staff"];
const SELECT_LEVELS: [&str; 6] = ["zone", "type", "building", "unit", "show", "clear"];
const UNIT_ACTIONS: [&str; 4] = ["show", "add", "set", "remove"];
const UNIT_FIELDS: [&str; 6] = ["owner", "status", "lift", "bua", "type", "building"];
const HISTORY_ACTIONS: [&str; 9] = [
    "show", "list", "new", "load", "delete", "remove", "backup", "backups", "restore",
];
const CONFIG_ACTIONS: [&str; 5] = ["show", "set", "backup", "backups", "restore"];

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;
    info!(?mode, "shell started");

    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<ShellHelper, DefaultHistory>::new()?;
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
    output_info("Type `help` to list commands, `exit` to leave.");

    while context.running {
        // Unit commands and imports change the registry between lines.
        editor.set_helper(Some(ShellHelper {
            words: CompletionWords::from_context(context),
        }));

        let line = match editor.readline(&context.prompt()) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
                continue;
            }
            Err(ReadlineError::Eof) => {
                output_info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        };
        if !line.trim().is_empty() {
            editor.add_history_entry(line.trim()).ok();
        }
        run_line(context, &line)?;
    }
    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    for line in io::stdin().lock().lines() {
        if !context.running {
            break;
        }
        run_line(context, &line?)?;
    }
    Ok(())
}

fn run_line(context: &mut ShellContext, line: &str) -> Result<(), CliError> {
    match context.execute_line(line) {
        Ok(_) => Ok(()),
        Err(err) => context.report_error(err),
    }
}

/// Words offered by tab completion, taken from the live shell state.
#[derive(Debug)]
pub(crate) struct CompletionWords {
    commands: Vec<String>,
    zones: Vec<String>,
    units: Vec<String>,
}

impl CompletionWords {
    pub(crate) fn from_context(context: &ShellContext) -> Self {
        let mut commands: Vec<String> = context
            .command_names()
            .into_iter()
            .map(str::to_ascii_lowercase)
            .collect();
        commands.sort();
        commands.dedup();
        Self {
            commands,
            zones: context.zones().iter().map(|zone| zone.code.clone()).collect(),
            units: context.units.units().iter().map(|unit| unit.id.clone()).collect(),
        }
    }

    /// Candidates for the word after `before` (the command word first).
    pub(crate) fn candidates(&self, before: &[&str], partial: &str) -> Vec<String> {
        let Some((command, rest)) = before.split_first() else {
            return matching(self.commands.iter().map(String::as_str), partial);
        };
        let command = command.to_ascii_lowercase();
        if partial.starts_with("--") {
            return matching(flags_for(&command).iter().copied(), partial);
        }
        let args: Vec<&str> = rest
            .iter()
            .copied()
            .filter(|arg| !arg.starts_with("--"))
            .collect();

        let zones = self.zones.iter().map(String::as_str);
        let units = self.units.iter().map(String::as_str);
        let types = PROPERTY_TYPES.iter().copied();
        match (command.as_str(), args.as_slice()) {
            ("reserve" | "charge" | "allocate", []) => matching(zones.chain(units), partial),
            ("reserve" | "charge" | "allocate", [zone]) if self.is_zone(zone) => {
                matching(types, partial)
            }
            ("reserve-unit", []) => matching(units, partial),
            ("types" | "buildings" | "units", []) => matching(zones, partial),
            ("buildings" | "units", [_]) => matching(types, partial),
            ("select", []) => matching(SELECT_LEVELS.iter().copied(), partial),
            ("select", [level]) => match level.to_ascii_lowercase().as_str() {
                "zone" => matching(zones, partial),
                "type" => matching(types, partial),
                "unit" => matching(units, partial),
                _ => Vec::new(),
            },
            ("unit", []) => matching(UNIT_ACTIONS.iter().copied(), partial),
            ("unit", [action]) if !action.eq_ignore_ascii_case("add") => matching(units, partial),
            ("unit", [action, _]) if action.eq_ignore_ascii_case("add") => {
                matching(zones, partial)
            }
            ("unit", [action, _, _]) if action.eq_ignore_ascii_case("add") => {
                matching(types, partial)
            }
            ("unit", [action, _]) if action.eq_ignore_ascii_case("set") => {
                matching(UNIT_FIELDS.iter().copied(), partial)
            }
            ("history", []) => matching(HISTORY_ACTIONS.iter().copied(), partial),
            ("config", []) => matching(CONFIG_ACTIONS.iter().copied(), partial),
            ("help", []) => matching(self.commands.iter().map(String::as_str), partial),
            _ => Vec::new(),
        }
    }

    fn is_zone(&self, word: &str) -> bool {
        self.zones.iter().any(|zone| zone.eq_ignore_ascii_case(word))
    }
}

fn flags_for(command: &str) -> &'static [&'static str] {
    match command {
        "reserve" | "reserve-unit" => &["--vat", "--no-vat"],
        "charge" => &["--lift", "--reserve", "--no-vat"],
        "allocate" => &["--lift", "--no-reserve"],
        "unit" => &["--lift"],
        "expenses" => &["--all"],
        _ => &[],
    }
}

fn matching<'a>(words: impl Iterator<Item = &'a str>, partial: &str) -> Vec<String> {
    let partial = partial.to_ascii_lowercase();
    words
        .filter(|word| word.to_ascii_lowercase().starts_with(&partial))
        .map(str::to_string)
        .collect()
}

struct ShellHelper {
    words: CompletionWords,
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let head = &line[..pos];
        let start = head.rfind(char::is_whitespace).map_or(0, |idx| idx + 1);
        let before: Vec<&str> = head[..start].split_whitespace().collect();
        let candidates = self
            .words
            .candidates(&before, &head[start..])
            .into_iter()
            .map(|word| Pair {
                display: word.clone(),
                replacement: word,
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn words() -> CompletionWords {
        CompletionWords {
            commands: vec!["charge".into(), "reserve".into(), "reserve-unit".into()],
            zones: vec!["3".into(), "5".into(), "MC".into()],
            units: vec!["Z3-053-1B".into(), "Z5-001".into()],
        }
    }

    #[test]
    fn command_word_completes_from_the_registry() {
        assert_eq!(words().candidates(&[], "res"), vec!["reserve", "reserve-unit"]);
    }

    #[test]
    fn calculation_arguments_complete_zones_then_types() {
        let words = words();
        assert_eq!(words.candidates(&["reserve"], "z5"), vec!["Z5-001"]);
        assert_eq!(words.candidates(&["charge"], "m"), vec!["MC"]);
        assert_eq!(words.candidates(&["reserve", "3"], "ap"), vec!["apartment"]);
        assert!(words.candidates(&["reserve", "Z5-001"], "").is_empty());
        assert_eq!(words.candidates(&["charge", "3"], "--l"), vec!["--lift"]);
    }

    #[test]
    fn select_and_unit_follow_their_levels() {
        let words = words();
        assert_eq!(words.candidates(&["select", "unit"], "z3"), vec!["Z3-053-1B"]);
        assert_eq!(words.candidates(&["unit", "add", "Z9-1"], ""), vec!["3", "5", "MC"]);
        assert_eq!(words.candidates(&["unit", "set", "Z5-001"], "ow"), vec!["owner"]);
    }

    #[test]
    fn builtin_state_feeds_completion() {
        let home = tempdir().unwrap();
        let context = ShellContext::with_home(CliMode::Script, home.path().to_path_buf()).unwrap();
        let words = CompletionWords::from_context(&context);
        assert!(words.candidates(&[], "zone").contains(&"zones".to_string()));
        assert!(words.candidates(&["reserve-unit"], "z3-053").contains(&"Z3-053-1B".to_string()));
    }
}
