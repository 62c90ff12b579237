use colored::Colorize;
use std::fmt;
use std::sync::{OnceLock, RwLock};

use mbay_config::{Config, Theme};

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Hint,
    Section,
    Plain,
}

#[derive(Clone, Copy, Debug)]
pub struct OutputPreferences {
    pub color_enabled: bool,
    /// Drops the `[i]`/`[!]` markers and section rules.
    pub plain_mode: bool,
}

impl Default for OutputPreferences {
    fn default() -> Self {
        Self {
            color_enabled: true,
            plain_mode: false,
        }
    }
}

static PREFERENCES: OnceLock<RwLock<OutputPreferences>> = OnceLock::new();

pub fn set_preferences(prefs: OutputPreferences) {
    let lock = PREFERENCES.get_or_init(|| RwLock::new(OutputPreferences::default()));
    if let Ok(mut guard) = lock.write() {
        *guard = prefs;
    }
    if !prefs.color_enabled || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    } else {
        colored::control::unset_override();
    }
}

pub fn current_preferences() -> OutputPreferences {
    PREFERENCES
        .get_or_init(|| RwLock::new(OutputPreferences::default()))
        .read()
        .map(|guard| *guard)
        .unwrap_or_default()
}

/// Derives output preferences from the persisted configuration.
pub fn apply_config(config: &Config) {
    set_preferences(OutputPreferences {
        color_enabled: config.ui_color_enabled,
        plain_mode: config.theme == Theme::Plain,
    });
}

fn build_label(kind: MessageKind, plain: bool) -> &'static str {
    if plain {
        return "";
    }
    match kind {
        MessageKind::Info => "[i]",
        MessageKind::Success => "[✓]",
        MessageKind::Warning => "[!]",
        MessageKind::Error => "[x]",
        MessageKind::Hint => "[?]",
        MessageKind::Section | MessageKind::Plain => "",
    }
}

fn apply_style(kind: MessageKind, message: impl fmt::Display, prefs: &OutputPreferences) -> String {
    let text = message.to_string();

    let formatted = match kind {
        MessageKind::Section if prefs.plain_mode => text.trim().to_string(),
        MessageKind::Section => format!("=== {} ===", text.trim()),
        MessageKind::Plain => text,
        _ => {
            let icon = build_label(kind, prefs.plain_mode);
            if icon.is_empty() {
                text
            } else {
                format!("{icon} {text}")
            }
        }
    };

    match kind {
        MessageKind::Success => formatted.bright_green().to_string(),
        MessageKind::Warning => formatted.bright_yellow().to_string(),
        MessageKind::Error => formatted.bright_red().to_string(),
        MessageKind::Hint => formatted.bright_cyan().to_string(),
        MessageKind::Section => formatted.bold().to_string(),
        MessageKind::Info | MessageKind::Plain => formatted,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let prefs = current_preferences();
    let formatted = apply_style(kind, message, &prefs);
    // Errors and warnings stay on stdout so script transcripts keep their order.
    match kind {
        MessageKind::Section => println!("\n{}", formatted),
        _ => println!("{}", formatted),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn hint(message: impl fmt::Display) {
    print(MessageKind::Hint, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// Prints pre-rendered text (tables, reports) line by line without decoration.
pub fn block(text: &str) {
    for line in text.lines() {
        print(MessageKind::Plain, line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_mode_drops_markers() {
        colored::control::set_override(false);
        let prefs = OutputPreferences {
            color_enabled: false,
            plain_mode: true,
        };
        assert_eq!(apply_style(MessageKind::Warning, "careful", &prefs), "careful");
        assert_eq!(apply_style(MessageKind::Section, " Zones ", &prefs), "Zones");

        let iconic = OutputPreferences {
            plain_mode: false,
            ..prefs
        };
        assert_eq!(apply_style(MessageKind::Error, "boom", &iconic), "[x] boom");
        assert_eq!(apply_style(MessageKind::Section, "Zones", &iconic), "=== Zones ===");
    }
}
