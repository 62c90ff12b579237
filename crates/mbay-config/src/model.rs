use std::{fmt, path::PathBuf};

use serde::{de::Deserializer, Deserialize, Serialize};

pub const DEFAULT_RATE_TABLE: &str = "rfs-2025";
pub const DEFAULT_CURRENCY: &str = "OMR";

/// User preferences for calculations and shell output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    /// Year used when a command does not name one. `None` means the current year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_year: Option<i32>,
    #[serde(default)]
    pub include_vat_in_reserve: bool,
    #[serde(default = "Config::default_rate_table")]
    pub rate_table: String,
    /// Overrides the currency's minor units when formatting amounts.
    #[serde(default)]
    pub currency_precision: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_history: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom data directory. Defaults to `~/Documents/MuscatBay`.
    pub data_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-OM".into(),
            currency: DEFAULT_CURRENCY.into(),
            theme: Theme::default(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            default_year: None,
            include_vat_in_reserve: false,
            rate_table: Self::default_rate_table(),
            currency_precision: None,
            last_history: None,
            data_root: None,
        }
    }
}

impl Config {
    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn default_rate_table() -> String {
        DEFAULT_RATE_TABLE.into()
    }

    pub fn resolve_data_root(&self) -> PathBuf {
        if let Some(path) = &self.data_root {
            return path.clone();
        }

        let base = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("MuscatBay")
    }

    /// Calculation year to use, falling back to `current_year`.
    pub fn year_or(&self, current_year: i32) -> i32 {
        self.default_year.unwrap_or(current_year)
    }

    /// Applies a `key=value` style change from the shell.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        let value = value.trim();
        match key.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "locale" => self.locale = value.to_string(),
            "currency" => self.currency = value.to_ascii_uppercase(),
            "theme" => self.theme = Theme::parse(value),
            "ui_color_enabled" | "color" => self.ui_color_enabled = parse_bool(value)?,
            "default_year" | "year" => {
                self.default_year = if value.is_empty() || value == "none" {
                    None
                } else {
                    Some(value.parse().map_err(|_| format!("invalid year `{value}`"))?)
                }
            }
            "include_vat_in_reserve" | "reserve_vat" => {
                self.include_vat_in_reserve = parse_bool(value)?
            }
            "rate_table" | "table" => self.rate_table = value.to_ascii_lowercase(),
            "currency_precision" | "precision" => {
                self.currency_precision = if value.is_empty() || value == "none" {
                    None
                } else {
                    Some(
                        value
                            .parse()
                            .map_err(|_| format!("invalid precision `{value}`"))?,
                    )
                }
            }
            "data_root" => {
                self.data_root = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                }
            }
            other => return Err(format!("unknown setting `{other}`")),
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(format!("expected a boolean, got `{other}`")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Plain,
    #[default]
    Iconic,
}

impl Theme {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "plain" => Theme::Plain,
            _ => Theme::Iconic,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Theme::Plain => "plain",
            Theme::Iconic => "iconic",
        };
        f.write_str(label)
    }
}

// Unknown or missing themes fall back to the default instead of failing the whole file.
impl<'de> Deserialize<'de> for Theme {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.map(|v| Theme::parse(&v)).unwrap_or_default())
    }
}
