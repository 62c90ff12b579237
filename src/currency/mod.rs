use serde::{Deserialize, Serialize};

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("OMR")
    }
}

/// Separators used when rendering numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleConfig {
    pub language_tag: String,
    pub decimal_separator: char,
    pub grouping_separator: char,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            language_tag: "en-OM".into(),
            decimal_separator: '.',
            grouping_separator: ',',
        }
    }
}

impl LocaleConfig {
    /// Maps a language tag to its separators. Unknown tags use the English defaults.
    pub fn from_tag(tag: &str) -> Self {
        let (decimal_separator, grouping_separator) = match tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str()
        {
            "de" | "nl" | "es" | "it" | "pt" => (',', '.'),
            "fr" => (',', ' '),
            _ => ('.', ','),
        };
        Self {
            language_tag: tag.to_string(),
            decimal_separator,
            grouping_separator,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormatOptions {
    pub currency_display: CurrencyDisplay,
    pub negative_style: NegativeStyle,
    /// Overrides the currency's minor units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u8>,
    pub screen_reader_mode: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            currency_display: CurrencyDisplay::Code,
            negative_style: NegativeStyle::Sign,
            precision: None,
            screen_reader_mode: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NegativeStyle {
    Sign,
    Parentheses,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CurrencyDisplay {
    Symbol,
    Code,
    SymbolAndCode,
}

pub fn symbol_for(code: &str) -> String {
    match code {
        "OMR" => "ر.ع.".into(),
        "AED" => "د.إ".into(),
        "USD" => "$".into(),
        "EUR" => "€".into(),
        "GBP" => "£".into(),
        _ => code.into(),
    }
}

pub fn minor_units_for(code: &str) -> u8 {
    match code {
        "JPY" => 0,
        "OMR" | "KWD" | "BHD" => 3,
        _ => 2,
    }
}

pub fn format_number(locale: &LocaleConfig, value: f64, precision: u8) -> String {
    let mut body = format!("{:.*}", precision as usize, value);
    if locale.decimal_separator != '.' {
        if let Some(pos) = body.find('.') {
            body.replace_range(pos..=pos, &locale.decimal_separator.to_string());
        }
    }
    if let Some(pos) = body.find(locale.decimal_separator) {
        let mut int_part = body[..pos].to_string();
        insert_grouping(&mut int_part, locale.grouping_separator);
        body = format!("{}{}", int_part, &body[pos..]);
    } else {
        insert_grouping(&mut body, locale.grouping_separator);
    }
    body
}

fn insert_grouping(int_part: &mut String, separator: char) {
    let mut cleaned = int_part.replace(separator, "");
    if cleaned.starts_with('-') {
        let sign = cleaned.remove(0);
        let grouped = group_digits(&cleaned, separator);
        *int_part = format!("{}{}", sign, grouped);
    } else {
        *int_part = group_digits(&cleaned, separator);
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

pub fn format_currency_value(
    amount: f64,
    code: &CurrencyCode,
    locale: &LocaleConfig,
    options: &FormatOptions,
) -> String {
    let precision = options
        .precision
        .unwrap_or_else(|| minor_units_for(code.as_str()));
    // Avoid printing "-0.000" for values that round to zero.
    let amount = if amount.abs() < 0.5 * 10f64.powi(-(precision as i32)) {
        0.0
    } else {
        amount
    };
    let mut body = format_number(locale, amount.abs(), precision);
    if amount < 0.0 {
        body = match options.negative_style {
            NegativeStyle::Sign => format!("-{}", body),
            NegativeStyle::Parentheses => format!("({})", body),
        };
    }
    let formatted = match options.currency_display {
        CurrencyDisplay::Symbol => format!("{} {}", symbol_for(code.as_str()), body),
        CurrencyDisplay::Code => format!("{} {}", code.as_str(), body),
        CurrencyDisplay::SymbolAndCode => {
            format!("{} {} ({})", symbol_for(code.as_str()), body, code.as_str())
        }
    };
    if options.screen_reader_mode && amount < 0.0 {
        format!(
            "minus {}",
            formatted.replace(['-', '(', ')'], "")
        )
    } else {
        formatted
    }
}

/// Formats amounts and per-area rates in the configured currency.
#[derive(Debug, Clone)]
pub struct MoneyFormatter {
    pub code: CurrencyCode,
    pub locale: LocaleConfig,
    pub options: FormatOptions,
}

impl Default for MoneyFormatter {
    fn default() -> Self {
        Self {
            code: CurrencyCode::default(),
            locale: LocaleConfig::default(),
            options: FormatOptions::default(),
        }
    }
}

impl MoneyFormatter {
    pub fn new(code: &str, locale_tag: &str, precision: Option<u8>) -> Self {
        Self {
            code: CurrencyCode::new(code),
            locale: LocaleConfig::from_tag(locale_tag),
            options: FormatOptions {
                precision,
                ..FormatOptions::default()
            },
        }
    }

    pub fn amount(&self, value: f64) -> String {
        format_currency_value(value, &self.code, &self.locale, &self.options)
    }

    /// Rates keep one more decimal than amounts so escalation stays visible.
    pub fn rate(&self, value: f64, unit: impl std::fmt::Display) -> String {
        let precision = self
            .options
            .precision
            .unwrap_or_else(|| minor_units_for(self.code.as_str()))
            + 1;
        format!(
            "{} {}/{}",
            self.code.as_str(),
            format_number(&self.locale, value, precision),
            unit
        )
    }

    pub fn number(&self, value: f64, precision: u8) -> String {
        format_number(&self.locale, value, precision)
    }
}
