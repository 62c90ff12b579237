use muscat_bay::currency::{
    format_currency_value, CurrencyCode, CurrencyDisplay, FormatOptions, LocaleConfig,
    MoneyFormatter, NegativeStyle,
};

#[test]
fn rial_amounts_use_three_decimals() {
    let money = MoneyFormatter::default();
    assert_eq!(money.amount(764.16), "OMR 764.160");
    assert_eq!(money.amount(1_389.0), "OMR 1,389.000");
    assert_eq!(money.rate(1.75, "sqm"), "OMR 1.7500/sqm");
}

#[test]
fn precision_override_applies_to_amounts_and_rates() {
    let money = MoneyFormatter::new("omr", "en-OM", Some(2));
    assert_eq!(money.code.as_str(), "OMR");
    assert_eq!(money.amount(63.68), "OMR 63.68");
    assert_eq!(money.rate(6.98, "sqm"), "OMR 6.980/sqm");
}

#[test]
fn formats_currency_with_locale() {
    let locale = LocaleConfig::from_tag("fr-FR");
    let options = FormatOptions {
        currency_display: CurrencyDisplay::Symbol,
        negative_style: NegativeStyle::Parentheses,
        precision: None,
        screen_reader_mode: false,
    };
    let code = CurrencyCode::new("EUR");
    let formatted = format_currency_value(-1234.5, &code, &locale, &options);
    assert_eq!(formatted, "€ (1 234,50)");
}

#[test]
fn tiny_negatives_do_not_print_a_sign() {
    let money = MoneyFormatter::default();
    assert_eq!(money.amount(-0.0001), "OMR 0.000");
    assert_eq!(money.amount(-12.5), "OMR -12.500");
}

#[test]
fn screen_reader_mode_spells_out_negatives() {
    let options = FormatOptions {
        screen_reader_mode: true,
        ..FormatOptions::default()
    };
    let formatted = format_currency_value(
        -2_500.0,
        &CurrencyCode::default(),
        &LocaleConfig::default(),
        &options,
    );
    assert_eq!(formatted, "minus OMR 2,500.000");
}
