use insta::assert_snapshot;
use mbay_core::{ChargeRequest, RateTable, ReserveFundService, ServiceChargeService};
use mbay_domain::{Area, PropertyType};
use muscat_bay::cli::report;
use muscat_bay::currency::MoneyFormatter;

fn zaha_apartment() -> ChargeRequest {
    ChargeRequest::new(
        "3",
        PropertyType::Apartment,
        Area::sqm(199.0).unwrap(),
        2025,
    )
}

#[test]
fn reserve_fund_report_lists_components_in_table_order() {
    let quote = ReserveFundService::quote(&RateTable::rfs_2025(), &zaha_apartment()).unwrap();
    let rendered = report::reserve_fund_report(&quote, &MoneyFormatter::default());
    assert_snapshot!(rendered, @r"
Zone 3 (Al Zaha) · Apartment · 199.00 sqm · 2025
 Component                    Rate     Area   Contribution
───────────────────────────────────────────────────────────
 Master Community   OMR 1.7500/sqm   199.00    OMR 348.250
 Zone 3 (Al Zaha)   OMR 0.4400/sqm   199.00     OMR 87.560
 Typical Building   OMR 1.6500/sqm   199.00    OMR 328.350
Subtotal     OMR 764.160
VAT          excluded
Annual       OMR 764.160
Quarterly    OMR 191.040
Monthly      OMR 63.680
");
}

#[test]
fn category_breakdown_splits_each_component() {
    let quote = ReserveFundService::quote(&RateTable::rfs_2025(), &zaha_apartment()).unwrap();
    let rendered = report::category_breakdown(&quote, &MoneyFormatter::default()).unwrap();
    let lines: Vec<&str> = rendered.lines().collect();
    // Header, rule, then 4 + 2 + 4 category rows.
    assert_eq!(lines.len(), 12);
    assert!(lines
        .iter()
        .any(|line| line.contains("Roads & Infrastructure") && line.ends_with("OMR 139.300")));
    assert!(lines
        .iter()
        .any(|line| line.starts_with(" Typical Building") && line.contains("Elevators")));
}

#[test]
fn service_charge_report_shows_every_billing_period() {
    let request = zaha_apartment().with_reserve(true);
    let quote = ServiceChargeService::quote(&RateTable::rfs_2025(), &request).unwrap();
    let rendered = report::service_charge_report(&quote, &MoneyFormatter::default());
    for label in ["Annual", "Quarterly", "Monthly"] {
        assert!(rendered.contains(label), "missing {label}:\n{rendered}");
    }
    assert!(rendered.contains("VAT"));
}
