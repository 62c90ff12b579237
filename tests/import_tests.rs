use assert_fs::prelude::*;
use assert_fs::TempDir;
use mbay_core::{ChargeRequest, RateTable, ReserveFundService};
use mbay_domain::{Area, CalculationHistory, ExpenseStatus, PropertyType};
use muscat_bay::import::{export_history, import_expenses, import_units};

#[test]
fn unit_import_skips_bad_rows_and_keeps_the_rest() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("units.csv");
    file.write_str(
        "id,zone,property_type,bua,building,has_lift\n\
         Z3-900-1,3,apartment,199,Building 900,yes\n\
         Z9-001,9,villa,400,,\n\
         Z5-900,5,villa,0,,\n\
         Z3-900-1,3,apartment,199,Building 900,yes\n\
         Z8-900,8,villa,760.5,,no\n",
    )
    .unwrap();

    let zones = RateTable::rfs_2025().zones;
    let report = import_units(file.path(), &zones).unwrap();

    assert_eq!(report.imported(), 2);
    let lines: Vec<usize> = report.errors.iter().map(|row| row.line).collect();
    assert_eq!(lines, vec![3, 4, 5]);
    assert!(report.errors[0].message.contains("unknown zone `9`"));
    assert!(report.errors[1].message.contains("greater than 0"));
    assert!(report.errors[2].message.contains("duplicate unit id"));

    let apartment = &report.records[0];
    assert_eq!(apartment.building.as_deref(), Some("Building 900"));
    assert!(apartment.has_lift);
    assert_eq!(report.records[1].bua.square_metres(), 760.5);
}

#[test]
fn expense_import_derives_annual_cost_and_default_year() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("expenses.csv");
    file.write_str(
        "category,service_provider,monthly_cost,annual_cost,status,year\n\
         Lift Maintenance,KONE,962.5,,active,\n\
         Security,Al Khalili,,\"13,995.66\",expired,2024\n\
         Landscaping,Unknown,,,active,\n",
    )
    .unwrap();

    let report = import_expenses(file.path(), 2025).unwrap();

    assert_eq!(report.imported(), 2);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.errors[0].line, 4);

    let lift = &report.records[0];
    assert!((lift.annual_cost - 11_550.0).abs() < 1e-9);
    assert_eq!(lift.year, 2025);
    assert!(lift.is_lift_related());
    assert_eq!(lift.id, "CSV-0002");

    let security = &report.records[1];
    assert_eq!(security.status, ExpenseStatus::Expired);
    assert_eq!(security.year, 2024);
}

#[test]
fn missing_required_columns_fail_the_whole_file() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("expenses.csv");
    file.write_str("category,annual_cost\nHVAC,7234.5\n").unwrap();

    let err = import_expenses(file.path(), 2025).unwrap_err();
    assert!(err.to_string().contains("service_provider"));
}

#[test]
fn history_export_writes_one_row_per_record() {
    let temp = TempDir::new().unwrap();
    let table = RateTable::rfs_2025();
    let mut history = CalculationHistory::new("zaha");
    for bua in [199.0, 355.0] {
        let request = ChargeRequest::new(
            "3",
            PropertyType::Apartment,
            Area::sqm(bua).unwrap(),
            2025,
        );
        let quote = ReserveFundService::quote(&table, &request).unwrap();
        history.push(quote.to_record());
    }

    let target = temp.child("exports/zaha.csv");
    let rows = export_history(&history, target.path()).unwrap();
    assert_eq!(rows, 2);

    target.assert(predicates::str::starts_with("id,kind,property_id,calculated_at,zone,year"));
    target.assert(predicates::str::contains("reserve-fund"));

    let csv = std::fs::read_to_string(target.path()).unwrap();
    let first = csv.lines().nth(1).unwrap();
    let total: f64 = first.split(',').nth(15).unwrap().parse().unwrap();
    assert!((total - 764.16).abs() < 1e-6, "{first}");
}
