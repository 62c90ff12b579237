use mbay_domain::{
    Area, CalculationHistory, CalculationKind, ExpenseStatus, OperatingExpense, PropertyType,
    PropertyUnit,
};

use crate::{
    storage::history_warnings, AllocationRequest, ChargeRequest, CoreError, ExpenseService,
    RateTable, ReserveComponent, ReserveFundService, Selection, SelectionModel,
    ServiceChargeService, UnitRegistry,
};

fn sqm(value: f64) -> Area {
    Area::sqm(value).expect("valid area")
}

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-6
}

#[test]
fn zaha_apartment_reserve_fund_matches_published_rates() {
    let table = RateTable::rfs_2025();
    let request = ChargeRequest::new("3", PropertyType::Apartment, sqm(199.0), 2025);
    let quote = ReserveFundService::quote(&table, &request).expect("quote");

    let master = quote.line(ReserveComponent::MasterCommunity).expect("master line");
    let zone = quote.line(ReserveComponent::Zone).expect("zone line");
    let building = quote.line(ReserveComponent::TypicalBuilding).expect("building line");
    assert!(close(master.rate_applied, 1.75));
    assert!(close(zone.rate_applied, 0.44));
    assert!(close(building.rate_applied, 1.65));

    assert!(close(quote.total_annual, 764.16), "total {}", quote.total_annual);
    assert!(close(quote.monthly, 63.68), "monthly {}", quote.monthly);
    assert_eq!(quote.vat, 0.0);
}

#[test]
fn reserve_fund_vat_is_opt_in() {
    let table = RateTable::rfs_2025();
    let request = ChargeRequest::new("3", PropertyType::Apartment, sqm(199.0), 2025).with_vat(true);
    let quote = ReserveFundService::quote(&table, &request).expect("quote");
    assert!(close(quote.vat, 764.16 * 0.05));
    assert!(close(quote.total_annual, 764.16 * 1.05));
}

#[test]
fn category_shares_split_each_component() {
    let table = RateTable::rfs_2025();
    let request = ChargeRequest::new("3", PropertyType::Apartment, sqm(199.0), 2025);
    let quote = ReserveFundService::quote(&table, &request).expect("quote");
    for line in quote.breakdown.iter().filter(|line| !line.categories.is_empty()) {
        let shared: f64 = line.categories.iter().map(|c| c.amount).sum();
        assert!(close(shared, line.contribution), "{}", line.name);
    }
}

#[test]
fn staff_accommodation_skips_master_community() {
    let table = RateTable::rfs_2025();
    let request = ChargeRequest::new("1", PropertyType::Staff, sqm(100.0), 2025);
    let quote = ReserveFundService::quote(&table, &request).expect("quote");
    assert!(quote.line(ReserveComponent::MasterCommunity).is_none());
    assert!(close(quote.total_annual, 395.0));
}

#[test]
fn commercial_zone_only_pays_master_community() {
    let table = RateTable::rfs_2025();
    let request = ChargeRequest::new("2", PropertyType::Commercial, sqm(100.0), 2025);
    let quote = ReserveFundService::quote(&table, &request).expect("quote");
    assert_eq!(quote.breakdown.len(), 1);
    assert!(close(quote.total_annual, 175.0));
}

#[test]
fn study_table_bills_per_square_foot() {
    let table = RateTable::rfs_2021_sqft();
    let request = ChargeRequest::new("5", PropertyType::Villa, sqm(100.0), 2021);
    let quote = ReserveFundService::quote(&table, &request).expect("quote");
    assert!(close(quote.area, 1076.39));
    assert!(close(quote.total_annual, 107.639));
    let per_sqm =
        ReserveFundService::rate_per_sqm(&table, "5", PropertyType::Villa, 2021).expect("rate");
    assert!(close(per_sqm * 100.0, quote.total_annual));
}

#[test]
fn escalation_ratio_is_constant_year_over_year() {
    let table = RateTable::rfs_2025();
    let totals: Vec<f64> = (2021..=2035)
        .map(|year| {
            let request = ChargeRequest::new("8", PropertyType::Villa, sqm(750.0), year);
            ReserveFundService::quote(&table, &request).expect("quote").total_annual
        })
        .collect();
    for pair in totals.windows(2) {
        assert!((pair[1] / pair[0] - 1.005).abs() < 1e-12);
    }
}

#[test]
fn service_charge_total_never_below_base_charge() {
    let table = RateTable::rfs_2025();
    let mut priced = 0;
    for zone in &table.zones {
        for property_type in PropertyType::ALL {
            for bua in [0.5, 79.0, 199.0, 1845.0] {
                for year in [2021, 2025, 2040] {
                    let request = ChargeRequest::new(zone.code.clone(), property_type, sqm(bua), year)
                        .with_lift(property_type == PropertyType::Apartment)
                        .with_reserve(true);
                    let Ok(quote) = ServiceChargeService::quote(&table, &request) else {
                        continue;
                    };
                    priced += 1;
                    assert!(quote.annual.total >= quote.annual.base_charge);
                    assert!((quote.monthly.total * 12.0 - quote.annual.total).abs() < 1e-9);
                    assert!((quote.quarterly.total * 4.0 - quote.annual.total).abs() < 1e-9);
                }
            }
        }
    }
    assert!(priced > 0);
}

#[test]
fn invalid_bua_is_rejected_before_calculation() {
    for bua in [0.0, -12.5, f64::INFINITY] {
        let err = ChargeRequest::from_raw("3", PropertyType::Villa, bua, 2025).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)), "{bua}");
    }
}

#[test]
fn unknown_zone_and_early_year_are_errors() {
    let table = RateTable::rfs_2025();
    let unknown = ChargeRequest::new("9", PropertyType::Villa, sqm(100.0), 2025);
    assert!(matches!(
        ReserveFundService::quote(&table, &unknown),
        Err(CoreError::UnknownZone(code)) if code == "9"
    ));
    assert!(matches!(
        ServiceChargeService::quote(&table, &unknown),
        Err(CoreError::UnknownZone(_))
    ));

    let early = ChargeRequest::new("3", PropertyType::Villa, sqm(100.0), 2020);
    assert!(matches!(
        ReserveFundService::quote(&table, &early),
        Err(CoreError::Validation(_))
    ));
}

fn portfolio() -> Vec<PropertyUnit> {
    vec![
        PropertyUnit::new("A-1", "3", PropertyType::Apartment, sqm(100.0)).with_lift(true),
        PropertyUnit::new("V-1", "3", PropertyType::Villa, sqm(300.0)),
    ]
}

fn ledger() -> Vec<OperatingExpense> {
    vec![
        OperatingExpense::annual("e1", "Cleaning", "Tadoom", 4000.0, 2025),
        OperatingExpense::annual("e2", "Lift Maintenance", "Otis", 1000.0, 2025)
            .with_allocation("Lift units only"),
        OperatingExpense::annual("e3", "Security", "G4S", 2000.0, 2025)
            .with_status(ExpenseStatus::Expired),
    ]
}

#[test]
fn allocation_splits_lift_and_non_lift_costs() {
    let units = portfolio();
    let request = AllocationRequest::for_unit(&units[0], 2025, 2.0);
    let result = ExpenseService::allocate(&ledger(), &units, &request).expect("allocate");

    assert!(close(result.total_expenses, 5000.0));
    assert!(close(result.lift_expenses, 1000.0));
    assert!(close(result.record.base_rate, 10.0));
    assert!(close(result.record.lift_rate, 10.0));
    assert!(close(result.record.operating_share, 1000.0));
    assert!(close(result.record.lift_share, 1000.0));
    assert!(close(result.record.reserve_contribution, 200.0));
    assert!(close(result.record.total_annual, 2200.0));
    assert_eq!(result.record.kind, CalculationKind::ExpenseAllocation);
    assert_eq!(result.breakdown.len(), 2);
    assert!(result.breakdown.iter().all(|item| item.applicable));
}

#[test]
fn lift_costs_are_not_billed_without_lift_access() {
    let units = portfolio();
    let request = AllocationRequest::for_unit(&units[1], 2025, 0.0);
    let result = ExpenseService::allocate(&ledger(), &units, &request).expect("allocate");

    let lift = result
        .breakdown
        .iter()
        .find(|item| item.category == "Lift Maintenance")
        .expect("lift line");
    assert!(!lift.applicable);
    assert_eq!(lift.amount, 0.0);
    assert_eq!(result.record.lift_share, 0.0);
    assert!(close(result.record.total_annual, 3000.0));
}

#[test]
fn forklift_rental_stays_in_the_shared_pool() {
    let units = portfolio();
    let expenses = vec![
        OperatingExpense::annual("e1", "Cleaning", "Tadoom", 4000.0, 2025),
        OperatingExpense::annual("e2", "Forklift Rental", "Acme", 1000.0, 2025),
    ];
    let request = AllocationRequest::for_unit(&units[1], 2025, 0.0);
    let result = ExpenseService::allocate(&expenses, &units, &request).expect("allocate");

    assert_eq!(result.lift_expenses, 0.0);
    assert!(close(result.record.base_rate, 12.5));
    let forklift = result
        .breakdown
        .iter()
        .find(|item| item.category == "Forklift Rental")
        .expect("forklift line");
    assert!(forklift.applicable);
    assert!(close(forklift.amount, 750.0));
    assert!(close(result.record.total_annual, 3750.0));
}

#[test]
fn allocation_requires_a_portfolio() {
    let request = AllocationRequest::new("3", 2025, sqm(100.0));
    let err = ExpenseService::allocate(&ledger(), &[], &request).unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

#[test]
fn category_percentages_sum_to_one_hundred() {
    let summary = ExpenseService::category_summary(&ledger());
    assert_eq!(summary[0].category, "Cleaning");
    assert!(close(summary[0].percentage, 80.0));
    let total: f64 = summary.iter().map(|row| row.percentage).sum();
    assert!(close(total, 100.0));

    let expired_only = vec![ledger().remove(2)];
    assert!(ExpenseService::category_summary(&expired_only).is_empty());
}

#[test]
fn zone_summary_averages_over_units() {
    let table = RateTable::rfs_2025();
    let summary = ExpenseService::zone_summary(&table.zones);
    let wajd = summary.iter().find(|row| row.zone_code == "8").expect("zone 8");
    assert!(close(wajd.total_annual_charge, wajd.total_bua * 6.98));
    assert!(close(wajd.average_charge, wajd.total_annual_charge / 22.0));
    let master = summary.iter().find(|row| row.zone_code == "MC").expect("MC");
    assert_eq!(master.average_charge, 0.0);
}

#[test]
fn selection_cascade_clears_dependents() {
    let table = RateTable::rfs_2025();
    let registry = UnitRegistry::builtin();
    let model = SelectionModel::new(&table.zones, &registry);
    let mut selection = Selection::new();

    assert!(matches!(model.resolve(&selection), Err(CoreError::Selection(_))));
    selection.select_zone("3");
    assert_eq!(
        model.property_types(&selection),
        vec![PropertyType::Apartment, PropertyType::Villa]
    );
    selection.select_property_type(PropertyType::Apartment);
    assert!(model.buildings(&selection).contains(&"Building 044".to_string()));
    assert!(model.units(&selection).is_empty());
    assert!(matches!(model.resolve(&selection), Err(CoreError::Selection(_))));

    selection.select_building("Building 044");
    assert_eq!(model.units(&selection).len(), 6);
    selection.select_unit("Z3-044-1");
    let unit = model.resolve(&selection).expect("resolved");
    assert_eq!(unit.bua.square_metres(), 199.0);

    selection.select_zone("5");
    assert_eq!(selection.property_type(), None);
    assert_eq!(selection.building(), None);
    assert_eq!(selection.unit_id(), None);
}

#[test]
fn villas_resolve_without_a_building() {
    let table = RateTable::rfs_2025();
    let registry = UnitRegistry::builtin();
    let model = SelectionModel::new(&table.zones, &registry);
    let mut selection = Selection::new();
    selection.select_zone("5");
    selection.select_property_type(PropertyType::Villa);
    assert!(!model.requires_building(&selection));
    assert_eq!(model.units(&selection).len(), 33);
    selection.select_unit("z5-002");
    assert_eq!(model.resolve(&selection).expect("unit").bua.square_metres(), 427.0);
}

#[test]
fn selection_with_unknown_zone_reports_it() {
    let table = RateTable::rfs_2025();
    let registry = UnitRegistry::builtin();
    let model = SelectionModel::new(&table.zones, &registry);
    let mut selection = Selection::new();
    selection.select_zone("42");
    assert!(matches!(model.resolve(&selection), Err(CoreError::UnknownZone(_))));
    assert!(model.property_types(&selection).is_empty());
}

#[test]
fn registry_supports_crud() {
    let mut registry = UnitRegistry::new();
    let unit = PropertyUnit::new("Z9-001", "5", PropertyType::Villa, sqm(400.0));
    registry.add(unit.clone()).expect("add");
    assert!(matches!(registry.add(unit), Err(CoreError::DuplicateUnit(_))));

    registry
        .update("z9-001", |unit| unit.owner = Some("Owner A".into()))
        .expect("update");
    assert_eq!(
        registry.require("Z9-001").expect("present").owner.as_deref(),
        Some("Owner A")
    );
    assert!(matches!(
        registry.update("Z9-001", |unit| unit.id = "other".into()),
        Err(CoreError::Validation(_))
    ));
    assert!(registry.get("Z9-001").is_some());

    registry.remove("Z9-001").expect("remove");
    assert!(registry.is_empty());
    assert!(matches!(registry.remove("Z9-001"), Err(CoreError::UnitNotFound(_))));
}

#[test]
fn registry_merge_counts_replacements() {
    let mut registry = UnitRegistry::builtin();
    let before = registry.len();
    let summary = registry.merge(vec![
        PropertyUnit::new("Z5-001", "5", PropertyType::Villa, sqm(500.0)),
        PropertyUnit::new("Z5-900", "5", PropertyType::Villa, sqm(450.0)),
    ]);
    assert_eq!(summary.added, 1);
    assert_eq!(summary.replaced, 1);
    assert_eq!(registry.len(), before + 1);
    assert_eq!(registry.require("Z5-001").unwrap().bua.square_metres(), 500.0);
}

#[test]
fn history_warnings_detect_inconsistent_records() {
    let table = RateTable::rfs_2025();
    let request = ChargeRequest::new("5", PropertyType::Villa, sqm(427.0), 2025);
    let record = ReserveFundService::quote(&table, &request).expect("quote").to_record();

    let mut history = CalculationHistory::new("checks");
    history.push(record.clone());
    assert!(history_warnings(&history).is_empty());

    let mut broken = record.clone();
    broken.monthly = 1.0;
    history.push(record);
    history.push(broken);
    let warnings = history_warnings(&history);
    assert!(warnings.iter().any(|w| w.contains("more than once")));
    assert!(warnings.iter().any(|w| w.contains("monthly instalment")));
}
