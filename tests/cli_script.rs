mod common;

use predicates::prelude::*;
use predicates::str::contains;
use regex::Regex;

use common::{run_script, test_home};

#[test]
fn script_mode_prices_the_reference_apartment() {
    let home = test_home();
    let assert = run_script(&home, "reserve 3 apartment 199 2025\nexit\n").success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();

    assert!(stdout.contains("Zone 3 (Al Zaha) · Apartment · 199.00 sqm · 2025"));
    assert!(stdout.contains("OMR 764.160"), "{stdout}");
    let monthly = Regex::new(r"(?m)^Monthly\s+OMR 63\.680$").unwrap();
    assert!(monthly.is_match(&stdout), "{stdout}");
}

#[test]
fn unknown_zone_is_reported_without_crashing() {
    let home = test_home();
    run_script(&home, "reserve 9 villa 300 2025\nversion\n")
        .success()
        .stdout(contains("Unknown zone: 9"))
        .stdout(contains("Run `zones`"))
        .stdout(contains("CLI version"));
}

#[test]
fn invalid_bua_is_a_warning_not_a_result() {
    let home = test_home();
    run_script(&home, "charge 3 villa 0 2025\n")
        .success()
        .stdout(contains("BUA must be greater than 0"))
        .stdout(contains("Service charge").not());
}

#[test]
fn typos_get_a_suggestion() {
    let home = test_home();
    run_script(&home, "resrve 3 apartment 199\n")
        .success()
        .stdout(contains("Unknown command `resrve`"))
        .stdout(contains("Suggestion: `reserve`?"));
}

#[test]
fn saved_history_is_written_and_exported() {
    let home = test_home();
    let csv_path = home.join("export.csv");
    let input = format!(
        "charge Z5-001 2025\nsave villas\nreserve Z5-001 2025\nsave\nhistory\nexport-history {}\n",
        csv_path.display()
    );
    run_script(&home, &input)
        .success()
        .stdout(contains("Saved history `villas` (1 records)"))
        .stdout(contains("Saved history `villas` (2 records)"))
        .stdout(contains("Exported 2 records"));

    let json = std::fs::read_to_string(home.join("history").join("villas.json")).unwrap();
    assert!(json.contains("\"Z5-001\""));

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv.lines().count(), 3, "{csv}");
    assert!(csv.lines().nth(1).unwrap().contains("service-charge"));
}

#[test]
fn last_history_is_reloaded_on_the_next_run() {
    let home = test_home();
    run_script(&home, "reserve 8 villa 750 2025\nsave wajd\n").success();
    run_script(&home, "history\n")
        .success()
        .stdout(contains("History `wajd` (1 records)"));
}

#[test]
fn selection_walks_the_cascade_in_script_mode() {
    let home = test_home();
    run_script(
        &home,
        "select\nselect zone 3\nselect type apartment\nselect building 053\nselect unit Z3-053-1B\n",
    )
    .success()
    .stdout(contains("Next: select a zone"))
    .stdout(contains("Next: select a building"))
    .stdout(contains("Z3-053-1B · 1 Bedroom Apartment · 79.00 sqm"));
}

#[test]
fn config_rejects_unknown_rate_tables() {
    let home = test_home();
    run_script(
        &home,
        "config set rate_table rfs-1999\nconfig set rate_table rfs-2021-sqft\nversion\n",
    )
    .success()
    .stdout(contains("unknown rate table `rfs-1999`"))
    .stdout(contains("Rate table   : rfs-2021-sqft"));
}

#[test]
fn unit_command_edits_the_registry() {
    let home = test_home();
    run_script(
        &home,
        "unit add Z3-999-9 3 apartment 120 999 --lift\nunit add Z3-999-9 3 apartment 120\nunit set Z3-999-9 owner Jane Doe\nunit show Z3-999-9\nunit remove Z3-999-9\nunit show Z3-999-9\n",
    )
    .success()
    .stdout(contains("Registered unit Z3-999-9."))
    .stdout(contains("Unit already registered: Z3-999-9"))
    .stdout(contains("Owner: Jane Doe"))
    .stdout(contains("Removed unit Z3-999-9."))
    .stdout(contains("Unit not found: Z3-999-9"));
}

#[test]
fn saving_refuses_to_replace_a_book_with_the_same_file_name() {
    let home = test_home();
    run_script(
        &home,
        "reserve 3 apartment 199 2025\nsave villas 2025\nhistory new villas_2025\nreserve 3 apartment 199 2025\nsave\n",
    )
    .success()
    .stdout(contains("Saved history `villas 2025` (1 records)"))
    .stdout(contains("history `villas_2025` would overwrite `villas 2025`"));
    run_script(&home, "history load villas 2025\n")
        .success()
        .stdout(contains("Loaded history `villas 2025` (1 records)"));
}
