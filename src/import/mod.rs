//! CSV import of property units and operating expenses, and CSV export of
//! calculation history.
//!
//! Imports are row-tolerant: a row that fails validation is reported with its
//! line number and skipped, the rest of the file is still imported. Structural
//! problems (unreadable file, missing required column) fail the whole import.

use std::{collections::HashSet, io, path::Path};

use csv::{ReaderBuilder, StringRecord, Trim};
use mbay_domain::{
    Area, CalculationHistory, ExpenseStatus, OperatingExpense, PropertyType, PropertyUnit,
    UnitStatus, Zone,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::{FacilityError, Result};

const UNIT_COLUMNS: &[&str] = &["id", "zone", "property_type", "bua"];
const EXPENSE_COLUMNS: &[&str] = &["category", "service_provider"];

/// A rejected CSV row. `line` counts the header as line 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

#[derive(Debug, Clone)]
pub struct ImportReport<T> {
    pub records: Vec<T>,
    pub errors: Vec<RowError>,
}

impl<T> ImportReport<T> {
    pub fn imported(&self) -> usize {
        self.records.len()
    }

    pub fn skipped(&self) -> usize {
        self.errors.len()
    }
}

#[derive(Debug, Deserialize)]
struct UnitRow {
    id: String,
    zone: String,
    property_type: String,
    bua: String,
    #[serde(default)]
    unit_no: Option<String>,
    #[serde(default)]
    sector: Option<String>,
    #[serde(default)]
    building: Option<String>,
    #[serde(default)]
    unit_type: Option<String>,
    #[serde(default)]
    has_lift: Option<String>,
    #[serde(default)]
    owner: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExpenseRow {
    #[serde(default)]
    id: Option<String>,
    category: String,
    service_provider: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    service_type: Option<String>,
    #[serde(default)]
    monthly_cost: Option<String>,
    #[serde(default)]
    annual_cost: Option<String>,
    #[serde(default)]
    allocation: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    year: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

/// Reads property units from `path`. Zone codes must name one of `zones`.
pub fn import_units(path: &Path, zones: &[Zone]) -> Result<ImportReport<PropertyUnit>> {
    let file = std::fs::File::open(path)
        .map_err(|err| FacilityError::Csv(format!("failed to open {}: {err}", path.display())))?;
    let report = read_units(file, zones)?;
    info!(
        path = %path.display(),
        imported = report.imported(),
        skipped = report.skipped(),
        "units imported"
    );
    Ok(report)
}

pub fn read_units<R: io::Read>(reader: R, zones: &[Zone]) -> Result<ImportReport<PropertyUnit>> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = reader.headers()?.clone();
    require_columns(&headers, UNIT_COLUMNS)?;

    let mut seen = HashSet::new();
    let mut report = ImportReport {
        records: Vec::new(),
        errors: Vec::new(),
    };
    for (index, row) in reader.deserialize::<UnitRow>().enumerate() {
        let line = index + 2;
        let parsed = row
            .map_err(|err| describe_csv_error(&err))
            .and_then(|row| unit_from_row(row, zones));
        match parsed {
            Ok(unit) if !seen.insert(unit.id.to_ascii_lowercase()) => {
                skip_row(&mut report.errors, line, format!("duplicate unit id `{}`", unit.id));
            }
            Ok(unit) => report.records.push(unit),
            Err(message) => skip_row(&mut report.errors, line, message),
        }
    }
    Ok(report)
}

fn unit_from_row(row: UnitRow, zones: &[Zone]) -> std::result::Result<PropertyUnit, String> {
    if row.id.is_empty() {
        return Err("unit id is empty".into());
    }
    let zone = zones
        .iter()
        .find(|zone| zone.matches_code(&row.zone))
        .ok_or_else(|| format!("unknown zone `{}`", row.zone))?;
    let property_type: PropertyType = row.property_type.parse()?;
    let bua: Area = row.bua.parse().map_err(|err: mbay_domain::AreaError| err.to_string())?;

    let mut unit = PropertyUnit::new(row.id, zone.code.clone(), property_type, bua)
        .with_lift(parse_flag(row.has_lift.as_deref())?);
    if let Some(unit_no) = non_empty(row.unit_no) {
        unit = unit.with_unit_no(unit_no);
    }
    if let Some(sector) = non_empty(row.sector) {
        unit = unit.with_sector(sector);
    }
    if let Some(building) = non_empty(row.building) {
        unit = unit.in_building(building);
    }
    if let Some(unit_type) = non_empty(row.unit_type) {
        unit = unit.with_unit_type(unit_type);
    }
    if let Some(owner) = non_empty(row.owner) {
        unit = unit.with_owner(owner);
    }
    let status: UnitStatus = row.status.as_deref().unwrap_or_default().parse()?;
    Ok(unit.with_status(status))
}

/// Reads operating expenses from `path`. Rows without a year are assigned `default_year`.
pub fn import_expenses(path: &Path, default_year: i32) -> Result<ImportReport<OperatingExpense>> {
    let file = std::fs::File::open(path)
        .map_err(|err| FacilityError::Csv(format!("failed to open {}: {err}", path.display())))?;
    let report = read_expenses(file, default_year)?;
    info!(
        path = %path.display(),
        imported = report.imported(),
        skipped = report.skipped(),
        "operating expenses imported"
    );
    Ok(report)
}

pub fn read_expenses<R: io::Read>(
    reader: R,
    default_year: i32,
) -> Result<ImportReport<OperatingExpense>> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = reader.headers()?.clone();
    require_columns(&headers, EXPENSE_COLUMNS)?;

    let mut report = ImportReport {
        records: Vec::new(),
        errors: Vec::new(),
    };
    for (index, row) in reader.deserialize::<ExpenseRow>().enumerate() {
        let line = index + 2;
        let parsed = row
            .map_err(|err| describe_csv_error(&err))
            .and_then(|row| expense_from_row(row, line, default_year));
        match parsed {
            Ok(expense) => report.records.push(expense),
            Err(message) => skip_row(&mut report.errors, line, message),
        }
    }
    Ok(report)
}

fn expense_from_row(
    row: ExpenseRow,
    line: usize,
    default_year: i32,
) -> std::result::Result<OperatingExpense, String> {
    if row.category.is_empty() {
        return Err("category is empty".into());
    }
    let monthly = parse_cost("monthly_cost", row.monthly_cost.as_deref())?;
    let annual = parse_cost("annual_cost", row.annual_cost.as_deref())?;
    let annual_cost = match (annual, monthly) {
        (Some(annual), _) => annual,
        (None, Some(monthly)) => monthly * 12.0,
        (None, None) => return Err("either monthly_cost or annual_cost is required".into()),
    };
    let year = match non_empty(row.year) {
        Some(raw) => raw
            .parse()
            .map_err(|_| format!("invalid year `{raw}`"))?,
        None => default_year,
    };
    let status: ExpenseStatus = row.status.as_deref().unwrap_or_default().parse()?;
    let id = non_empty(row.id).unwrap_or_else(|| format!("CSV-{line:04}"));

    let mut expense =
        OperatingExpense::annual(id, row.category, row.service_provider, annual_cost, year)
            .with_status(status);
    if let Some(monthly) = monthly {
        expense.monthly_cost = monthly;
    }
    if let Some(allocation) = non_empty(row.allocation) {
        expense.allocation = allocation;
    }
    expense.description = row.description.unwrap_or_default();
    expense.service_type = row.service_type.unwrap_or_default();
    expense.notes = non_empty(row.notes);
    Ok(expense)
}

#[derive(Debug, Serialize)]
struct HistoryRow<'a> {
    id: String,
    kind: String,
    property_id: &'a str,
    calculated_at: String,
    zone: &'a str,
    year: i32,
    property_size: f64,
    has_lift: bool,
    base_rate: f64,
    lift_rate: f64,
    reserve_rate: f64,
    operating_share: f64,
    lift_share: f64,
    reserve_contribution: f64,
    vat: f64,
    total_annual: f64,
    quarterly: f64,
    monthly: f64,
}

/// Writes every record of `history` to a CSV file; returns the number of rows written.
pub fn export_history(history: &CalculationHistory, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let rows = write_history(history, file)?;
    info!(history = %history.name, path = %path.display(), rows, "history exported");
    Ok(rows)
}

pub fn write_history<W: io::Write>(history: &CalculationHistory, writer: W) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(writer);
    for record in &history.records {
        writer.serialize(HistoryRow {
            id: record.id.to_string(),
            kind: record.kind.to_string(),
            property_id: record.property_id.as_deref().unwrap_or(""),
            calculated_at: record.calculated_at.to_rfc3339(),
            zone: &record.zone_code,
            year: record.year,
            property_size: record.property_size,
            has_lift: record.has_lift_access,
            base_rate: record.base_rate,
            lift_rate: record.lift_rate,
            reserve_rate: record.reserve_rate,
            operating_share: record.operating_share,
            lift_share: record.lift_share,
            reserve_contribution: record.reserve_contribution,
            vat: record.vat,
            total_annual: record.total_annual,
            quarterly: record.quarterly,
            monthly: record.monthly,
        })?;
    }
    writer.flush()?;
    Ok(history.records.len())
}

fn require_columns(headers: &StringRecord, required: &[&str]) -> Result<()> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|header| header == *column))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(FacilityError::Csv(format!(
            "missing required column(s): {}",
            missing.join(", ")
        )))
    }
}

fn skip_row(errors: &mut Vec<RowError>, line: usize, message: String) {
    warn!(line, %message, "skipping CSV row");
    errors.push(RowError { line, message });
}

fn describe_csv_error(err: &csv::Error) -> String {
    match err.kind() {
        csv::ErrorKind::Deserialize { err, .. } => err.to_string(),
        _ => err.to_string(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn parse_flag(value: Option<&str>) -> std::result::Result<bool, String> {
    match value.unwrap_or_default().trim().to_ascii_lowercase().as_str() {
        "" | "no" | "n" | "false" | "0" => Ok(false),
        "yes" | "y" | "true" | "1" => Ok(true),
        other => Err(format!("invalid has_lift value `{other}`")),
    }
}

fn parse_cost(column: &str, value: Option<&str>) -> std::result::Result<Option<f64>, String> {
    let Some(raw) = value.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    let cost: f64 = raw
        .replace(',', "")
        .parse()
        .map_err(|_| format!("{column} `{raw}` is not a number"))?;
    if !cost.is_finite() || cost < 0.0 {
        return Err(format!("{column} must be zero or positive (got {raw})"));
    }
    Ok(Some(cost))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_common_spellings() {
        assert_eq!(parse_flag(Some("Yes")), Ok(true));
        assert_eq!(parse_flag(Some("")), Ok(false));
        assert_eq!(parse_flag(None), Ok(false));
        assert!(parse_flag(Some("maybe")).is_err());
    }

    #[test]
    fn costs_allow_grouping_and_reject_negatives() {
        assert_eq!(parse_cost("annual_cost", Some("11,550")), Ok(Some(11550.0)));
        assert_eq!(parse_cost("annual_cost", Some("  ")), Ok(None));
        assert!(parse_cost("annual_cost", Some("-3")).is_err());
        assert!(parse_cost("monthly_cost", Some("2.7 per meter")).is_err());
    }

    #[test]
    fn missing_columns_fail_the_import() {
        let data = "id,zone,bua\nZ3-001,3,100\n";
        let err = read_units(data.as_bytes(), &[]).unwrap_err();
        assert!(err.to_string().contains("property_type"));
    }
}
