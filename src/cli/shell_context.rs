use dialoguer::theme::ColorfulTheme;
use mbay_config::{Config, ConfigManager};
use mbay_core::{RateTable, Selection, SelectionModel, UnitRegistry};
use mbay_domain::{CalculationHistory, OperatingExpense, ServiceChargeCalculation};
use mbay_storage_json::JsonCalculationStore;

use crate::currency::MoneyFormatter;

use super::registry::CommandRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub store: JsonCalculationStore,
    pub rate_table: RateTable,
    pub units: UnitRegistry,
    /// Operating-expense ledger used by `allocate` and `expenses`.
    pub expenses: Vec<OperatingExpense>,
    pub selection: Selection,
    /// Working history; persisted by `save`.
    pub history: CalculationHistory,
    pub last_record: Option<ServiceChargeCalculation>,
    pub money: MoneyFormatter,
    pub running: bool,
}

impl ShellContext {
    pub fn selection_model(&self) -> SelectionModel<'_> {
        SelectionModel::new(&self.rate_table.zones, &self.units)
    }
}
