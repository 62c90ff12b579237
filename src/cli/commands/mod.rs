pub mod browse;
pub mod calculate;
pub mod config;
pub mod expenses;
pub mod history;
pub mod system;

use crate::cli::registry::CommandRegistry;

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    let definitions = system::definitions()
        .into_iter()
        .chain(browse::definitions())
        .chain(calculate::definitions())
        .chain(expenses::definitions())
        .chain(history::definitions())
        .chain(config::definitions());
    for entry in definitions {
        registry.register(entry);
    }
}
