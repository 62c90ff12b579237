use mbay_domain::{PropertyType, PropertyUnit};
use tracing::debug;

use crate::{reference, CoreError};

/// In-memory unit inventory supporting the admin CRUD operations.
#[derive(Debug, Clone, Default)]
pub struct UnitRegistry {
    units: Vec<PropertyUnit>,
}

/// Outcome of merging externally supplied units into a registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub added: usize,
    pub replaced: usize,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the built-in Muscat Bay inventory.
    pub fn builtin() -> Self {
        Self {
            units: reference::builtin_units(),
        }
    }

    pub fn add(&mut self, unit: PropertyUnit) -> Result<(), CoreError> {
        if self.get(&unit.id).is_some() {
            return Err(CoreError::DuplicateUnit(unit.id));
        }
        debug!(unit = %unit.id, zone = %unit.zone_code, "registering unit");
        self.units.push(unit);
        Ok(())
    }

    /// Applies `update` to the unit with `id`. The id itself cannot change.
    pub fn update<F>(&mut self, id: &str, update: F) -> Result<(), CoreError>
    where
        F: FnOnce(&mut PropertyUnit),
    {
        let unit = self
            .units
            .iter_mut()
            .find(|unit| unit.id.eq_ignore_ascii_case(id))
            .ok_or_else(|| CoreError::UnitNotFound(id.to_string()))?;
        let original_id = unit.id.clone();
        update(&mut *unit);
        if unit.id != original_id {
            unit.id = original_id;
            return Err(CoreError::Validation(
                "unit identifiers cannot be changed".into(),
            ));
        }
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<PropertyUnit, CoreError> {
        let index = self
            .units
            .iter()
            .position(|unit| unit.id.eq_ignore_ascii_case(id))
            .ok_or_else(|| CoreError::UnitNotFound(id.to_string()))?;
        Ok(self.units.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&PropertyUnit> {
        self.units
            .iter()
            .find(|unit| unit.id.eq_ignore_ascii_case(id.trim()))
    }

    pub fn require(&self, id: &str) -> Result<&PropertyUnit, CoreError> {
        self.get(id)
            .ok_or_else(|| CoreError::UnitNotFound(id.trim().to_string()))
    }

    pub fn units(&self) -> &[PropertyUnit] {
        &self.units
    }

    pub fn in_zone<'a>(&'a self, zone_code: &'a str) -> impl Iterator<Item = &'a PropertyUnit> + 'a {
        self.units
            .iter()
            .filter(move |unit| unit.zone_code.eq_ignore_ascii_case(zone_code.trim()))
    }

    /// Units matching a zone, a property type, and optionally a building.
    pub fn filter<'a>(
        &'a self,
        zone_code: &'a str,
        property_type: PropertyType,
        building: Option<&'a str>,
    ) -> impl Iterator<Item = &'a PropertyUnit> + 'a {
        self.in_zone(zone_code).filter(move |unit| {
            unit.property_type == property_type
                && match building {
                    Some(name) => unit.building.as_deref() == Some(name),
                    None => true,
                }
        })
    }

    /// Inserts new units and replaces existing ones with the same id.
    pub fn merge(&mut self, units: Vec<PropertyUnit>) -> MergeSummary {
        let mut summary = MergeSummary::default();
        for unit in units {
            match self
                .units
                .iter_mut()
                .find(|existing| existing.id.eq_ignore_ascii_case(&unit.id))
            {
                Some(existing) => {
                    *existing = unit;
                    summary.replaced += 1;
                }
                None => {
                    self.units.push(unit);
                    summary.added += 1;
                }
            }
        }
        summary
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
