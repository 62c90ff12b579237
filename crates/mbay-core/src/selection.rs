//! Derived zone → property type → building → unit selection.
//!
//! Options at every level are computed from the registry and the current
//! [`Selection`]; nothing is cached, so there is no ordering to keep in sync.
//! Changing a level clears every level below it.

use std::collections::BTreeSet;

use mbay_domain::{PropertyType, PropertyUnit, Zone};

use crate::{CoreError, UnitRegistry};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    zone: Option<String>,
    property_type: Option<PropertyType>,
    building: Option<String>,
    unit_id: Option<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_zone(&mut self, code: impl Into<String>) {
        self.zone = Some(code.into());
        self.property_type = None;
        self.building = None;
        self.unit_id = None;
    }

    pub fn select_property_type(&mut self, property_type: PropertyType) {
        self.property_type = Some(property_type);
        self.building = None;
        self.unit_id = None;
    }

    pub fn select_building(&mut self, building: impl Into<String>) {
        self.building = Some(building.into());
        self.unit_id = None;
    }

    pub fn select_unit(&mut self, unit_id: impl Into<String>) {
        self.unit_id = Some(unit_id.into());
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn zone(&self) -> Option<&str> {
        self.zone.as_deref()
    }

    pub fn property_type(&self) -> Option<PropertyType> {
        self.property_type
    }

    pub fn building(&self) -> Option<&str> {
        self.building.as_deref()
    }

    pub fn unit_id(&self) -> Option<&str> {
        self.unit_id.as_deref()
    }
}

/// Read-only view computing the options available for a [`Selection`].
pub struct SelectionModel<'a> {
    zones: &'a [Zone],
    registry: &'a UnitRegistry,
}

impl<'a> SelectionModel<'a> {
    pub fn new(zones: &'a [Zone], registry: &'a UnitRegistry) -> Self {
        Self { zones, registry }
    }

    /// Zones that have at least one registered unit.
    pub fn zones(&self) -> Vec<&'a Zone> {
        self.zones
            .iter()
            .filter(|zone| self.registry.in_zone(&zone.code).next().is_some())
            .collect()
    }

    pub fn property_types(&self, selection: &Selection) -> Vec<PropertyType> {
        let Some(zone) = selection.zone() else {
            return Vec::new();
        };
        let types: BTreeSet<PropertyType> = self
            .registry
            .in_zone(zone)
            .map(|unit| unit.property_type)
            .collect();
        types.into_iter().collect()
    }

    /// Buildings for the selected zone and type. Empty when units are not grouped by building.
    pub fn buildings(&self, selection: &Selection) -> Vec<String> {
        let (Some(zone), Some(property_type)) = (selection.zone(), selection.property_type())
        else {
            return Vec::new();
        };
        let buildings: BTreeSet<String> = self
            .registry
            .filter(zone, property_type, None)
            .filter_map(|unit| unit.building.clone())
            .collect();
        buildings.into_iter().collect()
    }

    pub fn requires_building(&self, selection: &Selection) -> bool {
        !self.buildings(selection).is_empty()
    }

    pub fn units(&self, selection: &Selection) -> Vec<&'a PropertyUnit> {
        let (Some(zone), Some(property_type)) = (selection.zone(), selection.property_type())
        else {
            return Vec::new();
        };
        if self.requires_building(selection) && selection.building().is_none() {
            return Vec::new();
        }
        let registry: &'a UnitRegistry = self.registry;
        registry
            .units()
            .iter()
            .filter(|unit| {
                unit.zone_code.eq_ignore_ascii_case(zone)
                    && unit.property_type == property_type
                    && match selection.building() {
                        Some(name) => unit.building.as_deref() == Some(name),
                        None => true,
                    }
            })
            .collect()
    }

    /// Resolves the selection to a unit, naming the first missing level otherwise.
    pub fn resolve(&self, selection: &Selection) -> Result<&'a PropertyUnit, CoreError> {
        let zone = selection
            .zone()
            .ok_or_else(|| CoreError::Selection("select a zone".into()))?;
        if !self.zones.iter().any(|known| known.matches_code(zone)) {
            return Err(CoreError::UnknownZone(zone.to_string()));
        }
        if selection.property_type().is_none() {
            return Err(CoreError::Selection("select a property type".into()));
        }
        if self.requires_building(selection) && selection.building().is_none() {
            return Err(CoreError::Selection("select a building".into()));
        }
        let unit_id = selection
            .unit_id()
            .ok_or_else(|| CoreError::Selection("select a unit".into()))?;
        self.units(selection)
            .into_iter()
            .find(|unit| unit.id.eq_ignore_ascii_case(unit_id))
            .ok_or_else(|| CoreError::UnitNotFound(unit_id.to_string()))
    }
}
