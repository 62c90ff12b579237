//! Property units registered in the development.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::common::*;

/// Broad property classification used for rate lookups.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyType {
    Apartment,
    Villa,
    Commercial,
    Staff,
}

impl PropertyType {
    pub const ALL: [PropertyType; 4] = [
        PropertyType::Apartment,
        PropertyType::Villa,
        PropertyType::Commercial,
        PropertyType::Staff,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PropertyType::Apartment => "Apartment",
            PropertyType::Villa => "Villa",
            PropertyType::Commercial => "Commercial",
            PropertyType::Staff => "Staff Accommodation",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "apartment" | "apt" | "flat" => Ok(PropertyType::Apartment),
            "villa" => Ok(PropertyType::Villa),
            "commercial" | "retail" => Ok(PropertyType::Commercial),
            "staff" | "staff accommodation" | "staff-accommodation" => Ok(PropertyType::Staff),
            other => Err(format!("unknown property type `{other}`")),
        }
    }
}

/// Occupancy/handover status of a unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum UnitStatus {
    #[default]
    Occupied,
    Vacant,
    HandedOver,
    UnderConstruction,
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UnitStatus::Occupied => "Occupied",
            UnitStatus::Vacant => "Vacant",
            UnitStatus::HandedOver => "Handed Over",
            UnitStatus::UnderConstruction => "Under Construction",
        };
        f.write_str(label)
    }
}

impl FromStr for UnitStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "" | "occupied" => Ok(UnitStatus::Occupied),
            "vacant" => Ok(UnitStatus::Vacant),
            "handedover" => Ok(UnitStatus::HandedOver),
            "underconstruction" => Ok(UnitStatus::UnderConstruction),
            _ => Err(format!("unknown unit status `{}`", s.trim())),
        }
    }
}

/// A billable unit. Created and edited through the registry; calculations only read it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyUnit {
    pub id: String,
    pub unit_no: String,
    pub zone_code: String,
    pub sector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    pub property_type: PropertyType,
    /// Descriptive label such as "2 Bedroom Premium Apartment".
    pub unit_type: String,
    pub bua: Area,
    #[serde(default)]
    pub has_lift: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default)]
    pub status: UnitStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handover_date: Option<NaiveDate>,
}

impl PropertyUnit {
    pub fn new(
        id: impl Into<String>,
        zone_code: impl Into<String>,
        property_type: PropertyType,
        bua: Area,
    ) -> Self {
        let id = id.into();
        Self {
            unit_no: id.replace('-', " "),
            id,
            zone_code: zone_code.into(),
            sector: String::new(),
            building: None,
            property_type,
            unit_type: property_type.label().to_string(),
            bua,
            has_lift: false,
            owner: None,
            status: UnitStatus::default(),
            handover_date: None,
        }
    }

    pub fn with_unit_no(mut self, unit_no: impl Into<String>) -> Self {
        self.unit_no = unit_no.into();
        self
    }

    pub fn with_unit_type(mut self, unit_type: impl Into<String>) -> Self {
        self.unit_type = unit_type.into();
        self
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = sector.into();
        self
    }

    pub fn in_building(mut self, building: impl Into<String>) -> Self {
        self.building = Some(building.into());
        self
    }

    pub fn with_lift(mut self, has_lift: bool) -> Self {
        self.has_lift = has_lift;
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_status(mut self, status: UnitStatus) -> Self {
        self.status = status;
        self
    }
}

impl Displayable for PropertyUnit {
    fn display_label(&self) -> String {
        format!("{} - {}", self.unit_no, self.unit_type)
    }
}
