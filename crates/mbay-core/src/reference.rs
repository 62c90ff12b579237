//! Built-in Muscat Bay reference data: zones, reserve fund components, service
//! rates, and the registered unit inventory.

use mbay_domain::{
    Area, ExpenseStatus, OperatingExpense, PropertyType, PropertyUnit, Zone, MASTER_COMMUNITY_CODE,
};

use crate::rates::{CategoryShare, ComponentRate, RateTable, ReserveComponent, ServiceRate};

/// Zone code, display name, sector, and the property type used for the zone's headline rates.
const ZONES: &[(&str, &str, &str, PropertyType)] = &[
    ("1", "Zone 1 (Staff Accommodation & CF)", "Staff Accommodation", PropertyType::Staff),
    ("2", "Zone 2 (Village Square)", "Village Square", PropertyType::Commercial),
    ("3", "Zone 3 (Al Zaha)", "Al Zaha", PropertyType::Villa),
    ("5", "Zone 5 (Al Nameer)", "Al Nameer", PropertyType::Villa),
    ("8", "Zone 8 (Al Wajd)", "Al Wajd", PropertyType::Villa),
    (MASTER_COMMUNITY_CODE, "Master Community", "Master Community", PropertyType::Commercial),
];

const PREMIUM_BUILDINGS: &[&str] = &[
    "044", "045", "046", "047", "048", "049", "050", "051", "052", "062", "074", "075",
];
const SMALL_BUILDINGS: &[&str] = &["053", "054", "055", "056", "057", "058", "059", "060", "061"];

const NAMEER_THREE_BEDROOM: &[u32] = &[2, 4, 7, 9, 21, 24, 27];
const WAJD_VILLA_BUA: &[f64] = &[
    750.0, 750.0, 750.0, 750.0, 943.0, 760.0, 750.0, 760.0, 1187.0, 760.0, 750.0, 760.0, 760.0,
    760.0, 760.0, 760.0, 750.0, 760.0, 750.0, 760.0, 750.0,
];

pub(crate) fn reserve_components_2025() -> Vec<ComponentRate> {
    vec![
        ComponentRate::new(ReserveComponent::MasterCommunity, "Master Community", 1.75)
            .excluding("1")
            .with_categories(vec![
                CategoryShare::new("Roads & Infrastructure", 0.40),
                CategoryShare::new("Landscaping", 0.20),
                CategoryShare::new("Utilities", 0.30),
                CategoryShare::new("Other", 0.10),
            ]),
        ComponentRate::new(ReserveComponent::Zone, "Staff Accommodation", 3.95).for_zone("1"),
        ComponentRate::new(ReserveComponent::Zone, "Zone 2 (Commercial)", 0.0).for_zone("2"),
        ComponentRate::new(ReserveComponent::Zone, "Zone 3 (Al Zaha)", 0.44)
            .for_zone("3")
            .with_categories(vec![
                CategoryShare::new("Zone 3 Infrastructure", 0.50),
                CategoryShare::new("Zone 3 Amenities", 0.50),
            ]),
        ComponentRate::new(ReserveComponent::Zone, "Zone 5 (Al Nameer)", 1.10).for_zone("5"),
        ComponentRate::new(ReserveComponent::Zone, "Zone 8 (Al Wajd)", 0.33).for_zone("8"),
        ComponentRate::new(ReserveComponent::TypicalBuilding, "Typical Building", 1.65)
            .for_zone("3")
            .for_property_type(PropertyType::Apartment)
            .with_categories(vec![
                CategoryShare::new("Elevators", 0.30),
                CategoryShare::new("Common HVAC", 0.30),
                CategoryShare::new("Finishes", 0.20),
                CategoryShare::new("Other", 0.20),
            ]),
    ]
}

/// OMR per square foot from the 2021 reserve fund study.
pub(crate) fn study_components_2021() -> Vec<ComponentRate> {
    vec![
        ComponentRate::new(ReserveComponent::Zone, "Zone 3 (Zaha)", 0.04).for_zone("3"),
        ComponentRate::new(ReserveComponent::Zone, "Zone 5 (Nameer)", 0.10).for_zone("5"),
        ComponentRate::new(ReserveComponent::Zone, "Zone 8 (Wajd)", 0.03).for_zone("8"),
        ComponentRate::new(ReserveComponent::Zone, "Staff Accommodation & CF", 0.36).for_zone("1"),
        ComponentRate::new(ReserveComponent::Zone, "Zone 2 (Commercial)", 0.16).for_zone("2"),
        ComponentRate::new(ReserveComponent::MasterCommunity, "Master Community", 0.16)
            .for_zone(MASTER_COMMUNITY_CODE),
    ]
}

pub(crate) fn service_rates_2025() -> Vec<ServiceRate> {
    vec![
        ServiceRate::new("1", PropertyType::Staff, 9.00),
        ServiceRate::new("3", PropertyType::Apartment, 9.00),
        ServiceRate::new("3", PropertyType::Villa, 6.98),
        ServiceRate::new("5", PropertyType::Villa, 6.98),
        ServiceRate::new("8", PropertyType::Villa, 6.98),
    ]
}

/// Builds the zone list for `table`, with totals taken from the built-in inventory.
pub(crate) fn zones(table: &RateTable) -> Vec<Zone> {
    let units = builtin_units();
    ZONES
        .iter()
        .map(|(code, name, _, headline_type)| {
            let in_zone: Vec<&PropertyUnit> = units
                .iter()
                .filter(|unit| unit.zone_code == *code)
                .collect();
            let total_bua = in_zone.iter().map(|unit| unit.bua.square_metres()).sum();
            let service_rate = table
                .service_rates
                .iter()
                .find(|rate| rate.zone == *code && rate.property_type == *headline_type)
                .map(|rate| rate.rate)
                .unwrap_or(0.0);
            Zone::new(*code, *name)
                .with_totals(total_bua, in_zone.len() as u32)
                .with_rates(service_rate, table.reserve_rate(code, *headline_type))
        })
        .collect()
}

fn sector_for(zone_code: &str) -> &'static str {
    ZONES
        .iter()
        .find(|(code, ..)| *code == zone_code)
        .map(|(_, _, sector, _)| *sector)
        .unwrap_or("")
}

fn area(value: f64) -> Area {
    Area::sqm(value).expect("reference BUA values are positive")
}

fn unit(id: String, zone: &str, property_type: PropertyType, unit_type: &str, bua: f64) -> PropertyUnit {
    PropertyUnit::new(id, zone, property_type, area(bua))
        .with_unit_type(unit_type)
        .with_sector(sector_for(zone))
}

/// The registered Muscat Bay unit inventory.
pub fn builtin_units() -> Vec<PropertyUnit> {
    let mut units = Vec::new();

    for index in 1..=8 {
        let building = format!("B{index}");
        units.push(
            unit(format!("FM-B{index}"), "1", PropertyType::Staff, &format!("Staff Building B{index}"), 1615.44)
                .with_unit_no(format!("FM B{index}"))
                .in_building(building),
        );
    }
    units.push(
        unit("FM-CIF".into(), "1", PropertyType::Staff, "CIF Building", 548.5)
            .with_unit_no("FM CIF")
            .in_building("CIF"),
    );

    for (suffix, label, bua) in [
        ("01", "Commercial Unit (Spar)", 150.0),
        ("02", "Commercial Unit (Laundry)", 80.0),
        ("03", "Commercial Unit (Gym)", 200.0),
    ] {
        units.push(unit(format!("Z2-VS-{suffix}"), "2", PropertyType::Commercial, label, bua));
    }

    for number in 1..=43u32 {
        let (label, bua) = if (17..=30).contains(&number) {
            ("3 Bedroom Zaha Villa", 357.0)
        } else {
            ("4 Bedroom Zaha Villa", 422.0)
        };
        units.push(unit(format!("Z3-{number:03}"), "3", PropertyType::Villa, label, bua));
    }

    for building in PREMIUM_BUILDINGS {
        let name = format!("Building {building}");
        for slot in 1..=4 {
            units.push(apartment(building, &name, &slot.to_string(), "2 Bedroom Premium Apartment", 199.0));
        }
        units.push(apartment(building, &name, "5", "3 Bedroom Zaha Apartment", 355.0));
        units.push(apartment(building, &name, "6", "3 Bedroom Zaha Apartment", 361.0));
    }

    for building in SMALL_BUILDINGS {
        let name = format!("Building {building}");
        for floor in 1..=4 {
            units.push(apartment(building, &name, &format!("{floor}A"), "2 Bedroom Small Apartment", 115.0));
            units.push(apartment(building, &name, &format!("{floor}B"), "1 Bedroom Apartment", 79.0));
        }
        units.push(apartment(building, &name, "5", "3 Bedroom Zaha Apartment", 355.0));
        units.push(apartment(building, &name, "6", "3 Bedroom Zaha Apartment", 361.0));
    }

    for number in 1..=33u32 {
        let (label, bua) = if NAMEER_THREE_BEDROOM.contains(&number) {
            ("3 Bedroom Nameer Villa", 427.0)
        } else {
            ("4 Bedroom Nameer Villa", 498.0)
        };
        units.push(unit(format!("Z5-{number:03}"), "5", PropertyType::Villa, label, bua));
    }

    for (index, bua) in WAJD_VILLA_BUA.iter().enumerate() {
        units.push(unit(
            format!("Z8-{:03}", index + 1),
            "8",
            PropertyType::Villa,
            "5 Bedroom Wajd Villa",
            *bua,
        ));
    }
    units.push(unit("Z8-022".into(), "8", PropertyType::Villa, "King Villa", 1845.0));

    units
}

/// Category, provider, service, annual cost and status of the maintenance contracts.
const CONTRACTS: &[(&str, &str, &str, f64, ExpenseStatus)] = &[
    ("Lift Maintenance", "KONE Assarain LLC", "Lift Maintenance Services", 11550.0, ExpenseStatus::Active),
    ("STP Operation", "OWATCO", "Comprehensive STP Operation and Maintenance", 37245.4, ExpenseStatus::Active),
    ("Facility Management", "Kalhat", "Facility Management (FM)", 386409.718, ExpenseStatus::Active),
    ("Water Metering", "Future Cities S.A.O.C (Tadoom)", "Smart Water Meters and Billing", 184.3, ExpenseStatus::Active),
    ("Pest Control", "Muna Noor International LLC", "Pest Control Services", 16000.0, ExpenseStatus::Active),
    ("HVAC", "Gulf Expert", "Chillers, BMS & Pressurisation Units", 7234.5, ExpenseStatus::Active),
    ("Fire Safety", "Bahwan Engineering Company LLC", "Fire Alarm & Fire Fighting Equipment", 7612.5, ExpenseStatus::Active),
    ("HVAC", "Gulf Expert", "BMS AMC FM & Staff Accommodation", 26460.0, ExpenseStatus::Active),
    ("Marine Services", "National Marine Services LLC", "Diving Services", 57093.12, ExpenseStatus::Active),
    ("Security", "Al Khalili", "CCTV Contract", 13995.66, ExpenseStatus::Active),
    ("STP Operation", "Celar Water", "Comprehensive STP Operation and Maintenance", 53268.0, ExpenseStatus::Expired),
];

/// The operating-expense ledger used when no expenses have been imported.
pub fn builtin_expenses(year: i32) -> Vec<OperatingExpense> {
    CONTRACTS
        .iter()
        .enumerate()
        .map(|(index, (category, provider, service, annual, status))| {
            let mut expense =
                OperatingExpense::annual(format!("EXP-{:03}", index + 1), *category, *provider, *annual, year)
                    .with_status(*status);
            expense.service_type = (*service).to_string();
            if expense.is_lift_related() {
                expense.allocation = "Lift units only".into();
            }
            expense
        })
        .collect()
}

fn apartment(building: &str, name: &str, slot: &str, unit_type: &str, bua: f64) -> PropertyUnit {
    unit(format!("Z3-{building}-{slot}"), "3", PropertyType::Apartment, unit_type, bua)
        .with_unit_no(format!("Z3 {building}({slot})"))
        .in_building(name)
        .with_lift(true)
}
