//! Directory snapshot display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::config::Settings;
use crate::models::VACANT_LABEL;
use crate::services::directory::OccupancyLookup;
use crate::storage::DirectorySnapshot;

use super::{format_area, format_money};

#[derive(Tabled)]
struct BuildingRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Leasable")]
    leasable: String,
    #[tabled(rename = "Units")]
    units: usize,
    #[tabled(rename = "Generator")]
    generator: String,
    #[tabled(rename = "Transformer")]
    transformer: String,
}

#[derive(Tabled)]
struct UnitRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Building")]
    building: String,
    #[tabled(rename = "Unit")]
    number: String,
    #[tabled(rename = "Area")]
    area: String,
    #[tabled(rename = "Tenant")]
    tenant: String,
}

/// Format the building directory, optionally with every unit
pub fn format_directory<O: OccupancyLookup + ?Sized>(
    snapshot: &DirectorySnapshot,
    occupancy: &O,
    show_units: bool,
    settings: &Settings,
) -> String {
    if snapshot.buildings.is_empty() {
        return "No buildings in the directory. Run 'camledger directory import <file>'.\n"
            .to_string();
    }

    let rows: Vec<BuildingRow> = snapshot
        .buildings
        .iter()
        .map(|b| BuildingRow {
            id: b.id.to_string(),
            name: b.display_name(),
            leasable: format_area(b.total_leasable_area, settings),
            units: snapshot.units.iter().filter(|u| u.building_id == b.id).count(),
            generator: format_money(b.generator_fee, settings),
            transformer: format_money(b.transformer_fee, settings),
        })
        .collect();

    let mut output = Table::new(rows).with(Style::psql()).to_string();
    output.push('\n');

    if show_units && !snapshot.units.is_empty() {
        let rows: Vec<UnitRow> = snapshot
            .units
            .iter()
            .map(|u| UnitRow {
                id: u.id.to_string(),
                building: u.building_id.to_string(),
                number: u.unit_number.clone(),
                area: format!("{:.2}", u.unit_space),
                tenant: occupancy
                    .tenant_name(u.id)
                    .ok()
                    .flatten()
                    .unwrap_or_else(|| VACANT_LABEL.to_string()),
            })
            .collect();
        output.push('\n');
        output.push_str(&Table::new(rows).with(Style::psql()).to_string());
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Building, BuildingId, Money, Unit, UnitId};
    use crate::services::directory::fakes::FakeDirectory;

    #[test]
    fn test_empty_directory() {
        let text = format_directory(
            &DirectorySnapshot::default(),
            &FakeDirectory::default(),
            false,
            &Settings::default(),
        );
        assert!(text.contains("No buildings"));
    }

    #[test]
    fn test_directory_with_units() {
        let building = Building {
            id: BuildingId::new(7),
            name: "Harbour Mall".into(),
            total_leasable_area: 5_000.0,
            generator_fee: Money::from_major(500),
            transformer_fee: Money::zero(),
        };
        let unit = Unit {
            id: UnitId::new(1),
            building_id: BuildingId::new(7),
            unit_number: "G-01".into(),
            unit_space: 1_000.0,
        };
        let fake = FakeDirectory::default()
            .with_building(building.clone())
            .with_unit(unit.clone(), Some("Acme Stores"));
        let snapshot = DirectorySnapshot {
            buildings: vec![building],
            units: vec![unit],
            leases: vec![],
        };

        let text = format_directory(&snapshot, &fake, true, &Settings::default());
        assert!(text.contains("Harbour Mall"));
        assert!(text.contains("5000.00 sq ft"));
        assert!(text.contains("G-01"));
        assert!(text.contains("Acme Stores"));
    }
}
