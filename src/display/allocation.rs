//! Allocation summary display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::config::Settings;
use crate::models::{CamSummary, Money, UnitAllocation};

use super::{format_area, format_money};

#[derive(Tabled)]
struct UnitRow {
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Tenant")]
    tenant: String,
    #[tabled(rename = "Area")]
    area: String,
    #[tabled(rename = "%")]
    percentage: String,
    #[tabled(rename = "Generator")]
    generator: String,
    #[tabled(rename = "Transformer")]
    transformer: String,
    #[tabled(rename = "Other CAM")]
    other: String,
    #[tabled(rename = "CAM Share")]
    share: String,
}

impl UnitRow {
    fn new(unit: &UnitAllocation, settings: &Settings) -> Self {
        Self {
            unit: unit.unit_number.clone(),
            tenant: unit.tenant_name.clone(),
            area: format!("{:.2}", unit.unit_space),
            percentage: format!("{:.2}", unit.percentage_of_leasable_area),
            generator: format_money(unit.generator_share, settings),
            transformer: format_money(unit.transformer_share, settings),
            other: format_money(unit.other_cam_share, settings),
            share: format_money(unit.cam_share, settings),
        }
    }
}

#[derive(Tabled)]
struct SplitRow {
    #[tabled(rename = "Component")]
    component: &'static str,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Tenants")]
    tenants: String,
    #[tabled(rename = "Owner")]
    owner: String,
}

fn split_row(component: &'static str, total: Money, owner: Money, settings: &Settings) -> SplitRow {
    SplitRow {
        component,
        total: format_money(total, settings),
        tenants: format_money(total - owner, settings),
        owner: format_money(owner, settings),
    }
}

/// Format a full allocation preview: area breakdown, cost split and units
pub fn format_allocation_summary(summary: &CamSummary, settings: &Settings) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "CAM allocation: {} ({})\n",
        summary.building_name, summary.building_id
    ));
    output.push_str(&format!("Period:        {}\n\n", summary.period));

    output.push_str(&format!(
        "Leasable area:    {}\n",
        format_area(summary.total_leasable_area, settings)
    ));
    output.push_str(&format!(
        "  Occupied:       {} ({:.2}%, {} units)\n",
        format_area(summary.total_occupied_area, settings),
        summary.occupied_percentage,
        summary.occupied_units_count
    ));
    output.push_str(&format!(
        "  Vacant:         {} ({:.2}%, {} units)\n",
        format_area(summary.total_vacant_area, settings),
        summary.vacant_percentage,
        summary.vacant_units_count
    ));
    output.push_str(&format!(
        "  Unallocated:    {} ({:.2}%)\n",
        format_area(summary.unallocated_area, settings),
        summary.unallocated_percentage
    ));
    output.push_str(&format!(
        "Cost per {}:  {}{:.4}\n\n",
        settings.area_unit, settings.currency_symbol, summary.cost_per_area_unit
    ));

    let owner = &summary.owner_shares;
    let costs = &summary.costs;
    let split = vec![
        split_row("Generator", costs.generator_fee, owner.generator, settings),
        split_row("Transformer", costs.transformer_fee, owner.transformer, settings),
        split_row("Other CAM", costs.other_cam_costs, owner.other_cam, settings),
        split_row("Total", costs.total, summary.owner_cam, settings),
    ];
    output.push_str(&Table::new(split).with(Style::psql()).to_string());
    output.push_str("\n\n");

    let rows: Vec<UnitRow> = summary
        .units
        .iter()
        .map(|u| UnitRow::new(u, settings))
        .collect();
    output.push_str(&Table::new(rows).with(Style::psql()).to_string());
    output.push('\n');

    output
}
