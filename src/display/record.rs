//! Expense record display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::config::Settings;
use crate::models::{ExpenseRecord, Money};

use super::{format_area, format_money};

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Building")]
    building: String,
    #[tabled(rename = "Period")]
    period: String,
    #[tabled(rename = "Owner Share")]
    owner: String,
    #[tabled(rename = "Total CAM")]
    total: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Format a list of expense records as a table
pub fn format_record_list(records: &[ExpenseRecord], settings: &Settings) -> String {
    if records.is_empty() {
        return "No expense records found.\n".to_string();
    }

    let rows: Vec<RecordRow> = records
        .iter()
        .map(|r| RecordRow {
            id: r.id.to_string(),
            building: format!("{} ({})", r.building_name, r.building_id),
            period: r.period().to_string(),
            owner: format_money(r.total_amount, settings),
            total: format_money(r.total_cam_costs, settings),
            status: r.status.to_string(),
        })
        .collect();

    let total: Money = records.iter().map(|r| r.total_amount).sum();

    let mut output = Table::new(rows).with(Style::psql()).to_string();
    output.push_str(&format!(
        "\n{} record(s), owner total {}\n",
        records.len(),
        format_money(total, settings)
    ));
    output
}

/// Format expense record details for display
pub fn format_record_details(record: &ExpenseRecord, settings: &Settings) -> String {
    let mut output = String::new();

    output.push_str(&format!("Expense record: {}\n", record.id.as_uuid()));
    output.push_str(&format!(
        "Building:       {} ({})\n",
        record.building_name, record.building_id
    ));
    output.push_str(&format!(
        "Period:         {} ({} days)\n",
        record.period(),
        record.period().days()
    ));
    if record.status.is_terminal() {
        output.push_str(&format!("Status:         {} (final)\n", record.status));
    } else {
        output.push_str(&format!("Status:         {}\n", record.status));
    }
    output.push_str(&format!(
        "Recorded:       {}\n",
        record.date_recorded.format(&settings.date_format)
    ));
    if !record.description.is_empty() {
        output.push_str(&format!("Description:    {}\n", record.description));
    }

    output.push_str("\nOwner share\n");
    output.push_str(&format!(
        "  Generator:    {}\n",
        format_money(record.generator_share, settings)
    ));
    output.push_str(&format!(
        "  Transformer:  {}\n",
        format_money(record.transformer_share, settings)
    ));
    output.push_str(&format!(
        "  Other CAM:    {}\n",
        format_money(record.other_cam_share, settings)
    ));
    output.push_str(&format!(
        "  Total:        {}\n",
        format_money(record.total_amount, settings)
    ));

    output.push_str("\nBuilding totals\n");
    output.push_str(&format!(
        "  CAM costs:    {} (other CAM input {})\n",
        format_money(record.total_cam_costs, settings),
        format_money(record.other_cam_costs, settings)
    ));
    output.push_str(&format!(
        "  Tenants:      {}\n",
        format_money(record.tenants_amount(), settings)
    ));
    output.push_str(&format!(
        "  Leasable:     {}\n",
        format_area(record.total_leasable_area, settings)
    ));
    output.push_str(&format!(
        "  Occupied:     {} ({} units)\n",
        format_area(record.occupied_area, settings),
        record.occupied_units_count
    ));
    output.push_str(&format!(
        "  Vacant:       {} ({} units)\n",
        format_area(record.total_vacant_area, settings),
        record.vacant_units_count
    ));
    output.push_str(&format!(
        "  Unallocated:  {}\n",
        format_area(record.total_unallocated_area, settings)
    ));

    output
}
