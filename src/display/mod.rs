//! Display formatting for terminal output
//!
//! Formats allocation previews, expense records and the building directory
//! as plain-text tables.

pub mod allocation;
pub mod directory;
pub mod record;

pub use allocation::format_allocation_summary;
pub use directory::format_directory;
pub use record::{format_record_details, format_record_list};

use crate::config::Settings;
use crate::models::Money;

/// Money with the configured currency symbol
pub fn format_money(amount: Money, settings: &Settings) -> String {
    amount.format_with_symbol(&settings.currency_symbol)
}

/// Area with the configured unit label
pub fn format_area(area: f64, settings: &Settings) -> String {
    format!("{:.2} {}", area, settings.area_unit)
}
