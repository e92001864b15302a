//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod allocation;
pub mod directory;
pub mod record;

pub use allocation::{handle_allocation_command, AllocationArgs, AllocationCommands};
pub use directory::{handle_directory_command, DirectoryCommands};
pub use record::{handle_audit_command, handle_record_command, RecordCommands};

use crate::config::Settings;
use crate::error::{CamError, CamResult};
use crate::models::{BillingPeriod, BuildingId, ExpenseStatus, Money};
use crate::services::{AccessPolicy, ExpenseService};
use crate::storage::Storage;

/// Everything a command handler needs
pub struct CliContext<'a> {
    pub storage: &'a Storage,
    pub settings: &'a Settings,
    pub access: &'a dyn AccessPolicy,
}

impl<'a> CliContext<'a> {
    /// Expense service configured from settings and the caller's scope
    pub fn expense_service(&self) -> ExpenseService<'a> {
        ExpenseService::new(self.storage)
            .with_policy(self.settings.status_transitions)
            .with_access(self.access)
    }
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> CamResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| CamError::Json(e.to_string()))
}

pub(crate) fn parse_building(s: &str) -> CamResult<BuildingId> {
    s.parse()
        .map_err(|_| CamError::Validation(format!("Invalid building id: '{}'", s)))
}

pub(crate) fn parse_period(s: &str) -> CamResult<BillingPeriod> {
    BillingPeriod::parse(s).map_err(|e| CamError::Validation(e.to_string()))
}

pub(crate) fn parse_money(s: &str) -> CamResult<Money> {
    Money::parse(s).map_err(|e| {
        CamError::Validation(format!(
            "Invalid amount: '{}'. Use a format like '1500.00' or '1,500'. Error: {}",
            s, e
        ))
    })
}

pub(crate) fn parse_status(s: &str) -> CamResult<ExpenseStatus> {
    ExpenseStatus::parse(s).ok_or_else(|| {
        CamError::Validation(format!(
            "Invalid status: '{}'. Valid statuses: pending, approved, paid, cancelled",
            s
        ))
    })
}
