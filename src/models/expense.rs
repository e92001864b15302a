//! Expense record model
//!
//! An expense record is the persisted snapshot of one allocation run: the
//! owner's share of a building's CAM costs for one billing period. Only the
//! status changes after creation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::allocation::CamSummary;
use super::ids::{BuildingId, ExpenseRecordId};
use super::money::Money;
use super::period::BillingPeriod;

/// Status of an expense record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseStatus {
    #[default]
    Pending,
    Approved,
    Paid,
    Cancelled,
}

impl ExpenseStatus {
    pub const ALL: [ExpenseStatus; 4] = [
        ExpenseStatus::Pending,
        ExpenseStatus::Approved,
        ExpenseStatus::Paid,
        ExpenseStatus::Cancelled,
    ];

    /// Parse a status from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "paid" => Some(Self::Paid),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Statuses reachable from this one under the strict policy
    pub fn strict_successors(&self) -> &'static [ExpenseStatus] {
        match self {
            Self::Pending => &[Self::Approved, Self::Paid, Self::Cancelled],
            Self::Approved => &[Self::Pending, Self::Paid, Self::Cancelled],
            Self::Paid => &[Self::Approved, Self::Cancelled],
            Self::Cancelled => &[],
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.strict_successors().is_empty()
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Approved => write!(f, "APPROVED"),
            Self::Paid => write!(f, "PAID"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Which status changes are accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Explicit transition table; CANCELLED is terminal
    #[default]
    Strict,
    /// Any status may be set to any other
    Permissive,
}

impl TransitionPolicy {
    pub fn allows(&self, from: ExpenseStatus, to: ExpenseStatus) -> bool {
        if from == to {
            return true;
        }
        match self {
            Self::Permissive => true,
            Self::Strict => from.strict_successors().contains(&to),
        }
    }
}

/// Uniqueness key for the duplicate-period guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeriodKey {
    pub building_id: BuildingId,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodKey {
    pub fn new(building_id: BuildingId, period: BillingPeriod) -> Self {
        Self {
            building_id,
            start: period.start,
            end: period.end,
        }
    }
}

/// Persisted allocation snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: ExpenseRecordId,
    pub building_id: BuildingId,
    pub building_name: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,

    /// Owner's CAM at creation time
    pub total_amount: Money,

    /// Owner's portion of each component
    pub generator_share: Money,
    pub transformer_share: Money,
    pub other_cam_share: Money,

    /// Operator-entered input, as given
    pub other_cam_costs: Money,

    pub total_vacant_area: f64,
    pub total_unallocated_area: f64,
    pub total_leasable_area: f64,
    pub total_cam_costs: Money,
    pub occupied_area: f64,
    pub occupied_units_count: usize,
    pub vacant_units_count: usize,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub status: ExpenseStatus,

    pub date_recorded: DateTime<Utc>,
}

impl ExpenseRecord {
    /// Snapshot an allocation result as a new PENDING record
    pub fn from_summary(summary: &CamSummary, description: impl Into<String>) -> Self {
        Self {
            id: ExpenseRecordId::new(),
            building_id: summary.building_id,
            building_name: summary.building_name.clone(),
            period_start: summary.period.start,
            period_end: summary.period.end,
            total_amount: summary.owner_cam,
            generator_share: summary.owner_shares.generator,
            transformer_share: summary.owner_shares.transformer,
            other_cam_share: summary.owner_shares.other_cam,
            other_cam_costs: summary.costs.other_cam_costs,
            total_vacant_area: summary.total_vacant_area,
            total_unallocated_area: summary.unallocated_area,
            total_leasable_area: summary.total_leasable_area,
            total_cam_costs: summary.total_cam_costs(),
            occupied_area: summary.total_occupied_area,
            occupied_units_count: summary.occupied_units_count,
            vacant_units_count: summary.vacant_units_count,
            description: description.into(),
            status: ExpenseStatus::Pending,
            date_recorded: Utc::now(),
        }
    }

    pub fn period(&self) -> BillingPeriod {
        BillingPeriod::new(self.period_start, self.period_end)
    }

    pub fn period_key(&self) -> PeriodKey {
        PeriodKey::new(self.building_id, self.period())
    }

    /// Tenants' share implied by the snapshot
    pub fn tenants_amount(&self) -> Money {
        self.total_cam_costs - self.total_amount
    }

    /// Default description used when the operator gives none
    pub fn default_description(building_name: &str, period: BillingPeriod) -> String {
        format!("Owner CAM share for {} ({})", building_name, period)
    }
}

impl fmt::Display for ExpenseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.id,
            self.building_name,
            self.period(),
            self.status
        )
    }
}
