//! Core data models for CAM Ledger
//!
//! This module contains the data structures of the allocation domain:
//! buildings and units (read from the directory), allocation inputs and
//! results, and persisted expense records.

pub mod allocation;
pub mod building;
pub mod expense;
pub mod ids;
pub mod money;
pub mod period;

pub use allocation::{
    AllocationInput, CamSummary, CostPool, OwnerShares, SpaceBreakdown, UnitAllocation,
    UnitInput, VACANT_LABEL,
};
pub use building::{Building, Lease, Unit};
pub use expense::{ExpenseRecord, ExpenseStatus, PeriodKey, TransitionPolicy};
pub use ids::{BuildingId, ExpenseRecordId, UnitId};
pub use money::Money;
pub use period::BillingPeriod;
