//! Allocation request and result models
//!
//! `AllocationInput` is what the engine consumes. `CamSummary` and
//! `UnitAllocation` are what it produces; neither is persisted directly.

use serde::{Deserialize, Serialize};

use super::building::Building;
use super::ids::{BuildingId, UnitId};
use super::money::Money;
use super::period::BillingPeriod;

/// Label shown for units without an active lease
pub const VACANT_LABEL: &str = "Vacant";

/// One unit as seen by the engine, with occupancy already resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitInput {
    pub unit_id: UnitId,
    pub unit_number: String,
    pub unit_space: f64,
    pub tenant_name: Option<String>,
    pub is_occupied: bool,
}

impl UnitInput {
    pub fn occupied(
        unit_id: UnitId,
        unit_number: impl Into<String>,
        unit_space: f64,
        tenant_name: impl Into<String>,
    ) -> Self {
        Self {
            unit_id,
            unit_number: unit_number.into(),
            unit_space,
            tenant_name: Some(tenant_name.into()),
            is_occupied: true,
        }
    }

    pub fn vacant(unit_id: UnitId, unit_number: impl Into<String>, unit_space: f64) -> Self {
        Self {
            unit_id,
            unit_number: unit_number.into(),
            unit_space,
            tenant_name: None,
            is_occupied: false,
        }
    }
}

/// Everything needed to compute one building's allocation for one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationInput {
    pub building: Building,
    pub period: BillingPeriod,

    /// Operator-entered cost pool on top of the building's fixed fees
    pub other_cam_costs: Money,

    /// Units in display order
    pub units: Vec<UnitInput>,

    #[serde(default)]
    pub description: String,
}

impl AllocationInput {
    pub fn building_id(&self) -> BuildingId {
        self.building.id
    }
}

/// Occupied / vacant / unallocated area breakdown
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpaceBreakdown {
    pub total_leasable_area: f64,
    pub occupied_area: f64,
    pub vacant_area: f64,
    pub unallocated_area: f64,
    pub occupied_units: usize,
    pub vacant_units: usize,
}

impl SpaceBreakdown {
    /// Area represented by known unit records
    pub fn defined_area(&self) -> f64 {
        self.occupied_area + self.vacant_area
    }
}

/// The three shared-cost components and their sum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostPool {
    pub generator_fee: Money,
    pub transformer_fee: Money,
    pub other_cam_costs: Money,
    pub total: Money,
}

/// Per-unit informational breakdown, rounded to cents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitAllocation {
    pub unit_id: UnitId,
    pub unit_number: String,
    pub unit_space: f64,
    pub is_occupied: bool,

    /// Tenant name, or "Vacant"
    pub tenant_name: String,

    /// Unit area as a percentage of leasable area, rounded to 2 places
    pub percentage_of_leasable_area: f64,
    pub cam_share: Money,
    pub generator_share: Money,
    pub transformer_share: Money,
    pub other_cam_share: Money,
}

/// Owner's portion of each cost component
///
/// The three portions sum exactly to the owner's total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerShares {
    pub generator: Money,
    pub transformer: Money,
    pub other_cam: Money,
}

impl OwnerShares {
    pub fn total(&self) -> Money {
        self.generator + self.transformer + self.other_cam
    }
}

/// The full result of an allocation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CamSummary {
    pub building_id: BuildingId,
    pub building_name: String,
    pub period: BillingPeriod,

    pub total_leasable_area: f64,
    pub total_occupied_area: f64,
    pub total_vacant_area: f64,
    pub unallocated_area: f64,

    /// Unrounded percentages; they sum to 100
    pub occupied_percentage: f64,
    pub vacant_percentage: f64,
    pub unallocated_percentage: f64,

    pub costs: CostPool,

    /// Cost per square unit of leasable area, in major currency units
    pub cost_per_area_unit: f64,

    pub tenants_cam: Money,
    pub owner_cam: Money,
    pub owner_shares: OwnerShares,

    pub occupied_units_count: usize,
    pub vacant_units_count: usize,

    pub units: Vec<UnitAllocation>,
}

impl CamSummary {
    pub fn total_cam_costs(&self) -> Money {
        self.costs.total
    }
}

/// Round a display figure to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
