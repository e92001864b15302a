//! Building directory models
//!
//! Buildings, units and leases are owned by the surrounding property
//! management system. The ledger only reads them.

use serde::{Deserialize, Serialize};

use super::ids::{BuildingId, UnitId};
use super::money::Money;

/// A building and its shared-cost inputs for the current billing cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,

    /// Display name, denormalized onto expense records
    #[serde(default)]
    pub name: String,

    /// Registered leasable area (square units)
    pub total_leasable_area: f64,

    #[serde(default)]
    pub generator_fee: Money,

    #[serde(default)]
    pub transformer_fee: Money,
}

impl Building {
    /// Name for display, falling back to the id
    pub fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            self.id.to_string()
        } else {
            self.name.clone()
        }
    }
}

/// A leasable unit inside a building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub building_id: BuildingId,
    pub unit_number: String,

    /// Area of the unit (square units)
    pub unit_space: f64,
}

/// A lease (contract) referencing a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lease {
    pub unit_id: UnitId,
    pub tenant_name: String,

    /// Only active leases make a unit occupied
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}
