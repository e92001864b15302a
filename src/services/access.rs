//! Per-building access control
//!
//! Every record operation is checked against an [`AccessPolicy`] before it
//! reads or writes anything.

use std::collections::BTreeSet;

use crate::error::{CamError, CamResult};
use crate::models::BuildingId;

/// Decides which buildings the caller may act on
pub trait AccessPolicy: Send + Sync {
    /// Fails with `Unauthorized` if the caller may not touch the building
    fn authorize(&self, building_id: BuildingId) -> CamResult<()>;

    fn can_access(&self, building_id: BuildingId) -> bool {
        self.authorize(building_id).is_ok()
    }

    /// Label recorded in the audit log as the acting principal
    fn actor(&self) -> Option<String> {
        None
    }
}

/// No restriction; used when no scope is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AccessPolicy for AllowAll {
    fn authorize(&self, _building_id: BuildingId) -> CamResult<()> {
        Ok(())
    }
}

/// Restricts the caller to a fixed set of buildings
#[derive(Debug, Clone, Default)]
pub struct BuildingScope {
    buildings: BTreeSet<BuildingId>,
}

impl BuildingScope {
    pub fn new(buildings: impl IntoIterator<Item = BuildingId>) -> Self {
        Self {
            buildings: buildings.into_iter().collect(),
        }
    }

    /// Parse a comma-separated list such as "7,bld-12"
    pub fn parse(list: &str) -> CamResult<Self> {
        let buildings = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<BuildingId>()
                    .map_err(|_| CamError::Validation(format!("Invalid building id in scope: '{}'", s)))
            })
            .collect::<CamResult<BTreeSet<_>>>()?;

        if buildings.is_empty() {
            return Err(CamError::Validation("Scope lists no buildings".into()));
        }
        Ok(Self { buildings })
    }

    pub fn buildings(&self) -> impl Iterator<Item = &BuildingId> {
        self.buildings.iter()
    }
}

impl AccessPolicy for BuildingScope {
    fn authorize(&self, building_id: BuildingId) -> CamResult<()> {
        if self.buildings.contains(&building_id) {
            Ok(())
        } else {
            Err(CamError::Unauthorized(building_id))
        }
    }

    fn actor(&self) -> Option<String> {
        let ids: Vec<String> = self.buildings().map(ToString::to_string).collect();
        Some(format!("scope:{}", ids.join(",")))
    }
}
