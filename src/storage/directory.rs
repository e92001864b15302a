//! Building directory snapshot storage
//!
//! directory.json holds the buildings, units and leases exported by the
//! property management system. The ledger never edits it; `import` replaces
//! it wholesale after validation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard};

use serde::{Deserialize, Serialize};

use crate::error::{CamError, CamResult};
use crate::models::{Building, BuildingId, Lease, Unit, UnitId};
use crate::services::directory::{BuildingDirectory, OccupancyLookup};

use super::file_io::{read_json, read_json_required, write_json_atomic};

/// Serializable directory snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    #[serde(default)]
    pub buildings: Vec<Building>,
    #[serde(default)]
    pub units: Vec<Unit>,
    #[serde(default)]
    pub leases: Vec<Lease>,
}

impl DirectorySnapshot {
    /// Check referential integrity of the snapshot
    pub fn validate(&self) -> CamResult<()> {
        let mut building_ids = HashSet::new();
        for building in &self.buildings {
            if !building_ids.insert(building.id) {
                return Err(CamError::Validation(format!(
                    "duplicate building id {}",
                    building.id
                )));
            }
        }

        let mut unit_ids = HashSet::new();
        for unit in &self.units {
            if !unit_ids.insert(unit.id) {
                return Err(CamError::Validation(format!("duplicate unit id {}", unit.id)));
            }
            if !building_ids.contains(&unit.building_id) {
                return Err(CamError::Validation(format!(
                    "unit {} references unknown building {}",
                    unit.id, unit.building_id
                )));
            }
        }

        let mut leased = HashSet::new();
        for lease in self.leases.iter().filter(|l| l.active) {
            if !unit_ids.contains(&lease.unit_id) {
                return Err(CamError::Validation(format!(
                    "lease for '{}' references unknown unit {}",
                    lease.tenant_name, lease.unit_id
                )));
            }
            if !leased.insert(lease.unit_id) {
                return Err(CamError::Validation(format!(
                    "unit {} has more than one active lease",
                    lease.unit_id
                )));
            }
        }

        Ok(())
    }

    fn active_lease(&self, unit_id: UnitId) -> Option<&Lease> {
        self.leases.iter().find(|l| l.active && l.unit_id == unit_id)
    }

    /// Entity counts, used to summarize imports in the audit log
    pub fn counts(&self) -> DirectoryCounts {
        DirectoryCounts {
            buildings: self.buildings.len(),
            units: self.units.len(),
            active_leases: self.leases.iter().filter(|l| l.active).count(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryCounts {
    pub buildings: usize,
    pub units: usize,
    pub active_leases: usize,
}

/// Repository for the directory snapshot
pub struct DirectoryRepository {
    path: PathBuf,
    data: RwLock<DirectorySnapshot>,
}

impl DirectoryRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(DirectorySnapshot::default()),
        }
    }

    fn read(&self) -> CamResult<RwLockReadGuard<'_, DirectorySnapshot>> {
        self.data
            .read()
            .map_err(|e| CamError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    /// Load the snapshot from disk
    pub fn load(&self) -> CamResult<()> {
        let snapshot: DirectorySnapshot = read_json(&self.path)?;
        let mut data = self
            .data
            .write()
            .map_err(|e| CamError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        *data = snapshot;
        Ok(())
    }

    /// Replace the snapshot with the contents of an exported file
    pub fn import(&self, source: &Path) -> CamResult<DirectorySnapshot> {
        let snapshot: DirectorySnapshot = read_json_required(source)?;
        snapshot.validate()?;

        let mut data = self
            .data
            .write()
            .map_err(|e| CamError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        write_json_atomic(&self.path, &snapshot)?;
        *data = snapshot.clone();

        tracing::info!(
            buildings = snapshot.buildings.len(),
            units = snapshot.units.len(),
            leases = snapshot.leases.len(),
            "directory snapshot imported"
        );
        Ok(snapshot)
    }

    pub fn snapshot(&self) -> CamResult<DirectorySnapshot> {
        Ok(self.read()?.clone())
    }
}

impl BuildingDirectory for DirectoryRepository {
    fn building(&self, id: BuildingId) -> CamResult<Option<Building>> {
        Ok(self.read()?.buildings.iter().find(|b| b.id == id).cloned())
    }

    fn units(&self, building_id: BuildingId) -> CamResult<Vec<Unit>> {
        Ok(self
            .read()?
            .units
            .iter()
            .filter(|u| u.building_id == building_id)
            .cloned()
            .collect())
    }
}

impl OccupancyLookup for DirectoryRepository {
    fn is_unit_occupied(&self, unit_id: UnitId) -> CamResult<bool> {
        Ok(self.read()?.active_lease(unit_id).is_some())
    }

    fn tenant_name(&self, unit_id: UnitId) -> CamResult<Option<String>> {
        Ok(self
            .read()?
            .active_lease(unit_id)
            .map(|l| l.tenant_name.clone()))
    }
}
