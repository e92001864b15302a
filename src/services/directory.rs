//! Building directory capabilities
//!
//! The allocation core never joins units against contracts itself. It asks
//! a [`BuildingDirectory`] for buildings and units, and an
//! [`OccupancyLookup`] whether each unit is under an active lease. Either can
//! be swapped for a fake in tests.

use std::path::Path;

use crate::audit::{AuditSubject, EntityType};
use crate::error::{CamError, CamResult};
use crate::models::{AllocationInput, BillingPeriod, Building, BuildingId, Money, Unit, UnitId, UnitInput};
use crate::storage::{DirectorySnapshot, Storage};

/// Read access to buildings and their units
pub trait BuildingDirectory {
    fn building(&self, id: BuildingId) -> CamResult<Option<Building>>;

    /// Units of a building, in display order
    fn units(&self, building_id: BuildingId) -> CamResult<Vec<Unit>>;
}

/// Occupancy as determined by the lease system
pub trait OccupancyLookup {
    fn is_unit_occupied(&self, unit_id: UnitId) -> CamResult<bool>;

    /// Name of the tenant holding the active lease, if any
    fn tenant_name(&self, unit_id: UnitId) -> CamResult<Option<String>>;
}

/// Build the engine input for one building and period
///
/// Fails with `BuildingNotFound` if the directory does not know the
/// building. An empty unit list is passed through; the engine rejects it.
pub fn prepare_input<D, O>(
    directory: &D,
    occupancy: &O,
    building_id: BuildingId,
    period: BillingPeriod,
    other_cam_costs: Money,
) -> CamResult<AllocationInput>
where
    D: BuildingDirectory + ?Sized,
    O: OccupancyLookup + ?Sized,
{
    let building = directory
        .building(building_id)?
        .ok_or(CamError::BuildingNotFound(building_id))?;

    let units = directory
        .units(building_id)?
        .into_iter()
        .map(|unit| {
            let is_occupied = occupancy.is_unit_occupied(unit.id)?;
            let tenant_name = if is_occupied {
                occupancy.tenant_name(unit.id)?
            } else {
                None
            };
            Ok(UnitInput {
                unit_id: unit.id,
                unit_number: unit.unit_number,
                unit_space: unit.unit_space,
                tenant_name,
                is_occupied,
            })
        })
        .collect::<CamResult<Vec<_>>>()?;

    Ok(AllocationInput {
        building,
        period,
        other_cam_costs,
        units,
        description: String::new(),
    })
}

/// Install a directory snapshot exported by the property management system
///
/// Replaces the stored snapshot wholesale and records the import in the
/// audit log.
pub fn import_directory(storage: &Storage, source: &Path) -> CamResult<DirectorySnapshot> {
    let before = storage.directory.snapshot()?;
    let after = storage.directory.import(source)?;

    let subject =
        AuditSubject::new(EntityType::Directory, "directory").named(source.display().to_string());
    storage.log_update(subject, None, &before.counts(), &after.counts())?;

    Ok(after)
}
