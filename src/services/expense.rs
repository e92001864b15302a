//! Expense record service
//!
//! Turns allocation results into persisted owner-expense records and
//! manages their status afterwards. Every operation is checked against the
//! caller's [`AccessPolicy`] before it reads or writes a record.

use chrono::{Local, NaiveDate};

use crate::audit::{AuditSubject, EntityType};
use crate::error::{CamError, CamResult};
use crate::models::{
    AllocationInput, BillingPeriod, BuildingId, CamSummary, ExpenseRecord, ExpenseRecordId,
    ExpenseStatus, Money, TransitionPolicy,
};
use crate::storage::Storage;

use super::access::{AccessPolicy, AllowAll};
use super::allocation;
use super::directory::prepare_input;

static ALLOW_ALL: AllowAll = AllowAll;

/// Options for filtering expense records
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub building_id: Option<BuildingId>,
    pub status: Option<ExpenseStatus>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by building
    pub fn building(mut self, building_id: BuildingId) -> Self {
        self.building_id = Some(building_id);
        self
    }

    /// Filter by status
    pub fn status(mut self, status: ExpenseStatus) -> Self {
        self.status = Some(status);
        self
    }

    fn matches(&self, record: &ExpenseRecord) -> bool {
        self.building_id.map_or(true, |b| record.building_id == b)
            && self.status.map_or(true, |s| record.status == s)
    }
}

/// Service for expense record management
pub struct ExpenseService<'a> {
    storage: &'a Storage,
    policy: TransitionPolicy,
    access: &'a dyn AccessPolicy,
    today: Option<NaiveDate>,
}

impl<'a> ExpenseService<'a> {
    /// Create a service with the strict transition policy and no access
    /// restriction
    pub fn new(storage: &'a Storage) -> Self {
        Self {
            storage,
            policy: TransitionPolicy::default(),
            access: &ALLOW_ALL,
            today: None,
        }
    }

    pub fn with_policy(mut self, policy: TransitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_access(mut self, access: &'a dyn AccessPolicy) -> Self {
        self.access = access;
        self
    }

    /// Pin the date used to reject periods that have not started yet
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Audit appends happen after the change is committed, so a failure is
    /// reported in the log rather than to the caller
    fn audited(record_id: ExpenseRecordId, action: &'static str, result: CamResult<()>) {
        if let Err(e) = result {
            tracing::error!(
                record_id = %record_id,
                action,
                error = %e,
                "audit entry not written for committed change"
            );
        }
    }

    fn subject(record: &ExpenseRecord) -> AuditSubject {
        AuditSubject::new(EntityType::ExpenseRecord, record.id.to_string())
            .named(format!("{} {}", record.building_name, record.period()))
    }

    /// Build the allocation input for a building from the stored directory
    pub fn prepare(
        &self,
        building_id: BuildingId,
        period: BillingPeriod,
        other_cam_costs: Money,
    ) -> CamResult<AllocationInput> {
        self.access.authorize(building_id)?;
        let directory = &self.storage.directory;
        prepare_input(directory, directory, building_id, period, other_cam_costs)
    }

    /// Compute an allocation without persisting anything
    pub fn preview(&self, input: &AllocationInput) -> CamResult<CamSummary> {
        self.access.authorize(input.building_id())?;
        allocation::compute(input, self.today())
    }

    /// Whether a record already exists for the building and period
    pub fn exists_allocation(&self, building_id: BuildingId, period: BillingPeriod) -> CamResult<bool> {
        self.access.authorize(building_id)?;
        self.storage.records.exists_allocation(building_id, period)
    }

    /// Compute an allocation and persist the owner's share as a PENDING
    /// record
    ///
    /// Fails with `DuplicatePeriod` if a record already exists for the
    /// building and period. The repository enforces this under its write
    /// lock, so concurrent creates for the same period cannot both succeed.
    ///
    /// Once this returns `Ok` the record is on disk. Status changes and
    /// deletes behave the same way: the audit entry is appended after the
    /// commit and an append failure does not undo or fail the operation.
    pub fn create(&self, input: AllocationInput) -> CamResult<ExpenseRecord> {
        let building_id = input.building_id();
        self.access.authorize(building_id)?;

        let summary = allocation::compute(&input, self.today())?;

        if self.storage.records.exists_allocation(building_id, input.period)? {
            tracing::warn!(
                building_id = %building_id,
                period = %input.period,
                "allocation already recorded for period"
            );
            return Err(CamError::DuplicatePeriod {
                building: building_id,
                start: input.period.start,
                end: input.period.end,
            });
        }

        let description = if input.description.trim().is_empty() {
            ExpenseRecord::default_description(&summary.building_name, summary.period)
        } else {
            input.description.trim().to_string()
        };
        let record = ExpenseRecord::from_summary(&summary, description);

        if let Err(e) = self.storage.records.insert_unique(record.clone()) {
            if e.is_duplicate() {
                tracing::warn!(
                    building_id = %building_id,
                    period = %input.period,
                    "concurrent allocation for period rejected"
                );
            }
            return Err(e);
        }

        Self::audited(
            record.id,
            "create",
            self.storage
                .log_create(Self::subject(&record), self.access.actor(), &record),
        );

        tracing::info!(
            record_id = %record.id,
            building_id = %building_id,
            period = %record.period(),
            owner_amount = %record.total_amount,
            "expense record created"
        );

        Ok(record)
    }

    /// Get a record by ID
    pub fn get(&self, id: ExpenseRecordId) -> CamResult<Option<ExpenseRecord>> {
        match self.storage.records.get(id)? {
            Some(record) => {
                self.access.authorize(record.building_id)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Find a record by full or short ID
    pub fn find(&self, identifier: &str) -> CamResult<Option<ExpenseRecord>> {
        match self.storage.records.find(identifier)? {
            Some(record) => {
                self.access.authorize(record.building_id)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Like [`find`](Self::find), but a missing record is an error
    pub fn resolve(&self, identifier: &str) -> CamResult<ExpenseRecord> {
        self.find(identifier)?
            .ok_or_else(|| CamError::record_not_found(identifier))
    }

    /// Records visible to the caller, ordered by period start then building
    pub fn list(&self, filter: &RecordFilter) -> CamResult<Vec<ExpenseRecord>> {
        let mut records = self.storage.records.get_all()?;
        records.retain(|r| filter.matches(r) && self.access.can_access(r.building_id));
        Ok(records)
    }

    /// Change the status of a record
    ///
    /// Setting the current status again succeeds without writing anything.
    pub fn set_status(&self, id: ExpenseRecordId, status: ExpenseStatus) -> CamResult<ExpenseRecord> {
        let current = self
            .storage
            .records
            .get(id)?
            .ok_or_else(|| CamError::record_not_found(id.to_string()))?;
        self.access.authorize(current.building_id)?;

        if current.status == status {
            return Ok(current);
        }

        let policy = self.policy;
        let (before, after) = self.storage.records.update(id, |record| {
            if !policy.allows(record.status, status) {
                return Err(CamError::InvalidStatusTransition {
                    from: record.status,
                    to: status,
                });
            }
            record.status = status;
            Ok(())
        })?;

        if before.status != after.status {
            Self::audited(
                id,
                "set_status",
                self.storage
                    .log_update(Self::subject(&after), self.access.actor(), &before, &after),
            );

            tracing::info!(
                record_id = %id,
                from = %before.status,
                to = %after.status,
                "expense record status changed"
            );
        }

        Ok(after)
    }

    /// Permanently remove a record
    ///
    /// The removed record's last state is kept in the audit log.
    pub fn delete(&self, id: ExpenseRecordId) -> CamResult<ExpenseRecord> {
        let record = self
            .storage
            .records
            .get(id)?
            .ok_or_else(|| CamError::record_not_found(id.to_string()))?;
        self.access.authorize(record.building_id)?;

        let removed = self.storage.records.delete(id)?;

        Self::audited(
            id,
            "delete",
            self.storage
                .log_delete(Self::subject(&removed), self.access.actor(), &removed),
        );

        tracing::info!(record_id = %id, status = %removed.status, "expense record deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Operation;
    use crate::config::paths::LedgerPaths;
    use crate::models::{Building, UnitId, UnitInput};
    use crate::services::access::BuildingScope;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn january() -> BillingPeriod {
        BillingPeriod::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        )
    }

    fn input(building: u64, period: BillingPeriod) -> AllocationInput {
        AllocationInput {
            building: Building {
                id: BuildingId::new(building),
                name: format!("Building {}", building),
                total_leasable_area: 10_000.0,
                generator_fee: Money::from_major(300_000),
                transformer_fee: Money::from_major(200_000),
            },
            period,
            other_cam_costs: Money::from_major(150_000),
            units: vec![
                UnitInput::occupied(UnitId::new(1), "G-01", 4_000.0, "Acme Stores"),
                UnitInput::vacant(UnitId::new(2), "G-02", 6_000.0),
            ],
            description: String::new(),
        }
    }

    #[test]
    fn test_unwritable_audit_log_does_not_fail_committed_changes() {
        let (temp, storage) = create_test_storage();
        std::fs::create_dir(temp.path().join("audit.log")).unwrap();
        let service = ExpenseService::new(&storage).with_today(today());

        let record = service.create(input(7, january())).unwrap();
        assert_eq!(storage.records.count().unwrap(), 1);

        let err = service.create(input(7, january())).unwrap_err();
        assert!(err.is_duplicate());

        let paid = service.set_status(record.id, ExpenseStatus::Paid).unwrap();
        assert_eq!(paid.status, ExpenseStatus::Paid);

        service.delete(record.id).unwrap();
        assert_eq!(storage.records.count().unwrap(), 0);
    }

    #[test]
    fn test_create_snapshots_owner_share() {
        let (_temp, storage) = create_test_storage();
        let service = ExpenseService::new(&storage).with_today(today());

        let record = service.create(input(7, january())).unwrap();

        assert_eq!(record.status, ExpenseStatus::Pending);
        assert_eq!(record.total_amount, Money::from_major(390_000));
        assert_eq!(record.total_cam_costs, Money::from_major(650_000));
        assert_eq!(record.tenants_amount(), Money::from_major(260_000));
        assert_eq!(
            record.generator_share + record.transformer_share + record.other_cam_share,
            record.total_amount
        );
        assert_eq!(record.other_cam_costs, Money::from_major(150_000));
        assert!(record.description.contains("Building 7"));

        let history = storage.audit().history_of(&record.id.to_string()).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].operation, Operation::Create);
    }

    #[test]
    fn test_duplicate_period_rejected_and_first_record_unchanged() {
        let (_temp, storage) = create_test_storage();
        let service = ExpenseService::new(&storage).with_today(today());

        let first = service.create(input(7, january())).unwrap();

        let mut again = input(7, january());
        again.other_cam_costs = Money::from_major(1);
        let err = service.create(again).unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(
            err.to_string(),
            "An allocation already exists for building bld-7 in period 2025-01-01..2025-01-31"
        );

        let stored = service.get(first.id).unwrap().unwrap();
        assert_eq!(stored, first);
        assert_eq!(storage.records.count().unwrap(), 1);
    }

    #[test]
    fn test_same_period_other_building_allowed() {
        let (_temp, storage) = create_test_storage();
        let service = ExpenseService::new(&storage).with_today(today());

        service.create(input(7, january())).unwrap();
        service.create(input(8, january())).unwrap();
        assert!(service.exists_allocation(BuildingId::new(8), january()).unwrap());
        assert!(!service
            .exists_allocation(BuildingId::new(9), january())
            .unwrap());
    }

    #[test]
    fn test_concurrent_creates_produce_one_record() {
        let (_temp, storage) = create_test_storage();

        let results: Vec<CamResult<ExpenseRecord>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let storage = &storage;
                    s.spawn(move || {
                        ExpenseService::new(storage)
                            .with_today(today())
                            .create(input(7, january()))
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let created = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(created, 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| e.is_duplicate()));
        assert_eq!(storage.records.count().unwrap(), 1);
    }

    #[test]
    fn test_failed_allocation_persists_nothing() {
        let (_temp, storage) = create_test_storage();
        let service = ExpenseService::new(&storage).with_today(today());

        let mut bad = input(7, january());
        bad.building.total_leasable_area = 0.0;
        assert!(matches!(
            service.create(bad).unwrap_err(),
            CamError::DivisionByZeroArea { .. }
        ));

        let mut empty = input(7, january());
        empty.units.clear();
        assert!(matches!(
            service.create(empty).unwrap_err(),
            CamError::NoUnitsDefined(_)
        ));

        assert_eq!(storage.records.count().unwrap(), 0);
        assert!(storage.audit().read_all().unwrap().is_empty());
    }

    #[test]
    fn test_future_period_rejected() {
        let (_temp, storage) = create_test_storage();
        let service = ExpenseService::new(&storage).with_today(today());

        let err = service
            .create(input(7, BillingPeriod::monthly(2025, 7).unwrap()))
            .unwrap_err();
        assert!(matches!(err, CamError::InvalidPeriod { .. }));
    }

    #[test]
    fn test_set_status_strict() {
        let (_temp, storage) = create_test_storage();
        let service = ExpenseService::new(&storage).with_today(today());
        let record = service.create(input(7, january())).unwrap();

        let paid = service.set_status(record.id, ExpenseStatus::Paid).unwrap();
        assert_eq!(paid.status, ExpenseStatus::Paid);
        assert_eq!(paid.total_amount, record.total_amount);

        let err = service
            .set_status(record.id, ExpenseStatus::Pending)
            .unwrap_err();
        assert!(matches!(
            err,
            CamError::InvalidStatusTransition {
                from: ExpenseStatus::Paid,
                to: ExpenseStatus::Pending
            }
        ));

        service.set_status(record.id, ExpenseStatus::Cancelled).unwrap();
        assert!(service.set_status(record.id, ExpenseStatus::Approved).is_err());

        let history = storage.audit().history_of(&record.id.to_string()).unwrap();
        assert_eq!(history.len(), 3);
        assert!(history[1]
            .diff_summary
            .as_deref()
            .unwrap_or_default()
            .contains("status"));
    }

    #[test]
    fn test_set_status_permissive() {
        let (_temp, storage) = create_test_storage();
        let service = ExpenseService::new(&storage)
            .with_today(today())
            .with_policy(TransitionPolicy::Permissive);
        let record = service.create(input(7, january())).unwrap();

        service.set_status(record.id, ExpenseStatus::Cancelled).unwrap();
        let revived = service.set_status(record.id, ExpenseStatus::Pending).unwrap();
        assert_eq!(revived.status, ExpenseStatus::Pending);
    }

    #[test]
    fn test_set_same_status_is_silent() {
        let (_temp, storage) = create_test_storage();
        let service = ExpenseService::new(&storage).with_today(today());
        let record = service.create(input(7, january())).unwrap();

        let same = service.set_status(record.id, ExpenseStatus::Pending).unwrap();
        assert_eq!(same, record);
        assert_eq!(storage.audit().read_all().unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_id_not_found() {
        let (_temp, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);

        let id = ExpenseRecordId::new();
        assert!(service
            .set_status(id, ExpenseStatus::Paid)
            .unwrap_err()
            .is_not_found());
        assert!(service.delete(id).unwrap_err().is_not_found());
        assert!(service.resolve("exp-deadbeef").unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_frees_period_and_keeps_audit_snapshot() {
        let (_temp, storage) = create_test_storage();
        let service = ExpenseService::new(&storage).with_today(today());
        let record = service.create(input(7, january())).unwrap();
        service.set_status(record.id, ExpenseStatus::Paid).unwrap();

        let removed = service.delete(record.id).unwrap();
        assert_eq!(removed.status, ExpenseStatus::Paid);
        assert!(service.get(record.id).unwrap().is_none());
        assert!(!service.exists_allocation(BuildingId::new(7), january()).unwrap());

        let history = storage.audit().history_of(&record.id.to_string()).unwrap();
        let last = history.last().unwrap();
        assert_eq!(last.operation, Operation::Delete);
        assert_eq!(last.before.as_ref().unwrap()["status"], "PAID");

        // The period can be allocated again
        service.create(input(7, january())).unwrap();
    }

    #[test]
    fn test_list_filters_and_orders() {
        let (_temp, storage) = create_test_storage();
        let service = ExpenseService::new(&storage).with_today(today());

        let feb = BillingPeriod::monthly(2025, 2).unwrap();
        service.create(input(8, feb)).unwrap();
        service.create(input(8, january())).unwrap();
        let seven = service.create(input(7, january())).unwrap();
        service.set_status(seven.id, ExpenseStatus::Approved).unwrap();

        let all = service.list(&RecordFilter::new()).unwrap();
        let keys: Vec<_> = all.iter().map(|r| (r.building_id.value(), r.period_start)).collect();
        assert_eq!(
            keys,
            vec![(7, january().start), (8, january().start), (8, feb.start)]
        );

        let eight = service
            .list(&RecordFilter::new().building(BuildingId::new(8)))
            .unwrap();
        assert_eq!(eight.len(), 2);

        let approved = service
            .list(&RecordFilter::new().status(ExpenseStatus::Approved))
            .unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].id, seven.id);
    }

    #[test]
    fn test_scope_limits_every_operation() {
        let (_temp, storage) = create_test_storage();
        let admin = ExpenseService::new(&storage).with_today(today());
        let other = admin.create(input(8, january())).unwrap();

        let scope = BuildingScope::new([BuildingId::new(7)]);
        let scoped = ExpenseService::new(&storage)
            .with_today(today())
            .with_access(&scope);

        assert!(matches!(
            scoped.create(input(8, BillingPeriod::monthly(2025, 2).unwrap())),
            Err(CamError::Unauthorized(_))
        ));
        assert!(matches!(
            scoped.set_status(other.id, ExpenseStatus::Paid),
            Err(CamError::Unauthorized(_))
        ));
        assert!(matches!(scoped.delete(other.id), Err(CamError::Unauthorized(_))));
        assert!(matches!(scoped.get(other.id), Err(CamError::Unauthorized(_))));

        let own = scoped.create(input(7, january())).unwrap();
        let visible = scoped.list(&RecordFilter::new()).unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, own.id);

        // Refused calls left no trace
        assert_eq!(admin.get(other.id).unwrap().unwrap().status, ExpenseStatus::Pending);
        assert_eq!(storage.records.count().unwrap(), 2);
        let entries = storage.audit().read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].actor.as_deref(), Some("scope:bld-7"));
    }

    #[test]
    fn test_records_survive_reload() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());

        let id = {
            let mut storage = Storage::new(paths.clone()).unwrap();
            storage.load_all().unwrap();
            ExpenseService::new(&storage)
                .with_today(today())
                .create(input(7, january()))
                .unwrap()
                .id
        };

        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        let service = ExpenseService::new(&storage).with_today(today());
        assert!(service.get(id).unwrap().is_some());
        assert!(service.create(input(7, january())).unwrap_err().is_duplicate());
    }
}
