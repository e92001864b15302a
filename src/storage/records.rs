//! Expense record repository for JSON storage
//!
//! Manages records.json. Besides the id map the repository keeps a unique
//! index on (building, period start, period end); every mutation updates the
//! index and rewrites the file while holding the write lock, so the
//! duplicate check and the insert happen as one step.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{CamError, CamResult};
use crate::models::{BillingPeriod, BuildingId, ExpenseRecord, ExpenseRecordId, PeriodKey};

use super::file_io::{read_json, write_json_atomic};

/// Serializable record data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct RecordData {
    records: Vec<ExpenseRecord>,
}

#[derive(Debug, Default)]
struct RecordTable {
    by_id: HashMap<ExpenseRecordId, ExpenseRecord>,
    by_period: HashMap<PeriodKey, ExpenseRecordId>,
}

impl RecordTable {
    fn sorted(&self) -> Vec<ExpenseRecord> {
        let mut records: Vec<_> = self.by_id.values().cloned().collect();
        records.sort_by(|a, b| {
            a.period_start
                .cmp(&b.period_start)
                .then(a.building_id.cmp(&b.building_id))
                .then(a.date_recorded.cmp(&b.date_recorded))
        });
        records
    }
}

/// Repository for expense record persistence
pub struct ExpenseRecordRepository {
    path: PathBuf,
    data: RwLock<RecordTable>,
}

impl ExpenseRecordRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(RecordTable::default()),
        }
    }

    fn read(&self) -> CamResult<RwLockReadGuard<'_, RecordTable>> {
        self.data
            .read()
            .map_err(|e| CamError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> CamResult<RwLockWriteGuard<'_, RecordTable>> {
        self.data
            .write()
            .map_err(|e| CamError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    fn persist(&self, table: &RecordTable) -> CamResult<()> {
        write_json_atomic(
            &self.path,
            &RecordData {
                records: table.sorted(),
            },
        )
    }

    /// Load records from disk
    ///
    /// A file holding two records for the same building and period is
    /// rejected instead of being silently deduplicated.
    pub fn load(&self) -> CamResult<()> {
        let file_data: RecordData = read_json(&self.path)?;

        let mut table = RecordTable::default();
        for record in file_data.records {
            let key = record.period_key();
            if let Some(existing) = table.by_period.get(&key) {
                return Err(CamError::Storage(format!(
                    "{} contains duplicate allocations for building {} period {}: {} and {}",
                    self.path.display(),
                    record.building_id,
                    record.period(),
                    existing,
                    record.id
                )));
            }
            table.by_period.insert(key, record.id);
            table.by_id.insert(record.id, record);
        }

        *self.write()? = table;
        Ok(())
    }

    /// Whether a record exists for the building and period
    pub fn exists_allocation(&self, building_id: BuildingId, period: BillingPeriod) -> CamResult<bool> {
        let table = self.read()?;
        Ok(table
            .by_period
            .contains_key(&PeriodKey::new(building_id, period)))
    }

    /// Insert a new record, enforcing one record per building and period
    ///
    /// The file is rewritten before the lock is released. If that write
    /// fails the insert is undone.
    pub fn insert_unique(&self, record: ExpenseRecord) -> CamResult<()> {
        let mut table = self.write()?;

        let key = record.period_key();
        if table.by_period.contains_key(&key) {
            return Err(CamError::DuplicatePeriod {
                building: key.building_id,
                start: key.start,
                end: key.end,
            });
        }

        let id = record.id;
        table.by_period.insert(key, id);
        table.by_id.insert(id, record);

        if let Err(e) = self.persist(&table) {
            table.by_period.remove(&key);
            table.by_id.remove(&id);
            return Err(e);
        }

        tracing::debug!(record_id = %id, building_id = %key.building_id, "expense record inserted");
        Ok(())
    }

    /// Apply a change to one record under the write lock
    ///
    /// Returns the record before and after the change. The change may not
    /// touch the record's building or period; the closure can refuse the
    /// change by returning an error, in which case nothing is written.
    pub fn update<F>(&self, id: ExpenseRecordId, change: F) -> CamResult<(ExpenseRecord, ExpenseRecord)>
    where
        F: FnOnce(&mut ExpenseRecord) -> CamResult<()>,
    {
        let mut table = self.write()?;

        let before = table
            .by_id
            .get(&id)
            .cloned()
            .ok_or_else(|| CamError::record_not_found(id.to_string()))?;

        let mut after = before.clone();
        change(&mut after)?;

        if after.period_key() != before.period_key() || after.id != before.id {
            return Err(CamError::Validation(
                "expense record identity and period are immutable".into(),
            ));
        }

        table.by_id.insert(id, after.clone());
        if let Err(e) = self.persist(&table) {
            table.by_id.insert(id, before);
            return Err(e);
        }

        Ok((before, after))
    }

    /// Permanently remove a record, returning it
    pub fn delete(&self, id: ExpenseRecordId) -> CamResult<ExpenseRecord> {
        let mut table = self.write()?;

        let removed = table
            .by_id
            .remove(&id)
            .ok_or_else(|| CamError::record_not_found(id.to_string()))?;
        let key = removed.period_key();
        table.by_period.remove(&key);

        if let Err(e) = self.persist(&table) {
            table.by_period.insert(key, id);
            table.by_id.insert(id, removed);
            return Err(e);
        }

        tracing::debug!(record_id = %id, "expense record deleted");
        Ok(removed)
    }

    pub fn get(&self, id: ExpenseRecordId) -> CamResult<Option<ExpenseRecord>> {
        Ok(self.read()?.by_id.get(&id).cloned())
    }

    /// Find a record by full id or by its short display form ("exp-1a2b3c4d")
    ///
    /// An ambiguous short form is a validation error.
    pub fn find(&self, identifier: &str) -> CamResult<Option<ExpenseRecord>> {
        if let Ok(id) = identifier.parse::<ExpenseRecordId>() {
            return self.get(id);
        }

        let table = self.read()?;
        let mut matches = table
            .by_id
            .values()
            .filter(|r| r.id.matches_prefix(identifier));

        let first = matches.next().cloned();
        if matches.next().is_some() {
            return Err(CamError::Validation(format!(
                "'{}' matches more than one record; use a longer id",
                identifier
            )));
        }
        Ok(first)
    }

    /// All records ordered by period start, then building
    pub fn get_all(&self) -> CamResult<Vec<ExpenseRecord>> {
        Ok(self.read()?.sorted())
    }

    pub fn count(&self) -> CamResult<usize> {
        Ok(self.read()?.by_id.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpenseStatus, Money};
    use chrono::{NaiveDate, Utc};
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, ExpenseRecordRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = ExpenseRecordRepository::new(temp_dir.path().join("records.json"));
        (temp_dir, repo)
    }

    fn january() -> BillingPeriod {
        BillingPeriod::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        )
    }

    fn record(building: u64, period: BillingPeriod) -> ExpenseRecord {
        ExpenseRecord {
            id: ExpenseRecordId::new(),
            building_id: BuildingId::new(building),
            building_name: format!("Building {}", building),
            period_start: period.start,
            period_end: period.end,
            total_amount: Money::from_major(800),
            generator_share: Money::from_major(400),
            transformer_share: Money::from_major(200),
            other_cam_share: Money::from_major(200),
            other_cam_costs: Money::from_major(250),
            total_vacant_area: 300.0,
            total_unallocated_area: 100.0,
            total_leasable_area: 500.0,
            total_cam_costs: Money::from_major(1_000),
            occupied_area: 100.0,
            occupied_units_count: 1,
            vacant_units_count: 2,
            description: String::new(),
            status: ExpenseStatus::Pending,
            date_recorded: Utc::now(),
        }
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_insert_persists_immediately() {
        let (temp_dir, repo) = create_test_repo();
        let rec = record(7, january());
        let id = rec.id;
        repo.insert_unique(rec).unwrap();

        let reloaded = ExpenseRecordRepository::new(temp_dir.path().join("records.json"));
        reloaded.load().unwrap();
        assert!(reloaded.get(id).unwrap().is_some());
        assert!(reloaded.exists_allocation(BuildingId::new(7), january()).unwrap());
    }

    #[test]
    fn test_unique_index_rejects_same_building_and_period() {
        let (_temp_dir, repo) = create_test_repo();
        let first = record(7, january());
        let first_id = first.id;
        repo.insert_unique(first).unwrap();

        let err = repo.insert_unique(record(7, january())).unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(repo.count().unwrap(), 1);
        assert!(repo.get(first_id).unwrap().is_some());

        // Other buildings and other periods are unaffected
        repo.insert_unique(record(8, january())).unwrap();
        repo.insert_unique(record(7, BillingPeriod::monthly(2025, 2).unwrap()))
            .unwrap();
        assert_eq!(repo.count().unwrap(), 3);
    }

    #[test]
    fn test_update_changes_status_only() {
        let (_temp_dir, repo) = create_test_repo();
        let rec = record(7, january());
        let id = rec.id;
        repo.insert_unique(rec).unwrap();

        let (before, after) = repo
            .update(id, |r| {
                r.status = ExpenseStatus::Approved;
                Ok(())
            })
            .unwrap();
        assert_eq!(before.status, ExpenseStatus::Pending);
        assert_eq!(after.status, ExpenseStatus::Approved);
        assert_eq!(repo.get(id).unwrap().unwrap().status, ExpenseStatus::Approved);
    }

    #[test]
    fn test_update_refuses_period_change() {
        let (_temp_dir, repo) = create_test_repo();
        let rec = record(7, january());
        let id = rec.id;
        repo.insert_unique(rec).unwrap();

        let result = repo.update(id, |r| {
            r.period_end = NaiveDate::from_ymd_opt(2025, 2, 28).unwrap();
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(repo.get(id).unwrap().unwrap().period(), january());
    }

    #[test]
    fn test_update_unknown_id() {
        let (_temp_dir, repo) = create_test_repo();
        let err = repo.update(ExpenseRecordId::new(), |_| Ok(())).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_frees_the_period() {
        let (_temp_dir, repo) = create_test_repo();
        let rec = record(7, january());
        let id = rec.id;
        repo.insert_unique(rec).unwrap();

        let removed = repo.delete(id).unwrap();
        assert_eq!(removed.id, id);
        assert!(!repo.exists_allocation(BuildingId::new(7), january()).unwrap());
        assert!(repo.delete(id).unwrap_err().is_not_found());

        repo.insert_unique(record(7, january())).unwrap();
    }

    #[test]
    fn test_find_by_short_id() {
        let (_temp_dir, repo) = create_test_repo();
        let rec = record(7, january());
        let id = rec.id;
        repo.insert_unique(rec).unwrap();

        let found = repo.find(&id.to_string()).unwrap().unwrap();
        assert_eq!(found.id, id);
        let found = repo.find(&id.as_uuid().to_string()).unwrap().unwrap();
        assert_eq!(found.id, id);
        assert!(repo.find("exp-zzzzzzzz").unwrap().is_none());
    }

    #[test]
    fn test_load_rejects_duplicate_file() {
        let (temp_dir, repo) = create_test_repo();
        let data = RecordData {
            records: vec![record(7, january()), record(7, january())],
        };
        write_json_atomic(temp_dir.path().join("records.json"), &data).unwrap();

        let err = repo.load().unwrap_err();
        assert!(matches!(err, CamError::Storage(_)));
    }

    #[test]
    fn test_concurrent_inserts_yield_one_record() {
        let (_temp_dir, repo) = create_test_repo();

        let results: Vec<CamResult<()>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| repo.insert_unique(record(7, january()))))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| e.is_duplicate()));
        assert_eq!(repo.count().unwrap(), 1);
    }
}
