//! Storage layer for CAM Ledger
//!
//! JSON file storage with atomic writes, plus the audit log. `Storage` is
//! `Send + Sync`; share it by reference across threads.

pub mod directory;
pub mod file_io;
pub mod records;

pub use directory::{DirectoryCounts, DirectoryRepository, DirectorySnapshot};
pub use file_io::{read_json, read_json_required, write_json_atomic};
pub use records::ExpenseRecordRepository;

use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, AuditSubject};
use crate::config::paths::LedgerPaths;
use crate::error::CamResult;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: LedgerPaths,
    pub records: ExpenseRecordRepository,
    pub directory: DirectoryRepository,
    audit: AuditLogger,
}

impl Storage {
    /// Create a new Storage instance, creating directories as needed
    pub fn new(paths: LedgerPaths) -> CamResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            records: ExpenseRecordRepository::new(paths.records_file()),
            directory: DirectoryRepository::new(paths.directory_file()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> CamResult<()> {
        self.records.load()?;
        self.directory.load()?;
        Ok(())
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    pub fn log_create<T: Serialize>(
        &self,
        subject: AuditSubject,
        actor: Option<String>,
        entity: &T,
    ) -> CamResult<()> {
        self.audit.log(&AuditEntry::created(subject, entity).by(actor))
    }

    pub fn log_update<T: Serialize>(
        &self,
        subject: AuditSubject,
        actor: Option<String>,
        before: &T,
        after: &T,
    ) -> CamResult<()> {
        self.audit
            .log(&AuditEntry::updated(subject, before, after).by(actor))
    }

    pub fn log_delete<T: Serialize>(
        &self,
        subject: AuditSubject,
        actor: Option<String>,
        entity: &T,
    ) -> CamResult<()> {
        self.audit.log(&AuditEntry::deleted(subject, entity).by(actor))
    }
}
