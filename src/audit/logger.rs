//! Append-only JSONL audit log
//!
//! Each entry is one JSON line, flushed as soon as it is written. The file
//! is never rewritten or truncated by the ledger.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{CamError, CamResult};

use super::entry::AuditEntry;

/// Handles writing audit entries to the audit log file
pub struct AuditLogger {
    log_path: PathBuf,
    /// Serializes appends from threads sharing one logger
    write_lock: Mutex<()>,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self {
            log_path,
            write_lock: Mutex::new(()),
        }
    }

    /// Append an entry and flush it
    pub fn log(&self, entry: &AuditEntry) -> CamResult<()> {
        let mut line = serde_json::to_string(entry)
            .map_err(|e| CamError::Json(format!("Failed to serialize audit entry: {}", e)))?;
        line.push('\n');

        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| CamError::Io(format!("Audit log lock poisoned: {}", e)))?;

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .and_then(|mut file| {
                file.write_all(line.as_bytes())?;
                file.flush()
            })
            .map_err(|e| CamError::Io(format!("Failed to write audit entry: {}", e)))
    }

    /// Read all audit entries, oldest first
    pub fn read_all(&self) -> CamResult<Vec<AuditEntry>> {
        let file = match File::open(&self.log_path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CamError::Io(format!("Failed to open audit log: {}", e))),
        };

        BufReader::new(file)
            .lines()
            .enumerate()
            .filter(|(_, line)| line.as_ref().map_or(true, |l| !l.trim().is_empty()))
            .map(|(idx, line)| {
                let line = line
                    .map_err(|e| CamError::Io(format!("audit log line {}: {}", idx + 1, e)))?;
                serde_json::from_str(&line)
                    .map_err(|e| CamError::Json(format!("audit log line {}: {}", idx + 1, e)))
            })
            .collect()
    }

    /// The most recent `count` entries accepted by `keep`, oldest first
    ///
    /// Filtering happens before the limit, so older matches are still found
    /// when newer entries are rejected.
    pub fn recent_matching<F>(&self, count: usize, keep: F) -> CamResult<Vec<AuditEntry>>
    where
        F: Fn(&AuditEntry) -> bool,
    {
        let mut entries: Vec<_> = self.read_all()?.into_iter().filter(|e| keep(e)).collect();
        let start = entries.len().saturating_sub(count);
        Ok(entries.split_off(start))
    }

    /// Full history of one entity, oldest first
    pub fn history_of(&self, entity_id: &str) -> CamResult<Vec<AuditEntry>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|e| e.subject.entity_id == entity_id)
            .collect())
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }
}
