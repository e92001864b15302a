//! Audit logging for CAM Ledger
//!
//! Every record creation, status change and deletion is appended to a
//! line-delimited JSON log with before/after snapshots. Records are hard
//! deleted from storage, but their last state survives here.
//!
//! - `AuditEntry`: one operation on one entity
//! - `AuditLogger`: append/read access to the JSONL file
//! - `generate_diff`: top-level change summary between two states

mod diff;
mod entry;
mod logger;

pub use diff::{changed_fields, generate_diff, FieldChange};
pub use entry::{AuditEntry, AuditSubject, EntityType, Operation};
pub use logger::AuditLogger;
