//! Audit entry data structures

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::diff::generate_diff;

/// Types of operations that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Types of entities that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    ExpenseRecord,
    Directory,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ExpenseRecord => "ExpenseRecord",
            Self::Directory => "Directory",
        })
    }
}

/// The entity an audit entry is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSubject {
    pub entity_type: EntityType,
    pub entity_id: String,
    /// Human-readable label (e.g. building name and period)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
}

impl AuditSubject {
    pub fn new(entity_type: EntityType, entity_id: impl Into<String>) -> Self {
        Self {
            entity_type,
            entity_id: entity_id.into(),
            entity_name: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.entity_name = Some(name.into());
        self
    }
}

/// A single audit log entry
///
/// `before` is set for updates and deletes, `after` for creates and
/// updates. A deleted record therefore stays recoverable from the log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the operation occurred (UTC)
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
    #[serde(flatten)]
    pub subject: AuditSubject,
    /// Who performed the operation, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,
}

impl AuditEntry {
    fn blank(operation: Operation, subject: AuditSubject) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            subject,
            actor: None,
            before: None,
            after: None,
            diff_summary: None,
        }
    }

    pub fn created<T: Serialize>(subject: AuditSubject, entity: &T) -> Self {
        let mut entry = Self::blank(Operation::Create, subject);
        entry.after = serde_json::to_value(entity).ok();
        entry
    }

    /// Update entry with both snapshots and a summary of changed fields
    pub fn updated<T: Serialize>(subject: AuditSubject, before: &T, after: &T) -> Self {
        let mut entry = Self::blank(Operation::Update, subject);
        entry.diff_summary = generate_diff(before, after);
        entry.before = serde_json::to_value(before).ok();
        entry.after = serde_json::to_value(after).ok();
        entry
    }

    pub fn deleted<T: Serialize>(subject: AuditSubject, entity: &T) -> Self {
        let mut entry = Self::blank(Operation::Delete, subject);
        entry.before = serde_json::to_value(entity).ok();
        entry
    }

    pub fn by(mut self, actor: Option<String>) -> Self {
        self.actor = actor;
        self
    }

    /// The latest snapshot carried by this entry
    pub fn snapshot(&self) -> Option<&Value> {
        self.after.as_ref().or(self.before.as_ref())
    }
}

impl fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.subject.entity_type,
            self.subject.entity_id
        )?;
        if let Some(name) = &self.subject.entity_name {
            write!(f, " ({})", name)?;
        }
        if let Some(actor) = &self.actor {
            write!(f, " by {}", actor)?;
        }
        if let Some(diff) = &self.diff_summary {
            write!(f, "\n  Changes: {}", diff)?;
        }
        Ok(())
    }
}
