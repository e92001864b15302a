//! Expense record CLI commands

use clap::Subcommand;

use crate::audit::AuditEntry;
use crate::display::{format_record_details, format_record_list};
use crate::error::CamResult;
use crate::models::{BuildingId, ExpenseRecordId};
use crate::services::RecordFilter;

use super::{parse_building, parse_status, to_json, CliContext};

/// Expense record subcommands
#[derive(Subcommand)]
pub enum RecordCommands {
    /// List expense records
    List {
        /// Only records for this building
        #[arg(short, long)]
        building: Option<String>,
        /// Only records with this status (pending, approved, paid, cancelled)
        #[arg(short, long)]
        status: Option<String>,
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one expense record
    Show {
        /// Record ID (full or short form)
        id: String,
        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change the status of an expense record
    Status {
        /// Record ID (full or short form)
        id: String,
        /// New status (pending, approved, paid, cancelled)
        status: String,
    },
    /// Permanently delete an expense record
    Delete {
        /// Record ID (full or short form)
        id: String,
    },
}

/// Building an audited expense record belongs to
fn entry_building(entry: &AuditEntry) -> Option<BuildingId> {
    entry
        .snapshot()?
        .get("building_id")?
        .as_u64()
        .map(BuildingId::new)
}

/// Handle an expense record command
pub fn handle_record_command(ctx: &CliContext<'_>, cmd: RecordCommands) -> CamResult<()> {
    let service = ctx.expense_service();

    match cmd {
        RecordCommands::List {
            building,
            status,
            json,
        } => {
            let mut filter = RecordFilter::new();
            if let Some(building) = building {
                filter = filter.building(parse_building(&building)?);
            }
            if let Some(status) = status {
                filter = filter.status(parse_status(&status)?);
            }

            let records = service.list(&filter)?;
            if json {
                println!("{}", to_json(&records)?);
            } else {
                print!("{}", format_record_list(&records, ctx.settings));
            }
        }

        RecordCommands::Show { id, json } => {
            let record = service.resolve(&id)?;
            if json {
                println!("{}", to_json(&record)?);
            } else {
                print!("{}", format_record_details(&record, ctx.settings));
            }
        }

        RecordCommands::Status { id, status } => {
            let status = parse_status(&status)?;
            let record = service.resolve(&id)?;
            let previous = record.status;

            let updated = service.set_status(record.id, status)?;
            if previous == updated.status {
                println!("{} is already {}", updated.id, updated.status);
            } else {
                println!("{}: {} -> {}", updated.id, previous, updated.status);
            }
        }

        RecordCommands::Delete { id } => {
            let record = service.resolve(&id)?;
            let removed = service.delete(record.id)?;
            println!("Deleted expense record {}", removed);
        }
    }

    Ok(())
}

/// Print the last `limit` audit entries the caller may see, optionally for
/// one record
pub fn handle_audit_command(
    ctx: &CliContext<'_>,
    limit: usize,
    record: Option<String>,
) -> CamResult<()> {
    // Deleted records stay addressable here, so match on the logged id
    let key = record.map(|id| {
        id.parse::<ExpenseRecordId>()
            .map(|full| full.to_string())
            .unwrap_or(id)
    });

    let entries = ctx.storage.audit().recent_matching(limit, |e| {
        key.as_deref().map_or(true, |k| e.subject.entity_id == k)
            && entry_building(e).map_or(true, |b| ctx.access.can_access(b))
    })?;

    if entries.is_empty() {
        println!("No audit entries.");
        return Ok(());
    }

    for entry in &entries {
        println!("{}", entry);
    }
    Ok(())
}
