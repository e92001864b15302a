//! Allocation CLI commands
//!
//! `preview` computes and prints a building's CAM split without saving it;
//! `allocate` records the owner's share as an expense record.

use clap::{Args, Subcommand};

use crate::display::format_allocation_summary;
use crate::error::CamResult;

use super::{parse_building, parse_money, parse_period, to_json, CliContext};

/// Arguments identifying one allocation run
#[derive(Args, Debug, Clone)]
pub struct AllocationArgs {
    /// Building ID (e.g. "7" or "bld-7")
    #[arg(short, long)]
    pub building: String,
    /// Billing period ("2025-01" or "2025-01-01..2025-01-31")
    #[arg(short, long)]
    pub period: String,
    /// Other CAM costs for the period (e.g. "150000" or "1,500.00")
    #[arg(short, long = "other-cam", default_value = "0")]
    pub other_cam: String,
}

/// Allocation subcommands
#[derive(Subcommand)]
pub enum AllocationCommands {
    /// Compute a CAM allocation without saving it
    Preview {
        #[command(flatten)]
        args: AllocationArgs,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compute a CAM allocation and record the owner's share
    Allocate {
        #[command(flatten)]
        args: AllocationArgs,
        /// Description stored on the expense record
        #[arg(short, long)]
        description: Option<String>,
    },
}

/// Handle an allocation command
pub fn handle_allocation_command(ctx: &CliContext<'_>, cmd: AllocationCommands) -> CamResult<()> {
    let service = ctx.expense_service();

    match cmd {
        AllocationCommands::Preview { args, json } => {
            let building_id = parse_building(&args.building)?;
            let period = parse_period(&args.period)?;
            let other = parse_money(&args.other_cam)?;

            let input = service.prepare(building_id, period, other)?;
            let summary = service.preview(&input)?;

            if json {
                println!("{}", to_json(&summary)?);
            } else {
                print!("{}", format_allocation_summary(&summary, ctx.settings));
                if service.exists_allocation(building_id, period)? {
                    println!();
                    println!("Note: an expense record already exists for this period.");
                }
            }
        }

        AllocationCommands::Allocate { args, description } => {
            let building_id = parse_building(&args.building)?;
            let period = parse_period(&args.period)?;
            let other = parse_money(&args.other_cam)?;

            let mut input = service.prepare(building_id, period, other)?;
            input.description = description.unwrap_or_default();

            let record = service.create(input)?;

            println!(
                "Recorded owner CAM share for {} ({})",
                record.building_name,
                record.period()
            );
            println!(
                "  Owner share: {}",
                record.total_amount.format_with_symbol(&ctx.settings.currency_symbol)
            );
            println!(
                "  Total CAM:   {}",
                record
                    .total_cam_costs
                    .format_with_symbol(&ctx.settings.currency_symbol)
            );
            println!("  Status:      {}", record.status);
            println!("  ID:          {}", record.id);
        }
    }

    Ok(())
}
