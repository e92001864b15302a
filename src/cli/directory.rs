//! Directory CLI commands

use std::path::PathBuf;

use clap::Subcommand;

use crate::display::format_directory;
use crate::error::CamResult;
use crate::services::import_directory;

use super::CliContext;

/// Directory subcommands
#[derive(Subcommand)]
pub enum DirectoryCommands {
    /// Replace the building directory with an exported JSON snapshot
    Import {
        /// Path to the exported directory file
        file: PathBuf,
    },
    /// Show buildings in the directory
    Show {
        /// Also list every unit with its tenant
        #[arg(short, long)]
        units: bool,
    },
}

/// Handle a directory command
pub fn handle_directory_command(ctx: &CliContext<'_>, cmd: DirectoryCommands) -> CamResult<()> {
    match cmd {
        DirectoryCommands::Import { file } => {
            let snapshot = import_directory(ctx.storage, &file)?;
            let counts = snapshot.counts();
            println!("Imported directory from {}", file.display());
            println!("  Buildings:     {}", counts.buildings);
            println!("  Units:         {}", counts.units);
            println!("  Active leases: {}", counts.active_leases);
        }

        DirectoryCommands::Show { units } => {
            let mut snapshot = ctx.storage.directory.snapshot()?;
            snapshot.buildings.retain(|b| ctx.access.can_access(b.id));
            snapshot.units.retain(|u| ctx.access.can_access(u.building_id));
            print!(
                "{}",
                format_directory(&snapshot, &ctx.storage.directory, units, ctx.settings)
            );
        }
    }

    Ok(())
}
