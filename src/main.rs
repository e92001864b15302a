use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cam_ledger::cli::{
    handle_allocation_command, handle_audit_command, handle_directory_command,
    handle_record_command, AllocationCommands, CliContext, DirectoryCommands, RecordCommands,
};
use cam_ledger::config::{paths::LedgerPaths, settings::Settings};
use cam_ledger::services::{AccessPolicy, AllowAll, BuildingScope};
use cam_ledger::storage::Storage;

#[derive(Parser)]
#[command(
    name = "camledger",
    version,
    about = "Common-area maintenance cost allocation for multi-tenant buildings",
    long_about = "camledger splits a building's shared costs (generator, transformer and \
                  other CAM costs) between tenants and the owner by occupied area, and \
                  records the owner's share once per billing period."
)]
struct Cli {
    /// Restrict this invocation to the given buildings (e.g. "7,12")
    #[arg(long, global = true, env = "CAM_LEDGER_SCOPE")]
    scope: Option<String>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Allocation(AllocationCommands),

    #[command(flatten)]
    Record(RecordCommands),

    /// Building directory commands
    #[command(subcommand)]
    Directory(DirectoryCommands),

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Only entries for this record ID
        #[arg(short, long)]
        record: Option<String>,
    },

    /// Initialize the ledger data directory
    Init,

    /// Show current configuration and paths
    Config,
}

fn init_tracing(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("cam_ledger=debug,camledger=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let paths = LedgerPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    let mut storage = Storage::new(paths)?;
    storage.load_all()?;

    let scope = cli.scope.as_deref().map(BuildingScope::parse).transpose()?;
    let access: &dyn AccessPolicy = match &scope {
        Some(scope) => scope,
        None => &AllowAll,
    };

    let ctx = CliContext {
        storage: &storage,
        settings: &settings,
        access,
    };

    let paths = storage.paths();
    match cli.command {
        Some(Commands::Allocation(cmd)) => handle_allocation_command(&ctx, cmd)?,
        Some(Commands::Record(cmd)) => handle_record_command(&ctx, cmd)?,
        Some(Commands::Directory(cmd)) => handle_directory_command(&ctx, cmd)?,
        Some(Commands::Audit { limit, record }) => handle_audit_command(&ctx, limit, record)?,
        Some(Commands::Init) => {
            println!("Initializing CAM Ledger at: {}", paths.base_dir().display());
            paths.ensure_directories()?;
            settings.save(paths)?;
            println!("Initialization complete!");
            println!();
            println!("Next, import the building directory exported by your property system:");
            println!("  camledger directory import <file.json>");
        }
        Some(Commands::Config) => {
            println!("CAM Ledger Configuration");
            println!("========================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Audit log:        {}", paths.audit_log().display());
            println!("Initialized:      {}", paths.is_initialized());
            println!();
            println!("Settings:");
            println!("  Currency symbol:    {}", settings.currency_symbol);
            println!("  Area unit:          {}", settings.area_unit);
            println!("  Date format:        {}", settings.date_format);
            println!("  Status transitions: {:?}", settings.status_transitions);
        }
        None => {
            println!("camledger - CAM cost allocation ledger");
            println!();
            println!("Run 'camledger --help' for usage information.");
        }
    }

    Ok(())
}
