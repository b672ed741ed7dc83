use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use payup::cli::{
    handle_expense_command, handle_export_command, handle_group_command, handle_member_command,
    handle_remind_command, handle_settlement_command, handle_whatsapp_command,
};
use payup::config::{paths::PayupPaths, settings::Settings};
use payup::storage::Storage;

#[derive(Parser)]
#[command(
    name = "payup",
    version,
    about = "Split group expenses and track who has paid back",
    long_about = "PayUp splits shared expenses equally among group members, \
                  tracks each participant's repayment and sends WhatsApp \
                  reminders to members who still owe money."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Member registration and login
    #[command(subcommand)]
    Member(payup::cli::MemberCommands),

    /// Group management commands
    #[command(subcommand)]
    Group(payup::cli::GroupCommands),

    /// Expense commands
    #[command(subcommand)]
    Expense(payup::cli::ExpenseCommands),

    /// Settlement tracking commands
    #[command(subcommand, alias = "stl")]
    Settlement(payup::cli::SettlementCommands),

    /// Send WhatsApp reminders to members who owe money
    Remind {
        /// Group name or ID
        group: String,
        /// Print the messages instead of sending them
        #[arg(long)]
        dry_run: bool,
    },

    /// WhatsApp gateway commands
    #[command(subcommand)]
    Whatsapp(payup::cli::WhatsAppCommands),

    /// Export a group ledger
    #[command(subcommand)]
    Export(payup::cli::ExportCommands),

    /// Show recent changes from the audit log
    History {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },

    /// Initialize the data directory
    Init,

    /// Show current configuration and paths
    Config,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("payup=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = PayupPaths::new()?;
    let mut persisted = Settings::load_or_create(&paths)?;
    let mut settings = persisted.clone();
    settings.apply_env_overrides();

    // Initialize storage
    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::Member(cmd)) => {
            handle_member_command(&storage, &mut persisted, cmd)?;
        }
        Some(Commands::Group(cmd)) => {
            handle_group_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Expense(cmd)) => {
            handle_expense_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Settlement(cmd)) => {
            handle_settlement_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Remind { group, dry_run }) => {
            handle_remind_command(&storage, &settings, &group, dry_run)?;
        }
        Some(Commands::Whatsapp(cmd)) => {
            handle_whatsapp_command(&settings, cmd)?;
        }
        Some(Commands::Export(cmd)) => {
            handle_export_command(&storage, cmd)?;
        }
        Some(Commands::History { limit }) => {
            let entries = storage.audit().read_recent(limit)?;
            if entries.is_empty() {
                println!("No history yet.");
            }
            for entry in entries.iter().rev() {
                println!("{}", entry.format_human_readable());
            }
        }
        Some(Commands::Init) => {
            println!("Initializing PayUp at: {}", paths.base_dir().display());
            if payup::storage::initialize_storage(&paths)? {
                println!("Created default settings.");
            }
            println!("Initialization complete!");
            println!();
            println!("Next steps:");
            println!("  payup member register <name> --email <email> --whatsapp <number>");
            println!("  payup member login <email>");
        }
        Some(Commands::Config) => {
            println!("PayUp Configuration");
            println!("===================");
            println!("Base directory:  {}", paths.base_dir().display());
            println!("Data directory:  {}", paths.data_dir().display());
            println!("Audit log:       {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Currency:          {}", settings.currency_symbol);
            println!(
                "  Default UPI id:    {}",
                settings.default_payment_id.as_deref().unwrap_or("(none)")
            );
            println!(
                "  WhatsApp:          {}",
                if settings.whatsapp.is_configured() {
                    "configured"
                } else {
                    "not configured"
                }
            );
            println!("  WhatsApp sender:   {}", settings.whatsapp.from_number);
        }
        None => {
            println!("PayUp - group expense splitting");
            println!();
            println!("Run 'payup --help' for usage information.");
        }
    }

    Ok(())
}
