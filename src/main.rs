use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use household_settle::cli::{handle_settlement_command, SettlementCommands};
use household_settle::config::{paths::SettlePaths, settings::Settings};
use household_settle::storage::{initialize_storage, Storage};

#[derive(Parser)]
#[command(
    name = "settle",
    version,
    about = "Monthly household expense settlement",
    long_about = "Splits a household's shared expenses by income, folds in personal \
                  reimbursements, and nets the result into a short list of transfers. \
                  Each month is drafted, reviewed, then finalized by an admin."
)]
struct Cli {
    /// Log engine stages at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Settlement(SettlementCommands),

    /// Create the data directory and empty data files
    Init,

    /// Show configuration and paths, or change a setting
    Config {
        /// Setting to change (currency_symbol, date_format, log_level)
        key: Option<String>,
        /// New value
        value: Option<String>,
    },
}

fn init_tracing(verbose: bool, default_level: &str) {
    let filter = if verbose {
        EnvFilter::new("household_settle=debug")
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(format!("household_settle={}", default_level)))
            .unwrap_or_else(|_| EnvFilter::new("household_settle=info"))
    };

    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = SettlePaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;
    init_tracing(cli.verbose, &settings.log_level);

    match cli.command {
        Some(Commands::Settlement(cmd)) => {
            let storage = Storage::new(paths)?;
            storage.load_all()?;
            handle_settlement_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Init) => {
            println!("Initializing household-settle at: {}", paths.base_dir().display());
            initialize_storage(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Data files live in {}", paths.data_dir().display());
        }
        Some(Commands::Config { key, value }) => match (key, value) {
            (Some(key), Some(value)) => {
                settings.set(&key, &value)?;
                settings.save(&paths)?;
                println!("Set {} = {}", key, value);
            }
            (Some(key), None) => {
                anyhow::bail!("Missing value for setting '{}'", key);
            }
            _ => {
                println!("household-settle Configuration");
                println!("==============================");
                println!("Base directory:  {}", paths.base_dir().display());
                println!("Data directory:  {}", paths.data_dir().display());
                println!("Audit log:       {}", paths.audit_log().display());
                println!();
                println!("Settings:");
                println!("  Currency symbol: {}", settings.currency_symbol);
                println!("  Date format:     {}", settings.date_format);
                println!("  Log level:       {}", settings.log_level);
            }
        },
        None => {
            println!("settle - monthly household expense settlement");
            println!();
            println!("Run 'settle --help' for usage information.");
        }
    }

    Ok(())
}
