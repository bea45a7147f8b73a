//! Settlement CLI commands
//!
//! Bridges clap argument parsing with [`SettlementService`]. Ids are accepted
//! either as bare UUIDs or with their display prefix (`hh-`, `usr-`, `stl-`).

use std::str::FromStr;

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_breakdown, format_settlement_details, format_settlement_list, MemberNames};
use crate::error::{SettleError, SettleResult};
use crate::models::{HouseholdId, SettlementId, SettlementMonth, UserId};
use crate::services::SettlementService;
use crate::storage::{LedgerSource, Storage};

/// Settlement subcommands
#[derive(Subcommand)]
pub enum SettlementCommands {
    /// Compute and store a DRAFT settlement for a month
    Run {
        /// Household ID
        household: String,
        /// Month to settle (YYYY-MM), defaults to last month
        month: Option<String>,
    },
    /// Finalize a DRAFT settlement (admin only)
    Finalize {
        /// Household ID
        household: String,
        /// Settlement ID
        settlement: String,
        /// Acting member's user ID
        #[arg(long = "as", value_name = "USER")]
        actor: String,
    },
    /// Show a settlement and its transfer lines
    Show {
        /// Household ID
        household: String,
        /// Settlement ID
        settlement: String,
    },
    /// List a household's settlements, newest first
    List {
        /// Household ID
        household: String,
    },
    /// Compute a month's settlement without saving it
    Preview {
        /// Household ID
        household: String,
        /// Month to settle (YYYY-MM), defaults to last month
        month: Option<String>,
    },
    /// Show recent settlement audit entries for a household
    History {
        /// Household ID
        household: String,
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },
}

fn parse_id<T>(kind: &str, value: &str) -> SettleResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| SettleError::Validation(format!("Invalid {} '{}': {}", kind, value, e)))
}

fn parse_month(value: &str) -> SettleResult<SettlementMonth> {
    value
        .trim()
        .parse()
        .map_err(|e| SettleError::Validation(format!("{}", e)))
}

/// The requested month, or the last completed one
fn month_or_last(value: Option<&str>) -> SettleResult<SettlementMonth> {
    match value {
        Some(value) => parse_month(value),
        None => Ok(SettlementMonth::current().prev()),
    }
}

/// Handle a settlement command
pub fn handle_settlement_command(
    storage: &Storage,
    settings: &Settings,
    cmd: SettlementCommands,
) -> SettleResult<()> {
    let service = SettlementService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        SettlementCommands::Run { household, month } => {
            let household: HouseholdId = parse_id("household ID", &household)?;
            let month = month_or_last(month.as_deref())?;

            let draft = service.run_settlement(household, month)?;
            let names = MemberNames::new(&storage.load_members(household)?);

            println!("Drafted settlement for {}", draft.period());
            println!();
            print!("{}", format_settlement_details(&draft, &names, settings));
        }

        SettlementCommands::Finalize {
            household,
            settlement,
            actor,
        } => {
            let household: HouseholdId = parse_id("household ID", &household)?;
            let settlement: SettlementId = parse_id("settlement ID", &settlement)?;
            let actor: UserId = parse_id("user ID", &actor)?;

            let finalized = service.finalize_settlement(household, settlement, actor)?;
            println!(
                "Finalized settlement {} ({})",
                finalized.period(),
                finalized.id.as_uuid()
            );
        }

        SettlementCommands::Show {
            household,
            settlement,
        } => {
            let household: HouseholdId = parse_id("household ID", &household)?;
            let settlement: SettlementId = parse_id("settlement ID", &settlement)?;

            let found = service.find_one(household, settlement)?;
            let names = MemberNames::new(&storage.load_members(household)?);
            print!("{}", format_settlement_details(&found, &names, settings));
        }

        SettlementCommands::List { household } => {
            let household: HouseholdId = parse_id("household ID", &household)?;
            let settlements = service.find_all(household)?;
            println!("{}", format_settlement_list(&settlements, symbol));
        }

        SettlementCommands::Preview { household, month } => {
            let household: HouseholdId = parse_id("household ID", &household)?;
            let month = month_or_last(month.as_deref())?;

            let breakdown = service.preview(household, month)?;
            let names = MemberNames::new(&storage.load_members(household)?);

            println!("Preview for {} (not saved)", month);
            println!();
            print!("{}", format_breakdown(&breakdown, &names, symbol));
        }

        SettlementCommands::History { household, limit } => {
            let household: HouseholdId = parse_id("household ID", &household)?;
            let entries = storage.audit().read_recent(household, limit)?;

            if entries.is_empty() {
                println!("No audit entries found.");
            }
            for entry in entries {
                println!("{}", entry.format_human_readable());
            }
        }
    }

    Ok(())
}
