//! Settlement CLI commands
//!
//! `settle` and `unsettle` take any number of settlement ids and report the
//! outcome of each one.

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_bulk_report, format_settlement_list, format_summary, MemberNames};
use crate::error::PayupResult;
use crate::models::SettlementId;
use crate::services::SettlementService;
use crate::storage::{LedgerStore, Storage};

use super::{require_session, resolve_group};

/// Settlement subcommands
#[derive(Subcommand)]
pub enum SettlementCommands {
    /// List a group's settlements, pending first
    List {
        /// Group name or ID
        group: String,
    },
    /// Mark settlements as repaid
    Settle {
        /// Settlement IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Mark settlements as pending again
    Unsettle {
        /// Settlement IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Show pending and settled totals for a group
    Summary {
        /// Group name or ID
        group: String,
    },
}

/// Handle a settlement command
pub fn handle_settlement_command(
    storage: &Storage,
    settings: &Settings,
    cmd: SettlementCommands,
) -> PayupResult<()> {
    let service = SettlementService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        SettlementCommands::List { group } => {
            let group = resolve_group(storage, &group)?;
            let entries = service.list(group.id)?;
            let names = MemberNames::from_members(&storage.fetch_group_members(group.id)?);
            print!("{}", format_settlement_list(&entries, &names, symbol));
        }

        SettlementCommands::Settle { ids } => {
            let member = require_session(storage, settings)?;
            let (resolved, unresolved) = resolve_ids(&service, &ids)?;
            print_unresolved(&unresolved);

            if !resolved.is_empty() {
                let report = service.bulk_mark_settled(&resolved, member.id);
                print!("{}", format_bulk_report(&report));
            }
        }

        SettlementCommands::Unsettle { ids } => {
            require_session(storage, settings)?;
            let (resolved, unresolved) = resolve_ids(&service, &ids)?;
            print_unresolved(&unresolved);

            if !resolved.is_empty() {
                let report = service.bulk_mark_pending(&resolved);
                print!("{}", format_bulk_report(&report));
            }
        }

        SettlementCommands::Summary { group } => {
            let group = resolve_group(storage, &group)?;
            let summary = service.summary(group.id)?;
            println!("Settlements in {}:", group.name);
            print!("{}", format_summary(&summary, symbol));
        }
    }

    Ok(())
}

/// Split references into settlement ids and (reference, reason) failures
fn resolve_ids(
    service: &SettlementService<'_>,
    references: &[String],
) -> PayupResult<(Vec<SettlementId>, Vec<(String, String)>)> {
    let mut resolved = Vec::new();
    let mut unresolved = Vec::new();

    for reference in references {
        match service.find(reference) {
            Ok(Some(settlement)) => resolved.push(settlement.id),
            Ok(None) => unresolved.push((reference.clone(), "Settlement not found".to_string())),
            Err(e) if e.is_validation() => unresolved.push((reference.clone(), e.to_string())),
            Err(e) => return Err(e),
        }
    }

    Ok((resolved, unresolved))
}

fn print_unresolved(unresolved: &[(String, String)]) {
    for (reference, reason) in unresolved {
        println!("  ✗ {}  {}", reference, reason);
    }
}
