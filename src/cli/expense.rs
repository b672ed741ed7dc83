//! Expense CLI commands

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_expense_details, format_expense_register, MemberNames};
use crate::error::{PayupError, PayupResult};
use crate::services::{AddExpenseInput, ExpenseService};
use crate::storage::{LedgerStore, Storage};

use super::{parse_amount, require_session, resolve_group, resolve_member};

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record an expense split equally among participants
    Add {
        /// Group name or ID
        group: String,
        /// What the money was spent on
        description: String,
        /// Amount paid (e.g., "1200" or "1200.50")
        amount: String,
        /// Who paid; defaults to you
        #[arg(short, long)]
        paid_by: Option<String>,
        /// Participants to split among, repeatable; defaults to every member
        #[arg(short, long = "split")]
        split: Vec<String>,
    },
    /// List a group's expenses, newest first
    List {
        /// Group name or ID
        group: String,
    },
    /// Show an expense and its settlements
    Show {
        /// Expense ID
        expense: String,
    },
}

/// Handle an expense command
pub fn handle_expense_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ExpenseCommands,
) -> PayupResult<()> {
    let service = ExpenseService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        ExpenseCommands::Add {
            group,
            description,
            amount,
            paid_by,
            split,
        } => {
            let session = require_session(storage, settings)?;
            let group = resolve_group(storage, &group)?;
            let amount = parse_amount(&amount)?;

            let paid_by = match paid_by {
                Some(payer) => resolve_member(storage, &payer)?.id,
                None => session.id,
            };
            let participants = if split.is_empty() {
                group.members.clone()
            } else {
                split
                    .iter()
                    .map(|m| resolve_member(storage, m).map(|m| m.id))
                    .collect::<PayupResult<Vec<_>>>()?
            };

            let expense = service.add(AddExpenseInput {
                group_id: group.id,
                description,
                amount,
                paid_by,
                participants,
            })?;

            println!(
                "Recorded {} for '{}' in {} ({})",
                expense.amount.format_with_symbol(symbol),
                expense.description,
                group.name,
                expense.id
            );
            if let Some(share) = expense.share() {
                println!(
                    "  {} each across {} participants, {} settlements pending",
                    share.format_with_symbol(symbol),
                    expense.participants.len(),
                    expense.settlements.len()
                );
            }
        }

        ExpenseCommands::List { group } => {
            let group = resolve_group(storage, &group)?;
            let expenses = service.list(group.id)?;
            let names = MemberNames::from_members(&storage.fetch_group_members(group.id)?);
            print!("{}", format_expense_register(&expenses, &names, symbol));
        }

        ExpenseCommands::Show { expense } => {
            let expense = service
                .find(&expense)?
                .ok_or_else(|| PayupError::expense_not_found(&expense))?;
            let names = MemberNames::from_members(&storage.members.get_all()?);
            print!("{}", format_expense_details(&expense, &names, symbol));
        }
    }

    Ok(())
}
