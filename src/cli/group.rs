//! Group CLI commands

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_balance_table, format_group_details, format_group_list, MemberNames};
use crate::error::PayupResult;
use crate::services::{BalanceService, CreateGroupInput, GroupService};
use crate::storage::{LedgerStore, Storage};

use super::{require_session, resolve_group, resolve_member};

/// Group subcommands
#[derive(Subcommand)]
pub enum GroupCommands {
    /// Create a new group; you are added as a member
    Create {
        /// Group name
        name: String,
        /// Members to add (id, email or WhatsApp number), repeatable
        #[arg(short, long = "member", required = true)]
        members: Vec<String>,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
        /// UPI id members should pay into
        #[arg(long)]
        upi: Option<String>,
    },
    /// List your groups
    List,
    /// Show group details, balances and expenses
    Show {
        /// Group name or ID
        group: String,
    },
    /// Add a member to a group
    AddMember {
        /// Group name or ID
        group: String,
        /// Member id, email or WhatsApp number
        member: String,
    },
    /// Show who owes and who is owed in a group
    Balances {
        /// Group name or ID
        group: String,
    },
}

/// Handle a group command
pub fn handle_group_command(
    storage: &Storage,
    settings: &Settings,
    cmd: GroupCommands,
) -> PayupResult<()> {
    let service =
        GroupService::new(storage).with_default_payment_id(settings.default_payment_id.clone());
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        GroupCommands::Create {
            name,
            members,
            description,
            upi,
        } => {
            let creator = require_session(storage, settings)?;
            let members = members
                .iter()
                .map(|m| resolve_member(storage, m).map(|m| m.id))
                .collect::<PayupResult<Vec<_>>>()?;

            let group = service.create(
                creator.id,
                CreateGroupInput {
                    name,
                    description,
                    members,
                    payment_id: upi,
                },
            )?;

            println!("Created group: {} ({})", group.name, group.id);
            println!("  Members: {}", group.members.len());
            if let Some(upi) = &group.payment_id {
                println!("  UPI:     {}", upi);
            }
        }

        GroupCommands::List => {
            let member = require_session(storage, settings)?;
            let groups = service.groups_for_member(member.id)?;
            println!("{}", format_group_list(&groups));
        }

        GroupCommands::Show { group } => {
            let group = resolve_group(storage, &group)?;
            let details = service.details(group.id)?;
            print!("{}", format_group_details(&details, symbol));
        }

        GroupCommands::AddMember { group, member } => {
            let group = resolve_group(storage, &group)?;
            let member = resolve_member(storage, &member)?;
            service.add_member(group.id, member.id)?;
            println!("Added {} to {}", member.name, group.name);
        }

        GroupCommands::Balances { group } => {
            let group = resolve_group(storage, &group)?;
            let sheet = BalanceService::new(storage).group_balances(group.id)?;
            let names = MemberNames::from_members(&storage.fetch_group_members(group.id)?);

            let rows: Vec<_> = sheet
                .rounded()
                .into_iter()
                .map(|(id, balance)| (names.get(id), balance))
                .collect();

            println!("Balances for {}:", group.name);
            print!("{}", format_balance_table(&rows, symbol));
        }
    }

    Ok(())
}
