//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod expense;
pub mod export;
pub mod group;
pub mod member;
pub mod remind;
pub mod settlement;

pub use expense::{handle_expense_command, ExpenseCommands};
pub use export::{handle_export_command, ExportCommands};
pub use group::{handle_group_command, GroupCommands};
pub use member::{handle_member_command, MemberCommands};
pub use remind::{handle_remind_command, handle_whatsapp_command, WhatsAppCommands};
pub use settlement::{handle_settlement_command, SettlementCommands};

use crate::config::settings::Settings;
use crate::error::{PayupError, PayupResult};
use crate::models::{Group, Member, Money};
use crate::services::{GroupService, MemberService};
use crate::storage::Storage;

/// The member logged in on this machine
pub(crate) fn require_session(storage: &Storage, settings: &Settings) -> PayupResult<Member> {
    let member_id = settings.active_member.ok_or_else(|| {
        PayupError::Credential("Not logged in. Run 'payup member login' first.".into())
    })?;

    MemberService::new(storage).get(member_id)?.ok_or_else(|| {
        PayupError::Credential("Session refers to an unknown member. Log in again.".into())
    })
}

/// Resolve a member by id, email or WhatsApp number
pub(crate) fn resolve_member(storage: &Storage, identifier: &str) -> PayupResult<Member> {
    MemberService::new(storage)
        .find(identifier)?
        .ok_or_else(|| PayupError::member_not_found(identifier))
}

/// Resolve a group by id or name
pub(crate) fn resolve_group(storage: &Storage, identifier: &str) -> PayupResult<Group> {
    GroupService::new(storage)
        .find(identifier)?
        .ok_or_else(|| PayupError::group_not_found(identifier))
}

/// Parse an amount typed on the command line
pub(crate) fn parse_amount(input: &str) -> PayupResult<Money> {
    Money::parse(input)
        .map_err(|e| PayupError::Validation(format!("Invalid amount '{}': {}", input, e)))
}
