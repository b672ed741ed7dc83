//! Display formatting for terminal output
//!
//! Provides utilities for formatting members, groups, expenses and
//! settlements for terminal display.

use std::collections::HashMap;

use crate::models::{Member, MemberId};

pub mod expense;
pub mod group;
pub mod member;
pub mod settlement;

pub use expense::{format_expense_details, format_expense_register};
pub use group::{format_balance_table, format_group_details, format_group_list, format_member_balances};
pub use member::{format_member_details, format_member_list};
pub use settlement::{
    format_bulk_report, format_reminder_report, format_settlement_list, format_summary,
};

/// Member names keyed by id, used to label ids in tables
#[derive(Debug, Default, Clone)]
pub struct MemberNames(HashMap<MemberId, String>);

impl MemberNames {
    pub fn from_members<'a>(members: impl IntoIterator<Item = &'a Member>) -> Self {
        Self(members.into_iter().map(|m| (m.id, m.name.clone())).collect())
    }

    /// Name of a member, or its short id when unknown
    pub fn get(&self, id: MemberId) -> String {
        self.0.get(&id).cloned().unwrap_or_else(|| id.to_string())
    }
}

/// Cut a string to at most `max_len` characters, marking the cut with "..."
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        ".".repeat(max_len)
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}
