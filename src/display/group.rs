//! Group display formatting
//!
//! Group lists, the group detail view and balance tables.

use crate::models::{Group, Money};
use crate::services::{GroupDetails, MemberGroupBalance};

use super::expense::format_expense_register;
use super::settlement::format_summary;
use super::{truncate, MemberNames};

/// Format a list of groups as a table
pub fn format_group_list(groups: &[Group]) -> String {
    if groups.is_empty() {
        return "No groups found.".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!("{:<12}  {:<24}  {:>7}  {}\n", "ID", "Name", "Members", "UPI"));
    output.push_str(&format!("{:-<12}  {:-<24}  {:->7}  {:-<12}\n", "", "", "", ""));

    for group in groups {
        output.push_str(&format!(
            "{:<12}  {:<24}  {:>7}  {}\n",
            group.id.to_string(),
            truncate(&group.name, 24),
            group.members.len(),
            group.payment_id.as_deref().unwrap_or("-"),
        ));
    }

    output
}

/// Format name/balance rows with an owes/owed label
pub fn format_balance_table(rows: &[(String, Money)], symbol: &str) -> String {
    if rows.is_empty() {
        return "No balances.\n".to_string();
    }

    let name_width = rows
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(6)
        .max(6);

    let mut output = String::new();
    for (name, balance) in rows {
        let balance = balance.rounded();
        let label = if balance.is_negative() {
            "owes"
        } else if balance.is_positive() {
            "is owed"
        } else {
            "settled up"
        };
        output.push_str(&format!(
            "  {:<name_width$}  {:>12}  {}\n",
            name,
            balance.format_with_symbol(symbol),
            label,
            name_width = name_width,
        ));
    }

    output
}

/// Format the group detail view
pub fn format_group_details(details: &GroupDetails, symbol: &str) -> String {
    let group = &details.group;
    let names = MemberNames::from_members(details.members.iter().map(|m| &m.member));

    let mut output = String::new();
    output.push_str(&format!("Group:       {}\n", group.name));
    output.push_str(&format!("ID:          {}\n", group.id));
    if let Some(description) = &group.description {
        output.push_str(&format!("Description: {}\n", description));
    }
    if let Some(payment_id) = &group.payment_id {
        output.push_str(&format!("UPI:         {}\n", payment_id));
    }
    output.push_str(&format!("Created by:  {}\n", names.get(group.creator)));

    output.push_str("\nBalances:\n");
    let rows: Vec<_> = details
        .members
        .iter()
        .map(|m| (m.member.name.clone(), m.balance))
        .collect();
    output.push_str(&format_balance_table(&rows, symbol));

    if !details.unattributed.is_empty() {
        output.push_str("\nFormer members (not in balances):\n");
        let rows: Vec<_> = details
            .unattributed
            .iter()
            .map(|(id, amount)| (names.get(*id), *amount))
            .collect();
        output.push_str(&format_balance_table(&rows, symbol));
    }

    output.push_str("\nSettlements:\n");
    output.push_str(&format_summary(&details.summary, symbol));

    output.push_str("\nExpenses:\n");
    output.push_str(&format_expense_register(&details.expenses, &names, symbol));

    output
}

/// Format a member's balance in each of their groups
pub fn format_member_balances(balances: &[MemberGroupBalance], symbol: &str) -> String {
    if balances.is_empty() {
        return "You are not in any groups.\n".to_string();
    }

    let rows: Vec<_> = balances
        .iter()
        .map(|b| (b.group_name.clone(), b.balance))
        .collect();
    let mut output = format_balance_table(&rows, symbol);

    let net: Money = balances.iter().map(|b| b.balance).sum();
    output.push_str(&format!("\n  Net: {}\n", net.format_with_symbol(symbol)));
    output
}
