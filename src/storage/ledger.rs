//! The ledger interface the balance engine and settlement tracker read from
//! and write to.
//!
//! Services depend on this trait rather than on the JSON repositories so the
//! persistence engine can be swapped without touching balance logic.

use tracing::warn;

use crate::error::{PayupError, PayupResult};
use crate::models::{Expense, Group, GroupId, Member, Settlement, SettlementId};

use super::Storage;

/// Key-based persistence for groups, expenses and settlements
pub trait LedgerStore {
    /// Fetch a group record
    fn fetch_group(&self, group_id: GroupId) -> PayupResult<Group>;

    /// Fetch the member records of a group
    ///
    /// Member ids with no registered member are skipped.
    fn fetch_group_members(&self, group_id: GroupId) -> PayupResult<Vec<Member>>;

    /// Fetch a group's expenses, each with its settlements, newest first
    fn fetch_group_expenses(&self, group_id: GroupId) -> PayupResult<Vec<Expense>>;

    /// Fetch a settlement record
    fn fetch_settlement(&self, settlement_id: SettlementId) -> PayupResult<Settlement>;

    /// Persist a new expense together with its settlements in one write
    fn persist_expense(&self, expense: &Expense, settlements: &[Settlement]) -> PayupResult<()>;

    /// Persist the new state of a single settlement record
    fn persist_settlement_update(&self, settlement: &Settlement) -> PayupResult<()>;
}

impl LedgerStore for Storage {
    fn fetch_group(&self, group_id: GroupId) -> PayupResult<Group> {
        self.groups
            .get(group_id)?
            .ok_or_else(|| PayupError::group_not_found(group_id.to_string()))
    }

    fn fetch_group_members(&self, group_id: GroupId) -> PayupResult<Vec<Member>> {
        let group = self.fetch_group(group_id)?;

        let mut members = Vec::with_capacity(group.members.len());
        for member_id in &group.members {
            match self.members.get(*member_id)? {
                Some(member) => members.push(member),
                None => warn!(group = %group_id, member = %member_id, "group lists an unknown member"),
            }
        }

        Ok(members)
    }

    fn fetch_group_expenses(&self, group_id: GroupId) -> PayupResult<Vec<Expense>> {
        self.expenses.get_by_group(group_id)
    }

    fn fetch_settlement(&self, settlement_id: SettlementId) -> PayupResult<Settlement> {
        self.expenses
            .find_settlement(settlement_id)?
            .map(|(_, settlement)| settlement)
            .ok_or_else(|| PayupError::settlement_not_found(settlement_id.to_string()))
    }

    fn persist_expense(&self, expense: &Expense, settlements: &[Settlement]) -> PayupResult<()> {
        let mut record = expense.clone();
        record.settlements = settlements.to_vec();

        let group_id = record.group_id;
        self.expenses.upsert(record)?;
        self.balances.invalidate(group_id)?;
        self.expenses.save()
    }

    fn persist_settlement_update(&self, settlement: &Settlement) -> PayupResult<()> {
        let (expense_id, _) = self
            .expenses
            .find_settlement(settlement.id)?
            .ok_or_else(|| PayupError::settlement_not_found(settlement.id.to_string()))?;

        let group_id = self.expenses.replace_settlement(expense_id, settlement)?;
        self.balances.invalidate(group_id)?;
        self.expenses.save()
    }
}
