//! Balance computation
//!
//! Derives each member's net position in a group from the group's expenses.
//! Positive balances are owed money, negative balances owe money. The
//! computation is a pure function of the member list and the expenses.

use std::collections::BTreeMap;

use crate::models::{Expense, MemberId, Money};

/// Net balances for one group
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BalanceSheet {
    /// Exact balance per current group member
    balances: BTreeMap<MemberId, Money>,
    /// Contributions of payers/participants who are not current members
    unattributed: BTreeMap<MemberId, Money>,
}

impl BalanceSheet {
    /// Rounded balance of a member, `None` if they are not in the group
    pub fn balance(&self, member_id: MemberId) -> Option<Money> {
        self.balances.get(&member_id).map(Money::rounded)
    }

    /// Exact (unrounded) balance of a member
    pub fn exact_balance(&self, member_id: MemberId) -> Option<Money> {
        self.balances.get(&member_id).copied()
    }

    /// Rounded balance of every member
    pub fn rounded(&self) -> BTreeMap<MemberId, Money> {
        self.balances
            .iter()
            .map(|(&id, amount)| (id, amount.rounded()))
            .collect()
    }

    /// Iterate over exact balances in member id order
    pub fn iter(&self) -> impl Iterator<Item = (MemberId, Money)> + '_ {
        self.balances.iter().map(|(&id, &amount)| (id, amount))
    }

    /// Members whose rounded balance is strictly negative, with the amount they owe
    pub fn debtors(&self) -> Vec<(MemberId, Money)> {
        self.balances
            .iter()
            .map(|(&id, amount)| (id, amount.rounded()))
            .filter(|(_, amount)| amount.is_negative())
            .map(|(id, amount)| (id, amount.abs()))
            .collect()
    }

    /// Contributions from ids that are no longer group members
    pub fn unattributed(&self) -> &BTreeMap<MemberId, Money> {
        &self.unattributed
    }

    /// Whether any expense referenced a non-member
    pub fn has_unattributed(&self) -> bool {
        !self.unattributed.is_empty()
    }

    /// Exact sum over current members
    pub fn total(&self) -> Money {
        self.balances.values().sum()
    }

    /// Check the conservation invariant across members and the unattributed bucket
    ///
    /// Exact shares can carry a repeating remainder, so the sum is compared
    /// after rounding.
    pub fn is_conserved(&self) -> bool {
        let unattributed: Money = self.unattributed.values().sum();
        (self.total() + unattributed).rounded().is_zero()
    }

    /// Number of members in the sheet
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    /// Whether the sheet has no members
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

/// Compute net balances for a group
///
/// Every current member starts at zero. For each expense, every participant
/// is charged `amount / participants` and the payer is credited the full
/// amount, so a payer who also participates nets `amount - share`.
///
/// Ids that are not current members never appear in the member balances;
/// their contributions are kept in the sheet's unattributed bucket instead.
///
/// # Panics
///
/// Panics if an expense has no participants. Expense creation rejects those,
/// so reaching one here means a record bypassed validation.
pub fn compute_balances(members: &[MemberId], expenses: &[Expense]) -> BalanceSheet {
    let mut sheet = BalanceSheet {
        balances: members.iter().map(|&id| (id, Money::zero())).collect(),
        unattributed: BTreeMap::new(),
    };

    for expense in expenses {
        let Some(share) = expense.share() else {
            panic!(
                "expense {} has no participants; validation must reject it",
                expense.id
            );
        };

        for &participant in &expense.participants {
            *sheet.entry(participant) -= share;
        }

        *sheet.entry(expense.paid_by) += expense.amount;
    }

    sheet
}

impl BalanceSheet {
    fn entry(&mut self, member_id: MemberId) -> &mut Money {
        match self.balances.get_mut(&member_id) {
            Some(balance) => balance,
            None => self.unattributed.entry(member_id).or_default(),
        }
    }
}
