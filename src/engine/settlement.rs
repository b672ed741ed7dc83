//! Settlement creation and aggregation
//!
//! Settlements are generated once, when their expense is created, and are
//! never recalculated afterwards.

use serde::{Deserialize, Serialize};

use crate::models::{Expense, Money, Settlement};

/// Create one pending settlement per participant other than the payer
///
/// Each settlement owes `amount / participants`, counting the payer in the
/// divisor when they participate.
///
/// # Panics
///
/// Panics if the expense has no participants; callers validate first.
pub fn create_settlements_for_expense(expense: &Expense) -> Vec<Settlement> {
    let Some(share) = expense.share() else {
        panic!(
            "expense {} has no participants; validation must reject it",
            expense.id
        );
    };

    expense
        .participants
        .iter()
        .filter(|&&participant| participant != expense.paid_by)
        .map(|&participant| Settlement::new(participant, share))
        .collect()
}

/// Split settlements into (pending, settled)
pub fn partition<'a, I>(settlements: I) -> (Vec<&'a Settlement>, Vec<&'a Settlement>)
where
    I: IntoIterator<Item = &'a Settlement>,
{
    settlements.into_iter().partition(|s| !s.is_settled())
}

/// Totals of pending and settled obligations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SettlementSummary {
    pub total_pending: Money,
    pub total_settled: Money,
    pub pending_count: usize,
    pub settled_count: usize,
}

impl SettlementSummary {
    /// Total of all obligations, repaid or not
    pub fn total(&self) -> Money {
        self.total_pending + self.total_settled
    }

    /// Number of settlements counted
    pub fn count(&self) -> usize {
        self.pending_count + self.settled_count
    }
}

/// Sum pending and settled amounts of a settlement collection
pub fn aggregate<'a, I>(settlements: I) -> SettlementSummary
where
    I: IntoIterator<Item = &'a Settlement>,
{
    let (pending, settled) = partition(settlements);

    SettlementSummary {
        total_pending: pending.iter().map(|s| s.amount).sum(),
        total_settled: settled.iter().map(|s| s.amount).sum(),
        pending_count: pending.len(),
        settled_count: settled.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GroupId, MemberId};
    use chrono::Utc;

    #[test]
    fn test_settlements_skip_payer() {
        let (p, x, y) = (MemberId::new(), MemberId::new(), MemberId::new());
        let expense = Expense::new(GroupId::new(), "Hotel", Money::from_major(300), p, &[p, x, y]);

        let settlements = create_settlements_for_expense(&expense);

        assert_eq!(settlements.len(), 2);
        assert!(settlements.iter().all(|s| s.participant != p));
        assert!(settlements.iter().all(|s| s.amount == Money::from_major(100)));
        assert!(settlements.iter().all(|s| !s.is_settled()));
    }

    #[test]
    fn test_settlement_share_uses_full_participant_count() {
        let (p, x, y) = (MemberId::new(), MemberId::new(), MemberId::new());
        let expense = Expense::new(GroupId::new(), "Cab", Money::from_major(100), p, &[p, x, y]);

        let settlements = create_settlements_for_expense(&expense);
        let share = Money::from_major(100).split(3).unwrap();
        assert!(settlements.iter().all(|s| s.amount == share));
    }

    #[test]
    fn test_payer_only_expense_has_no_settlements() {
        let p = MemberId::new();
        let expense = Expense::new(GroupId::new(), "Snacks", Money::from_major(20), p, &[p]);
        assert!(create_settlements_for_expense(&expense).is_empty());
    }

    #[test]
    #[should_panic(expected = "has no participants")]
    fn test_settlements_for_expense_without_participants_panics() {
        let p = MemberId::new();
        let expense = Expense::new(GroupId::new(), "Nothing", Money::from_major(20), p, &[]);
        create_settlements_for_expense(&expense);
    }

    #[test]
    fn test_payer_excluded_everyone_owes() {
        let (p, x, y) = (MemberId::new(), MemberId::new(), MemberId::new());
        let expense = Expense::new(GroupId::new(), "Gift", Money::from_major(90), p, &[x, y]);

        let settlements = create_settlements_for_expense(&expense);
        assert_eq!(settlements.len(), 2);
        assert!(settlements.iter().all(|s| s.amount == Money::from_major(45)));
    }

    #[test]
    fn test_aggregate() {
        let mut settlements: Vec<Settlement> = [10, 20, 30, 5, 15]
            .iter()
            .map(|&amount| Settlement::new(MemberId::new(), Money::from_major(amount)))
            .collect();
        let actor = MemberId::new();
        for s in settlements.iter_mut().take(3) {
            s.mark_settled(actor, Utc::now());
        }

        let summary = aggregate(&settlements);

        assert_eq!(summary.total_settled, Money::from_major(60));
        assert_eq!(summary.total_pending, Money::from_major(20));
        assert_eq!(summary.settled_count, 3);
        assert_eq!(summary.pending_count, 2);
        assert_eq!(summary.total(), Money::from_major(80));
        assert_eq!(summary.count(), 5);
    }

    #[test]
    fn test_aggregate_empty() {
        let summary = aggregate(&Vec::<Settlement>::new());
        assert_eq!(summary, SettlementSummary::default());
    }

    #[test]
    fn test_partition() {
        let mut settled = Settlement::new(MemberId::new(), Money::from_major(10));
        settled.mark_settled(MemberId::new(), Utc::now());
        let pending = Settlement::new(MemberId::new(), Money::from_major(5));
        let all = vec![settled.clone(), pending.clone()];

        let (p, s) = partition(&all);
        assert_eq!(p, vec![&pending]);
        assert_eq!(s, vec![&settled]);
    }
}
