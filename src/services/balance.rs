//! Balance service
//!
//! Serves balance sheets from the per-group cache, recomputing from the
//! ledger on a miss.

use serde::Serialize;

use crate::engine::{compute_balances, BalanceSheet};
use crate::error::PayupResult;
use crate::models::{GroupId, MemberId, Money};
use crate::storage::{LedgerStore, Storage};

/// A member's balance within one of their groups
#[derive(Debug, Clone, Serialize)]
pub struct MemberGroupBalance {
    pub group_id: GroupId,
    pub group_name: String,
    pub balance: Money,
}

/// Service for balance queries
pub struct BalanceService<'a> {
    storage: &'a Storage,
}

impl<'a> BalanceService<'a> {
    /// Create a new balance service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Balance sheet for a group
    pub fn group_balances(&self, group_id: GroupId) -> PayupResult<BalanceSheet> {
        let group = self.storage.fetch_group(group_id)?;

        self.storage.balances.get_or_compute(group_id, || {
            let expenses = self.storage.fetch_group_expenses(group_id)?;
            Ok(compute_balances(&group.members, &expenses))
        })
    }

    /// Balance sheet computed straight from the ledger, bypassing the cache
    pub fn recompute(&self, group_id: GroupId) -> PayupResult<BalanceSheet> {
        let group = self.storage.fetch_group(group_id)?;
        let expenses = self.storage.fetch_group_expenses(group_id)?;
        Ok(compute_balances(&group.members, &expenses))
    }

    /// A member's rounded balance in every group they belong to
    pub fn member_balances(&self, member_id: MemberId) -> PayupResult<Vec<MemberGroupBalance>> {
        let groups = self.storage.groups.get_for_member(member_id)?;

        groups
            .into_iter()
            .map(|group| {
                let sheet = self.group_balances(group.id)?;
                Ok(MemberGroupBalance {
                    group_id: group.id,
                    group_name: group.name,
                    balance: sheet.balance(member_id).unwrap_or_default(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::PayupPaths;
    use crate::engine::create_settlements_for_expense;
    use crate::models::{Expense, Group};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = PayupPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn record_expense(storage: &Storage, group_id: GroupId, amount: i64, payer: MemberId, participants: &[MemberId]) {
        let expense = Expense::new(group_id, "Shared", Money::from_major(amount), payer, participants);
        let settlements = create_settlements_for_expense(&expense);
        storage.persist_expense(&expense, &settlements).unwrap();
    }

    #[test]
    fn test_cached_sheet_matches_fresh_computation() {
        let (_temp_dir, storage) = create_test_storage();
        let (a, b, c) = (MemberId::new(), MemberId::new(), MemberId::new());
        let group = Group::new("Flat", a, &[b, c]);
        let group_id = group.id;
        storage.groups.upsert(group).unwrap();

        let service = BalanceService::new(&storage);
        record_expense(&storage, group_id, 300, a, &[a, b, c]);

        let first = service.group_balances(group_id).unwrap();
        assert!(storage.balances.get(group_id).unwrap().is_some());
        assert_eq!(first, service.recompute(group_id).unwrap());
        assert_eq!(first.balance(a), Some(Money::from_major(200)));

        // A new expense invalidates the cached sheet
        record_expense(&storage, group_id, 100, b, &[a, b, c]);
        assert!(storage.balances.get(group_id).unwrap().is_none());

        let second = service.group_balances(group_id).unwrap();
        assert_eq!(second, service.recompute(group_id).unwrap());
        assert_eq!(second.balance(b), Some(Money::from_decimal(dec!(-33.33))));
        assert_eq!(second.balance(a), Some(Money::from_decimal(dec!(166.67))));
    }

    #[test]
    fn test_write_during_computation_is_not_masked() {
        let (_temp_dir, storage) = create_test_storage();
        let (a, b) = (MemberId::new(), MemberId::new());
        let group = Group::new("Flat", a, &[b]);
        let group_id = group.id;
        storage.groups.upsert(group).unwrap();

        // An expense lands after the expenses were read but before the sheet is stored
        let stale = storage
            .balances
            .get_or_compute(group_id, || {
                let sheet = compute_balances(&[a, b], &storage.fetch_group_expenses(group_id)?);
                record_expense(&storage, group_id, 100, a, &[a, b]);
                Ok(sheet)
            })
            .unwrap();
        assert_eq!(stale.balance(a), Some(Money::zero()));

        let service = BalanceService::new(&storage);
        let cached = service.group_balances(group_id).unwrap();
        assert_eq!(cached, service.recompute(group_id).unwrap());
        assert_eq!(cached.balance(a), Some(Money::from_major(50)));
    }

    #[test]
    fn test_member_balances_across_groups() {
        let (_temp_dir, storage) = create_test_storage();
        let (a, b) = (MemberId::new(), MemberId::new());

        let trip = Group::new("Trip", a, &[b]);
        let flat = Group::new("Flat", b, &[a]);
        let solo = Group::new("Solo", b, &[]);
        let (trip_id, flat_id) = (trip.id, flat.id);
        storage.groups.upsert(trip).unwrap();
        storage.groups.upsert(flat).unwrap();
        storage.groups.upsert(solo).unwrap();

        record_expense(&storage, trip_id, 90, a, &[a, b]);
        record_expense(&storage, flat_id, 40, b, &[a, b]);

        let service = BalanceService::new(&storage);
        let balances = service.member_balances(a).unwrap();
        assert_eq!(balances.len(), 2);

        let trip_balance = balances.iter().find(|b| b.group_id == trip_id).unwrap();
        let flat_balance = balances.iter().find(|b| b.group_id == flat_id).unwrap();
        assert_eq!(trip_balance.balance, Money::from_major(45));
        assert_eq!(flat_balance.balance, Money::from_major(-20));
    }

    #[test]
    fn test_unknown_group() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BalanceService::new(&storage);
        assert!(service.group_balances(GroupId::new()).unwrap_err().is_not_found());
    }
}
