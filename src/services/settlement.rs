//! Settlement service
//!
//! Moves settlements between pending and settled, one at a time or in bulk,
//! and reports per-group totals.
//!
//! Each transition is an independent write of one settlement record. Two
//! transitions racing on the same record resolve last-write-wins. Bulk
//! transitions run one thread per item and never roll back: the caller gets
//! a per-item report.

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::audit::EntityType;
use crate::engine::{aggregate, SettlementSummary};
use crate::error::{PayupError, PayupResult};
use crate::models::{ExpenseId, GroupId, MemberId, Money, Settlement, SettlementId};
use crate::storage::{LedgerStore, Storage};

/// Service for settlement transitions
pub struct SettlementService<'a> {
    storage: &'a Storage,
}

/// Outcome of one item in a bulk transition
#[derive(Debug)]
pub struct BulkItem {
    pub settlement_id: SettlementId,
    pub result: PayupResult<Settlement>,
}

/// Per-item outcome of a bulk transition, in request order
#[derive(Debug, Default)]
pub struct BulkReport {
    pub items: Vec<BulkItem>,
}

impl BulkReport {
    /// Number of items that transitioned
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.result.is_ok()).count()
    }

    /// Items that failed, with their errors
    pub fn failures(&self) -> impl Iterator<Item = (SettlementId, &PayupError)> {
        self.items
            .iter()
            .filter_map(|i| i.result.as_ref().err().map(|e| (i.settlement_id, e)))
    }

    /// True when every item transitioned
    pub fn all_succeeded(&self) -> bool {
        self.items.iter().all(|i| i.result.is_ok())
    }
}

/// A settlement together with the expense it belongs to
#[derive(Debug, Clone, Serialize)]
pub struct SettlementEntry {
    pub expense_id: ExpenseId,
    pub expense_description: String,
    pub paid_by: MemberId,
    pub settlement: Settlement,
}

impl<'a> SettlementService<'a> {
    /// Create a new settlement service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Mark a settlement as paid
    ///
    /// Re-marking a settled record overwrites who settled it and when.
    pub fn mark_settled(
        &self,
        settlement_id: SettlementId,
        settled_by: MemberId,
    ) -> PayupResult<Settlement> {
        if self.storage.members.get(settled_by)?.is_none() {
            return Err(PayupError::member_not_found(settled_by.to_string()));
        }

        self.transition(settlement_id, |s| s.mark_settled(settled_by, Utc::now()))
    }

    /// Return a settlement to pending, clearing who settled it and when
    pub fn mark_pending(&self, settlement_id: SettlementId) -> PayupResult<Settlement> {
        self.transition(settlement_id, Settlement::mark_pending)
    }

    /// Mark many settlements as paid, independently of each other
    pub fn bulk_mark_settled(&self, ids: &[SettlementId], settled_by: MemberId) -> BulkReport {
        let report = self.fan_out(ids, |id| self.mark_settled(id, settled_by));
        info!(
            requested = ids.len(),
            succeeded = report.succeeded(),
            "bulk settle finished"
        );
        report
    }

    /// Return many settlements to pending, independently of each other
    pub fn bulk_mark_pending(&self, ids: &[SettlementId]) -> BulkReport {
        let report = self.fan_out(ids, |id| self.mark_pending(id));
        info!(
            requested = ids.len(),
            succeeded = report.succeeded(),
            "bulk unsettle finished"
        );
        report
    }

    /// Pending and settled totals across a group's expenses
    pub fn summary(&self, group_id: GroupId) -> PayupResult<SettlementSummary> {
        self.storage.fetch_group(group_id)?;
        let expenses = self.storage.fetch_group_expenses(group_id)?;
        Ok(aggregate(expenses.iter().flat_map(|e| e.settlements.iter())))
    }

    /// Every settlement in a group, newest expense first
    pub fn list(&self, group_id: GroupId) -> PayupResult<Vec<SettlementEntry>> {
        self.storage.fetch_group(group_id)?;
        let expenses = self.storage.fetch_group_expenses(group_id)?;

        Ok(expenses
            .into_iter()
            .flat_map(|expense| {
                let (expense_id, description, paid_by) =
                    (expense.id, expense.description, expense.paid_by);
                expense
                    .settlements
                    .into_iter()
                    .map(move |settlement| SettlementEntry {
                        expense_id,
                        expense_description: description.clone(),
                        paid_by,
                        settlement,
                    })
            })
            .collect())
    }

    /// What a member still owes across a group's pending settlements
    pub fn outstanding_for(&self, group_id: GroupId, member_id: MemberId) -> PayupResult<Money> {
        Ok(self
            .list(group_id)?
            .iter()
            .filter(|e| e.settlement.participant == member_id && !e.settlement.is_settled())
            .map(|e| e.settlement.amount)
            .sum())
    }

    /// Find a settlement by a full or shortened id
    pub fn find(&self, identifier: &str) -> PayupResult<Option<Settlement>> {
        Ok(self
            .storage
            .expenses
            .find_settlement_by_reference(identifier)?
            .map(|(_, settlement)| settlement))
    }

    fn transition<F>(&self, settlement_id: SettlementId, apply: F) -> PayupResult<Settlement>
    where
        F: FnOnce(&mut Settlement),
    {
        let before = self.storage.fetch_settlement(settlement_id)?;
        let mut after = before.clone();
        apply(&mut after);

        self.storage.persist_settlement_update(&after)?;

        self.storage.log_update(
            EntityType::Settlement,
            after.id.to_string(),
            None,
            &before,
            &after,
        )?;

        info!(
            settlement = %after.id,
            status = %after.status(),
            "settlement updated"
        );
        Ok(after)
    }

    fn fan_out<F>(&self, ids: &[SettlementId], apply: F) -> BulkReport
    where
        F: Fn(SettlementId) -> PayupResult<Settlement> + Sync,
    {
        let apply = &apply;

        let items = std::thread::scope(|scope| {
            let handles: Vec<_> = ids
                .iter()
                .map(|&id| (id, scope.spawn(move || apply(id))))
                .collect();

            handles
                .into_iter()
                .map(|(settlement_id, handle)| {
                    let result = handle.join().unwrap_or_else(|_| {
                        Err(PayupError::Storage(format!(
                            "transition of {} panicked",
                            settlement_id
                        )))
                    });
                    if let Err(e) = &result {
                        warn!(settlement = %settlement_id, error = %e, "bulk item failed");
                    }
                    BulkItem {
                        settlement_id,
                        result,
                    }
                })
                .collect()
        });

        BulkReport { items }
    }
}
