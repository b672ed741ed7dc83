//! Reminder service
//!
//! Finds the members of a group who owe money and reminds each of them
//! through a message gateway.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::PayupResult;
use crate::models::{GroupId, MemberId, Money};
use crate::notify::{DeliveryReport, MessageGateway, NotificationDispatcher};
use crate::storage::{LedgerStore, Storage};

use super::balance::BalanceService;

/// Result of a reminder run for one group
#[derive(Debug, Clone, Serialize)]
pub struct ReminderReport {
    pub group_id: GroupId,
    pub group_name: String,
    pub reports: Vec<DeliveryReport>,
    /// Rounded balances the reminders were based on
    pub balances: BTreeMap<MemberId, Money>,
}

impl ReminderReport {
    /// Number of reminders actually delivered
    pub fn sent_count(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_sent()).count()
    }
}

/// Service for payment reminders
pub struct ReminderService<'a> {
    storage: &'a Storage,
    gateway: &'a dyn MessageGateway,
    currency_symbol: &'a str,
}

impl<'a> ReminderService<'a> {
    /// Create a new reminder service
    pub fn new(
        storage: &'a Storage,
        gateway: &'a dyn MessageGateway,
        currency_symbol: &'a str,
    ) -> Self {
        Self {
            storage,
            gateway,
            currency_symbol,
        }
    }

    /// Remind every member with a negative balance in the group
    ///
    /// Delivery failures are reported per member and never abort the run.
    pub fn send_reminders(&self, group_id: GroupId) -> PayupResult<ReminderReport> {
        let group = self.storage.fetch_group(group_id)?;
        let sheet = BalanceService::new(self.storage).group_balances(group_id)?;
        let members = self.storage.fetch_group_members(group_id)?;

        let debtors: Vec<_> = sheet
            .debtors()
            .into_iter()
            .filter_map(|(member_id, owed)| {
                let member = members.iter().find(|m| m.id == member_id).cloned();
                if member.is_none() {
                    warn!(member = %member_id, "debtor is not a registered member, skipping");
                }
                member.map(|m| (m, owed))
            })
            .collect();

        let dispatcher = NotificationDispatcher::new(self.gateway, self.currency_symbol);
        let reports = dispatcher.dispatch(&group, &debtors);

        let report = ReminderReport {
            group_id,
            group_name: group.name,
            reports,
            balances: sheet.rounded(),
        };

        info!(
            group = %group_id,
            debtors = debtors.len(),
            sent = report.sent_count(),
            "reminders dispatched"
        );

        Ok(report)
    }
}
