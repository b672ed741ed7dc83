//! Reminder composition and per-recipient delivery

use serde::Serialize;
use tracing::{info, warn};

use crate::models::{Group, Member, MemberId, Money};

use super::MessageGateway;

/// Result of attempting to remind one member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// Delivered; carries the gateway message id
    Sent(String),
    /// The gateway rejected or failed the send
    Failed(String),
    /// The member has no contact handle
    SkippedNoContact,
}

impl DeliveryOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent(_))
    }
}

/// Outcome of a reminder for one member
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReport {
    pub member_id: MemberId,
    pub member_name: String,
    pub amount_owed: Money,
    pub outcome: DeliveryOutcome,
}

/// Build the reminder text for a member who owes money in a group
pub fn reminder_message(member_name: &str, owed: Money, symbol: &str, group: &Group) -> String {
    let mut message = format!(
        "Hi {}! You owe {} in the group \"{}\". Please settle your dues soon!",
        member_name,
        owed.abs().format_with_symbol(symbol),
        group.name
    );

    if let Some(payment_id) = group.payment_id.as_deref().filter(|id| !id.trim().is_empty()) {
        message.push_str(&format!("\nPay via UPI: {}", payment_id));
    }

    message
}

/// Sends reminders through a gateway
pub struct NotificationDispatcher<'a> {
    gateway: &'a dyn MessageGateway,
    currency_symbol: &'a str,
}

impl<'a> NotificationDispatcher<'a> {
    pub fn new(gateway: &'a dyn MessageGateway, currency_symbol: &'a str) -> Self {
        Self {
            gateway,
            currency_symbol,
        }
    }

    /// Remind every debtor of what they owe in `group`
    ///
    /// Each pair is sent independently; reports come back in input order.
    pub fn dispatch(&self, group: &Group, debtors: &[(Member, Money)]) -> Vec<DeliveryReport> {
        debtors
            .iter()
            .map(|(member, owed)| {
                let outcome = self.remind(group, member, *owed);
                DeliveryReport {
                    member_id: member.id,
                    member_name: member.name.clone(),
                    amount_owed: owed.abs(),
                    outcome,
                }
            })
            .collect()
    }

    fn remind(&self, group: &Group, member: &Member, owed: Money) -> DeliveryOutcome {
        let Some(handle) = member.contact() else {
            info!(member = %member.id, "no contact handle, reminder skipped");
            return DeliveryOutcome::SkippedNoContact;
        };

        let body = reminder_message(&member.name, owed, self.currency_symbol, group);

        match self.gateway.send(handle, &body) {
            Ok(message_id) => {
                info!(
                    gateway = self.gateway.name(),
                    member = %member.id,
                    message_id = %message_id,
                    "reminder sent"
                );
                DeliveryOutcome::Sent(message_id)
            }
            Err(e) => {
                warn!(gateway = self.gateway.name(), member = %member.id, error = %e, "reminder failed");
                DeliveryOutcome::Failed(e.to_string())
            }
        }
    }
}
