//! Notification dispatch for payment reminders
//!
//! A `MessageGateway` delivers one text to one handle. The
//! `NotificationDispatcher` turns a list of debtors into reminder messages,
//! sends each through a gateway and reports a per-recipient outcome. One
//! recipient's failure never stops delivery to the others.

mod dispatcher;
mod dry_run;
mod twilio;

pub use dispatcher::{reminder_message, DeliveryOutcome, DeliveryReport, NotificationDispatcher};
pub use dry_run::LogGateway;
pub use twilio::{TwilioAccount, TwilioGateway};

use crate::error::PayupResult;

/// A channel that can deliver a text message to a contact handle
pub trait MessageGateway: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Send a message, returning the gateway's message id
    fn send(&self, to: &str, body: &str) -> PayupResult<String>;
}
