//! Expense model
//!
//! A single payment made by one member on behalf of a set of participants.
//! Settlements for every non-payer participant are embedded in the expense
//! and created together with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{ExpenseId, GroupId, MemberId, SettlementId};
use super::member::{deserialize_member_id, deserialize_member_ids};
use super::money::Money;
use super::settlement::Settlement;

/// A shared expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier
    pub id: ExpenseId,

    /// The group this expense belongs to
    pub group_id: GroupId,

    /// What the money was spent on
    pub description: String,

    /// Total amount paid
    pub amount: Money,

    /// Member who paid
    #[serde(deserialize_with = "deserialize_member_id")]
    pub paid_by: MemberId,

    /// Members sharing the cost (may or may not include the payer)
    #[serde(deserialize_with = "deserialize_member_ids")]
    pub participants: Vec<MemberId>,

    /// One settlement per participant other than the payer
    #[serde(default)]
    pub settlements: Vec<Settlement>,

    /// When the expense was recorded
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Create a new expense without settlements
    ///
    /// Duplicate participant ids are collapsed, keeping first-seen order.
    pub fn new(
        group_id: GroupId,
        description: impl Into<String>,
        amount: Money,
        paid_by: MemberId,
        participants: &[MemberId],
    ) -> Self {
        let mut unique = Vec::with_capacity(participants.len());
        for &participant in participants {
            if !unique.contains(&participant) {
                unique.push(participant);
            }
        }

        Self {
            id: ExpenseId::new(),
            group_id,
            description: description.into(),
            amount,
            paid_by,
            participants: unique,
            settlements: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Each participant's share of the amount
    ///
    /// `None` only when there are no participants, which validation rejects.
    pub fn share(&self) -> Option<Money> {
        self.amount.split(self.participants.len())
    }

    /// Check if a member is one of the participants
    pub fn has_participant(&self, member_id: MemberId) -> bool {
        self.participants.contains(&member_id)
    }

    /// Find an embedded settlement
    pub fn settlement(&self, id: SettlementId) -> Option<&Settlement> {
        self.settlements.iter().find(|s| s.id == id)
    }

    /// Find an embedded settlement for mutation
    pub fn settlement_mut(&mut self, id: SettlementId) -> Option<&mut Settlement> {
        self.settlements.iter_mut().find(|s| s.id == id)
    }

    /// Check whether every settlement has been repaid
    pub fn is_fully_settled(&self) -> bool {
        self.settlements.iter().all(Settlement::is_settled)
    }

    /// Validate the expense on its own (membership is checked by the caller)
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        if self.description.trim().is_empty() {
            return Err(ExpenseValidationError::EmptyDescription);
        }
        if !self.amount.is_positive() {
            return Err(ExpenseValidationError::NonPositiveAmount(self.amount));
        }
        if self.participants.is_empty() {
            return Err(ExpenseValidationError::NoParticipants);
        }
        Ok(())
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.created_at.format("%Y-%m-%d"),
            self.description,
            self.amount
        )
    }
}

/// Validation errors for expenses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseValidationError {
    EmptyDescription,
    NonPositiveAmount(Money),
    NoParticipants,
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDescription => write!(f, "Expense description cannot be empty"),
            Self::NonPositiveAmount(amount) => {
                write!(f, "Expense amount must be positive, got {}", amount)
            }
            Self::NoParticipants => write!(f, "An expense needs at least one participant"),
        }
    }
}

impl std::error::Error for ExpenseValidationError {}
