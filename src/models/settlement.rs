//! Settlement model
//!
//! A settlement is one participant's obligation to repay the payer their
//! share of a single expense. It moves between `Pending` and `Settled` and
//! can go back and forth any number of times.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{MemberId, SettlementId};
use super::member::{deserialize_member_id, deserialize_opt_member_id};
use super::money::Money;

/// Repayment state of a settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    /// Not yet repaid
    #[default]
    Pending,
    /// Repayment confirmed by a member
    Settled,
}

impl fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Settled => write!(f, "Settled"),
        }
    }
}

/// One participant's share of an expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    /// Unique identifier
    pub id: SettlementId,

    /// The participant who owes the share
    #[serde(deserialize_with = "deserialize_member_id")]
    pub participant: MemberId,

    /// Amount owed, fixed when the expense was created
    pub amount: Money,

    /// Whether repayment has been confirmed
    #[serde(default)]
    pub settled: bool,

    /// When repayment was confirmed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settled_at: Option<DateTime<Utc>>,

    /// Who confirmed the repayment
    #[serde(
        default,
        deserialize_with = "deserialize_opt_member_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub settled_by: Option<MemberId>,
}

impl Settlement {
    /// Create a new pending settlement
    pub fn new(participant: MemberId, amount: Money) -> Self {
        Self {
            id: SettlementId::new(),
            participant,
            amount,
            settled: false,
            settled_at: None,
            settled_by: None,
        }
    }

    /// Current state
    pub fn status(&self) -> SettlementStatus {
        if self.settled {
            SettlementStatus::Settled
        } else {
            SettlementStatus::Pending
        }
    }

    /// Check if repayment has been confirmed
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Confirm repayment
    ///
    /// Re-marking an already settled record overwrites the actor and time.
    pub fn mark_settled(&mut self, settled_by: MemberId, at: DateTime<Utc>) {
        self.settled = true;
        self.settled_by = Some(settled_by);
        self.settled_at = Some(at);
    }

    /// Undo a confirmation, clearing the actor and time
    pub fn mark_pending(&mut self) {
        self.settled = false;
        self.settled_by = None;
        self.settled_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_is_pending() {
        let settlement = Settlement::new(MemberId::new(), Money::from_major(45));
        assert_eq!(settlement.status(), SettlementStatus::Pending);
        assert!(settlement.settled_at.is_none());
        assert!(settlement.settled_by.is_none());
    }

    #[test]
    fn test_mark_settled_twice_keeps_latest() {
        let mut settlement = Settlement::new(MemberId::new(), Money::from_major(45));
        let first_actor = MemberId::new();
        let second_actor = MemberId::new();
        let first_time = Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap();
        let second_time = Utc.with_ymd_and_hms(2025, 1, 16, 10, 0, 0).unwrap();

        settlement.mark_settled(first_actor, first_time);
        settlement.mark_settled(second_actor, second_time);

        assert_eq!(settlement.status(), SettlementStatus::Settled);
        assert_eq!(settlement.settled_by, Some(second_actor));
        assert_eq!(settlement.settled_at, Some(second_time));
    }

    #[test]
    fn test_mark_pending_restores_original_shape() {
        let original = Settlement::new(MemberId::new(), Money::from_major(45));
        let mut settlement = original.clone();

        settlement.mark_settled(MemberId::new(), Utc::now());
        settlement.mark_pending();

        assert_eq!(settlement, original);
    }

    #[test]
    fn test_pending_serialization_omits_settle_fields() {
        let settlement = Settlement::new(MemberId::new(), Money::from_major(45));
        let json = serde_json::to_value(&settlement).unwrap();
        assert!(json.get("settled_at").is_none());
        assert!(json.get("settled_by").is_none());

        let back: Settlement = serde_json::from_value(json).unwrap();
        assert_eq!(back, settlement);
    }
}
