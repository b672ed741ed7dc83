//! Core data models for PayUp
//!
//! This module contains the data structures of the expense-splitting domain:
//! members, groups, expenses and the settlements embedded in them.

pub mod expense;
pub mod group;
pub mod ids;
pub mod member;
pub mod money;
pub mod settlement;

pub use expense::Expense;
pub use group::Group;
pub use ids::{ExpenseId, GroupId, MemberId, SettlementId};
pub use member::{Member, MemberRef};
pub use money::Money;
pub use settlement::{Settlement, SettlementStatus};
