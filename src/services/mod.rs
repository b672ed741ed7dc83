//! Service layer for PayUp
//!
//! The service layer provides business logic on top of the storage layer,
//! handling validation, audit logging, and cross-entity operations.

pub mod balance;
pub mod expense;
pub mod group;
pub mod member;
pub mod reminder;
pub mod settlement;

pub use balance::{BalanceService, MemberGroupBalance};
pub use expense::{AddExpenseInput, ExpenseService};
pub use group::{CreateGroupInput, GroupDetails, GroupService, MemberWithBalance};
pub use member::{MemberService, RegisterMemberInput};
pub use reminder::{ReminderReport, ReminderService};
pub use settlement::{BulkItem, BulkReport, SettlementEntry, SettlementService};
