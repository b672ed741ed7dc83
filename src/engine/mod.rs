//! Balance and settlement engine
//!
//! Pure computations over data already loaded from storage: net balances per
//! member, settlement generation for new expenses, and pending/settled
//! aggregation. Nothing here performs I/O.

pub mod balance;
pub mod cache;
pub mod settlement;

pub use balance::{compute_balances, BalanceSheet};
pub use cache::BalanceCache;
pub use settlement::{aggregate, create_settlements_for_expense, partition, SettlementSummary};
