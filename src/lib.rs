//! PayUp - group expense splitting with settlement tracking
//!
//! This library provides the core functionality for PayUp. Members form
//! groups, record shared expenses split equally among participants, and
//! track each participant's repayment to the payer. Members who owe money can
//! be reminded over WhatsApp.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (members, groups, expenses, settlements)
//! - `engine`: Balance computation and settlement bookkeeping
//! - `storage`: JSON file storage layer and the ledger interface
//! - `services`: Business logic layer
//! - `notify`: Reminder delivery through message gateways
//! - `audit`: Audit logging system
//! - `export`: CSV and JSON export of group ledgers
//!
//! # Example
//!
//! ```rust,ignore
//! use payup::config::{paths::PayupPaths, settings::Settings};
//! use payup::services::BalanceService;
//! use payup::storage::Storage;
//!
//! let paths = PayupPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let mut storage = Storage::new(paths)?;
//! storage.load_all()?;
//! let sheet = BalanceService::new(&storage).group_balances(group_id)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod display;
pub mod engine;
pub mod error;
pub mod export;
pub mod models;
pub mod notify;
pub mod services;
pub mod storage;

pub use error::{PayupError, PayupResult};
