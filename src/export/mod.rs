//! Export module for PayUp
//!
//! Exports a group's ledger:
//! - CSV: one row per settlement (spreadsheet-compatible)
//! - JSON: the full group ledger with balances and a schema version

pub mod csv;
pub mod json;

pub use self::csv::export_group_csv;
pub use self::json::{export_group_json, read_group_export, GroupExport, EXPORT_SCHEMA_VERSION};
