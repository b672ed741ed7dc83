//! Audit logging system for PayUp
//!
//! Records every create and update of members, groups, expenses and
//! settlements, with before/after values, in an append-only audit log.
//!
//! # Architecture
//!
//! - `AuditEntry`: a single entry with timestamp, operation, entity
//!   information, and optional before/after values.
//! - `AuditLogger`: appends entries to the log file as JSON lines.
//! - `generate_diff`: summarizes changed fields between two entity states.

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
