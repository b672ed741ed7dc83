//! Storage layer for PayUp
//!
//! Provides JSON file storage with atomic writes and automatic directory
//! creation, plus the audit log and the per-group balance cache that every
//! write path keeps current.

pub mod expenses;
pub mod file_io;
pub mod groups;
pub mod init;
pub mod ledger;
pub mod members;

pub use expenses::ExpenseRepository;
pub use file_io::{read_json, write_json_atomic};
pub use groups::GroupRepository;
pub use init::initialize_storage;
pub use ledger::LedgerStore;
pub use members::MemberRepository;

use serde::Serialize;

use crate::audit::{generate_diff, AuditEntry, AuditLogger, EntityType};
use crate::config::paths::PayupPaths;
use crate::engine::BalanceCache;
use crate::error::PayupError;

/// The one item a user-typed id reference points at
///
/// A short reference shared by several ids is rejected rather than resolved
/// to whichever comes first.
pub(crate) fn unique_reference<T>(
    entity_type: &str,
    reference: &str,
    mut matches: impl Iterator<Item = T>,
) -> Result<Option<T>, PayupError> {
    let first = matches.next();
    if first.is_some() && matches.next().is_some() {
        return Err(PayupError::Validation(format!(
            "Ambiguous {} reference '{}': matches more than one id, use more of it",
            entity_type,
            reference.trim()
        )));
    }
    Ok(first)
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: PayupPaths,
    pub members: MemberRepository,
    pub groups: GroupRepository,
    pub expenses: ExpenseRepository,
    pub balances: BalanceCache,
    audit: AuditLogger,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: PayupPaths) -> Result<Self, PayupError> {
        // Ensure directories exist
        paths.ensure_directories()?;

        Ok(Self {
            members: MemberRepository::new(paths.members_file()),
            groups: GroupRepository::new(paths.groups_file()),
            expenses: ExpenseRepository::new(paths.expenses_file()),
            balances: BalanceCache::new(),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &PayupPaths {
        &self.paths
    }

    /// Get the audit logger
    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), PayupError> {
        self.members.load()?;
        self.groups.load()?;
        self.expenses.load()?;
        self.balances.clear()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), PayupError> {
        self.members.save()?;
        self.groups.save()?;
        self.expenses.save()?;
        Ok(())
    }

    /// Check if storage has been initialized
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    /// Record the creation of an entity in the audit log
    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Result<(), PayupError> {
        let entry = AuditEntry::create(entity_type, entity_id, entity_name, entity);
        self.audit.log(&entry)
    }

    /// Record an update of an entity in the audit log
    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> Result<(), PayupError> {
        let diff = match (serde_json::to_value(before), serde_json::to_value(after)) {
            (Ok(before), Ok(after)) => generate_diff(&before, &after),
            _ => None,
        };

        let entry = AuditEntry::update(entity_type, entity_id, entity_name, before, after, diff);
        self.audit.log(&entry)
    }
}
