//! JSON Export functionality
//!
//! Exports a complete group ledger to JSON format with schema versioning.

use std::collections::{BTreeMap, HashSet};
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::{aggregate, SettlementSummary};
use crate::error::{PayupError, PayupResult};
use crate::models::{Expense, Group, GroupId, Member, MemberId, Money};
use crate::services::BalanceService;
use crate::storage::{LedgerStore, Storage};

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Full export of one group's ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    /// Export timestamp
    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    pub group: Group,

    /// Group members, without credentials
    pub members: Vec<Member>,

    /// Expenses with their settlements, newest first
    pub expenses: Vec<Expense>,

    /// Rounded balance per current member
    pub balances: BTreeMap<MemberId, Money>,

    /// Rounded contributions of ids no longer in the group
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub unattributed: BTreeMap<MemberId, Money>,

    pub summary: SettlementSummary,
}

impl GroupExport {
    /// Build an export of a group from storage
    pub fn from_storage(storage: &Storage, group_id: GroupId) -> PayupResult<Self> {
        let group = storage.fetch_group(group_id)?;
        let members = storage
            .fetch_group_members(group_id)?
            .iter()
            .map(Member::without_credentials)
            .collect();
        let expenses = storage.fetch_group_expenses(group_id)?;
        let sheet = BalanceService::new(storage).group_balances(group_id)?;
        let summary = aggregate(expenses.iter().flat_map(|e| e.settlements.iter()));

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            group,
            members,
            expenses,
            balances: sheet.rounded(),
            unattributed: sheet
                .unattributed()
                .iter()
                .map(|(&id, amount)| (id, amount.rounded()))
                .collect(),
            summary,
        })
    }

    /// Validate the export structure
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }

        for expense in &self.expenses {
            if expense.group_id != self.group.id {
                return Err(format!(
                    "Expense {} belongs to group {}, not {}",
                    expense.id, expense.group_id, self.group.id
                ));
            }

            let participants: HashSet<_> = expense.participants.iter().collect();
            for settlement in &expense.settlements {
                if !participants.contains(&settlement.participant) {
                    return Err(format!(
                        "Settlement {} names {} who is not a participant of expense {}",
                        settlement.id, settlement.participant, expense.id
                    ));
                }
            }
        }

        let recomputed = aggregate(self.expenses.iter().flat_map(|e| e.settlements.iter()));
        if recomputed != self.summary {
            return Err("Settlement summary does not match the exported settlements".into());
        }

        Ok(())
    }
}

/// Export a group ledger to JSON
pub fn export_group_json<W: Write>(
    storage: &Storage,
    group_id: GroupId,
    writer: &mut W,
    pretty: bool,
) -> PayupResult<()> {
    let export = GroupExport::from_storage(storage, group_id)?;

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| PayupError::Export(e.to_string()))?;

    Ok(())
}

/// Read a JSON export back, checking its consistency
pub fn read_group_export(json_str: &str) -> PayupResult<GroupExport> {
    let export: GroupExport =
        serde_json::from_str(json_str).map_err(|e| PayupError::Export(e.to_string()))?;

    export.validate().map_err(PayupError::Export)?;

    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::PayupPaths;
    use crate::services::{AddExpenseInput, ExpenseService, SettlementService};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = PayupPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn setup(storage: &Storage) -> (GroupId, MemberId, MemberId) {
        let mut asha = Member::new("Asha", "asha@example.com", "+910000000001");
        asha.password_hash = "$argon2id$stored".into();
        let ravi = Member::new("Ravi", "ravi@example.com", "+910000000002");
        let (a, r) = (asha.id, ravi.id);
        storage.members.upsert(asha).unwrap();
        storage.members.upsert(ravi).unwrap();

        let group = Group::new("Trip", a, &[r]);
        let group_id = group.id;
        storage.groups.upsert(group).unwrap();

        ExpenseService::new(storage)
            .add(AddExpenseInput {
                group_id,
                description: "Taxi".into(),
                amount: Money::from_major(60),
                paid_by: a,
                participants: vec![a, r],
            })
            .unwrap();

        (group_id, a, r)
    }

    #[test]
    fn test_group_export() {
        let (_temp_dir, storage) = create_test_storage();
        let (group_id, asha, ravi) = setup(&storage);

        let export = GroupExport::from_storage(&storage, group_id).unwrap();
        assert_eq!(export.schema_version, EXPORT_SCHEMA_VERSION);
        assert_eq!(export.members.len(), 2);
        assert!(export.members.iter().all(|m| m.password_hash.is_empty()));
        assert_eq!(export.expenses.len(), 1);
        assert_eq!(export.balances[&asha], Money::from_major(30));
        assert_eq!(export.balances[&ravi], Money::from_major(-30));
        assert_eq!(export.summary.pending_count, 1);
        assert!(export.validate().is_ok());
    }

    #[test]
    fn test_export_reads_back() {
        let (_temp_dir, storage) = create_test_storage();
        let (group_id, asha, _ravi) = setup(&storage);

        let settlement = storage.fetch_group_expenses(group_id).unwrap()[0].settlements[0].id;
        SettlementService::new(&storage).mark_settled(settlement, asha).unwrap();

        let mut buffer = Vec::new();
        export_group_json(&storage, group_id, &mut buffer, true).unwrap();
        let json = String::from_utf8(buffer).unwrap();

        let imported = read_group_export(&json).unwrap();
        assert_eq!(imported.group.id, group_id);
        assert_eq!(imported.summary.settled_count, 1);
        assert_eq!(imported.summary.total_settled, Money::from_major(30));
    }

    #[test]
    fn test_tampered_export_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let (group_id, _asha, _ravi) = setup(&storage);

        let mut export = GroupExport::from_storage(&storage, group_id).unwrap();
        export.summary.pending_count = 7;
        let json = serde_json::to_string(&export).unwrap();
        assert!(matches!(read_group_export(&json), Err(PayupError::Export(_))));

        let mut export = GroupExport::from_storage(&storage, group_id).unwrap();
        export.schema_version = "0.1.0".into();
        assert!(export.validate().is_err());
    }
}
