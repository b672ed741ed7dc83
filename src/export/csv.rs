//! CSV Export functionality
//!
//! Writes a group's ledger as one row per settlement. Expenses without
//! settlements (paid and consumed by the payer alone) get a single row with
//! the participant columns left empty.

use std::collections::HashMap;
use std::io::Write;

use serde::Serialize;

use crate::error::{PayupError, PayupResult};
use crate::models::{GroupId, MemberId};
use crate::storage::{LedgerStore, Storage};

#[derive(Debug, Serialize)]
struct SettlementRow<'a> {
    expense_id: String,
    date: String,
    description: &'a str,
    amount: String,
    paid_by: String,
    participant: String,
    share: String,
    status: String,
    settled_by: String,
    settled_at: String,
}

/// Export a group's expenses and settlements to CSV
pub fn export_group_csv<W: Write>(
    storage: &Storage,
    group_id: GroupId,
    writer: W,
) -> PayupResult<()> {
    storage.fetch_group(group_id)?;

    let names: HashMap<MemberId, String> = storage
        .members
        .get_all()?
        .into_iter()
        .map(|m| (m.id, m.name))
        .collect();
    let name_of = |id: MemberId| names.get(&id).cloned().unwrap_or_else(|| id.to_string());

    let mut csv_writer = ::csv::Writer::from_writer(writer);
    let expenses = storage.fetch_group_expenses(group_id)?;

    for expense in &expenses {
        let expense_id = expense.id.to_string();
        let date = expense.created_at.format("%Y-%m-%d").to_string();
        let amount = expense.amount.format_plain();
        let paid_by = name_of(expense.paid_by);
        let description = expense.description.as_str();

        let base = |participant: String, share: String, status: String, by: String, at: String| {
            SettlementRow {
                expense_id: expense_id.clone(),
                date: date.clone(),
                description,
                amount: amount.clone(),
                paid_by: paid_by.clone(),
                participant,
                share,
                status,
                settled_by: by,
                settled_at: at,
            }
        };

        if expense.settlements.is_empty() {
            let row = base(String::new(), String::new(), String::new(), String::new(), String::new());
            csv_writer
                .serialize(row)
                .map_err(|e| PayupError::Export(e.to_string()))?;
            continue;
        }

        for settlement in &expense.settlements {
            let row = base(
                name_of(settlement.participant),
                settlement.amount.format_plain(),
                settlement.status().to_string(),
                settlement.settled_by.map(name_of).unwrap_or_default(),
                settlement
                    .settled_at
                    .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_default(),
            );
            csv_writer
                .serialize(row)
                .map_err(|e| PayupError::Export(e.to_string()))?;
        }
    }

    csv_writer
        .flush()
        .map_err(|e| PayupError::Export(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::PayupPaths;
    use crate::models::{Group, Member, Money};
    use crate::services::{AddExpenseInput, ExpenseService, SettlementService};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = PayupPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_export_rows() {
        let (_temp_dir, storage) = create_test_storage();
        let asha = Member::new("Asha", "asha@example.com", "");
        let ravi = Member::new("Ravi, Jr.", "ravi@example.com", "");
        let (a, r) = (asha.id, ravi.id);
        storage.members.upsert(asha).unwrap();
        storage.members.upsert(ravi).unwrap();
        let group = Group::new("Trip", a, &[r]);
        let group_id = group.id;
        storage.groups.upsert(group).unwrap();

        let service = ExpenseService::new(&storage);
        let shared = service
            .add(AddExpenseInput {
                group_id,
                description: "Taxi".into(),
                amount: Money::from_major(100),
                paid_by: a,
                participants: vec![a, r],
            })
            .unwrap();
        service
            .add(AddExpenseInput {
                group_id,
                description: "Snacks".into(),
                amount: Money::from_major(15),
                paid_by: a,
                participants: vec![a],
            })
            .unwrap();
        SettlementService::new(&storage)
            .mark_settled(shared.settlements[0].id, a)
            .unwrap();

        let mut buffer = Vec::new();
        export_group_csv(&storage, group_id, &mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<_> = output.lines().collect();

        assert_eq!(
            lines[0],
            "expense_id,date,description,amount,paid_by,participant,share,status,settled_by,settled_at"
        );
        assert_eq!(lines.len(), 3);

        // Newest first: the payer-only expense has empty participant columns
        assert!(lines[1].contains(",Snacks,15.00,Asha,,,,,"));
        assert!(lines[2].contains(",Taxi,100.00,Asha,\"Ravi, Jr.\",50.00,Settled,Asha,"));
    }

    #[test]
    fn test_unknown_group() {
        let (_temp_dir, storage) = create_test_storage();
        let err = export_group_csv(&storage, GroupId::new(), Vec::new()).unwrap_err();
        assert!(err.is_not_found());
    }
}
