//! Expense repository for JSON storage
//!
//! Manages loading and saving expenses (with their embedded settlements) to
//! expenses.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, RwLock};

use crate::error::PayupError;
use crate::models::{Expense, ExpenseId, GroupId, Settlement, SettlementId};

use super::file_io::{read_json, write_json_atomic};
use super::unique_reference;

/// Serializable expense data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ExpenseData {
    expenses: Vec<Expense>,
}

/// Repository for expense persistence with indexing
pub struct ExpenseRepository {
    path: PathBuf,
    data: RwLock<HashMap<ExpenseId, Expense>>,
    /// Index: group_id -> expense_ids
    by_group: RwLock<HashMap<GroupId, Vec<ExpenseId>>>,
    /// Serializes writers of expenses.json
    save_lock: Mutex<()>,
}

fn newest_first(a: &Expense, b: &Expense) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
}

impl ExpenseRepository {
    /// Create a new expense repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_group: RwLock::new(HashMap::new()),
            save_lock: Mutex::new(()),
        }
    }

    /// Load expenses from disk and build indexes
    pub fn load(&self) -> Result<(), PayupError> {
        let file_data: ExpenseData = read_json(&self.path)?;

        if let Some(broken) = file_data.expenses.iter().find(|e| e.participants.is_empty()) {
            return Err(PayupError::Storage(format!(
                "{} holds expense {} with no participants",
                self.path.display(),
                broken.id
            )));
        }

        let mut data = self.data.write().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        let mut by_group = self.by_group.write().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.clear();
        by_group.clear();

        for expense in file_data.expenses {
            by_group.entry(expense.group_id).or_default().push(expense.id);
            data.insert(expense.id, expense);
        }

        Ok(())
    }

    /// Save expenses to disk
    pub fn save(&self) -> Result<(), PayupError> {
        let _guard = self
            .save_lock
            .lock()
            .map_err(|e| PayupError::Storage(format!("Failed to acquire save lock: {}", e)))?;

        let expenses = {
            let data = self.data.read().map_err(|e| {
                PayupError::Storage(format!("Failed to acquire read lock: {}", e))
            })?;

            let mut expenses: Vec<_> = data.values().cloned().collect();
            expenses.sort_by(newest_first);
            expenses
        };

        write_json_atomic(&self.path, &ExpenseData { expenses })
    }

    /// Get an expense by ID
    pub fn get(&self, id: ExpenseId) -> Result<Option<Expense>, PayupError> {
        let data = self.data.read().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.get(&id).cloned())
    }

    /// Get all expenses for a group, newest first
    pub fn get_by_group(&self, group_id: GroupId) -> Result<Vec<Expense>, PayupError> {
        let data = self.data.read().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        let by_group = self.by_group.read().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let ids = by_group.get(&group_id).map(|v| v.as_slice()).unwrap_or(&[]);
        let mut expenses: Vec<_> = ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        expenses.sort_by(newest_first);
        Ok(expenses)
    }

    /// Find an expense by a full or shortened id
    pub fn find_by_reference(&self, reference: &str) -> Result<Option<Expense>, PayupError> {
        let data = self.data.read().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let matches = data.values().filter(|e| e.id.matches_reference(reference));
        Ok(unique_reference("expense", reference, matches)?.cloned())
    }

    /// Locate a settlement and the expense that owns it
    pub fn find_settlement(
        &self,
        settlement_id: SettlementId,
    ) -> Result<Option<(ExpenseId, Settlement)>, PayupError> {
        let data = self.data.read().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.values().find_map(|expense| {
            expense
                .settlement(settlement_id)
                .map(|s| (expense.id, s.clone()))
        }))
    }

    /// Locate a settlement by a full or shortened id
    pub fn find_settlement_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<(ExpenseId, Settlement)>, PayupError> {
        let data = self.data.read().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let matches = data.values().flat_map(|expense| {
            expense
                .settlements
                .iter()
                .filter(|s| s.id.matches_reference(reference))
                .map(move |s| (expense.id, s))
        });
        Ok(unique_reference("settlement", reference, matches)?
            .map(|(expense_id, s)| (expense_id, s.clone())))
    }

    /// Insert or update an expense
    pub fn upsert(&self, expense: Expense) -> Result<(), PayupError> {
        let mut data = self.data.write().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        let mut by_group = self.by_group.write().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        if let Some(old) = data.get(&expense.id) {
            if old.group_id != expense.group_id {
                if let Some(ids) = by_group.get_mut(&old.group_id) {
                    ids.retain(|&id| id != expense.id);
                }
            }
        }

        let ids = by_group.entry(expense.group_id).or_default();
        if !ids.contains(&expense.id) {
            ids.push(expense.id);
        }

        data.insert(expense.id, expense);
        Ok(())
    }

    /// Replace one settlement record inside its expense
    ///
    /// Only the matching record is touched, so concurrent updates to
    /// different settlements of the same expense never overwrite each other.
    /// Returns the owning expense's group.
    pub fn replace_settlement(
        &self,
        expense_id: ExpenseId,
        settlement: &Settlement,
    ) -> Result<GroupId, PayupError> {
        let mut data = self.data.write().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let expense = data
            .get_mut(&expense_id)
            .ok_or_else(|| PayupError::expense_not_found(expense_id.to_string()))?;

        let slot = expense
            .settlement_mut(settlement.id)
            .ok_or_else(|| PayupError::settlement_not_found(settlement.id.to_string()))?;
        *slot = settlement.clone();

        Ok(expense.group_id)
    }

    /// Count expenses
    pub fn count(&self) -> Result<usize, PayupError> {
        let data = self.data.read().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MemberId, Money};
    use chrono::{Duration, Utc};
    use tempfile::TempDir;
    use uuid::Uuid;

    fn create_test_repo() -> (TempDir, ExpenseRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = ExpenseRepository::new(temp_dir.path().join("expenses.json"));
        repo.load().unwrap();
        (temp_dir, repo)
    }

    fn expense_with_settlements(group_id: GroupId, payer: MemberId, others: &[MemberId]) -> Expense {
        let mut participants = vec![payer];
        participants.extend_from_slice(others);
        let mut expense = Expense::new(group_id, "Dinner", Money::from_major(300), payer, &participants);
        expense.settlements = others
            .iter()
            .map(|&m| Settlement::new(m, Money::from_major(100)))
            .collect();
        expense
    }

    #[test]
    fn test_get_by_group_newest_first() {
        let (_temp_dir, repo) = create_test_repo();
        let group_id = GroupId::new();
        let payer = MemberId::new();

        let mut older = Expense::new(group_id, "Taxi", Money::from_major(90), payer, &[payer]);
        older.created_at = Utc::now() - Duration::hours(2);
        let newer = Expense::new(group_id, "Lunch", Money::from_major(60), payer, &[payer]);
        let elsewhere = Expense::new(GroupId::new(), "Rent", Money::from_major(10), payer, &[payer]);

        repo.upsert(older).unwrap();
        repo.upsert(newer).unwrap();
        repo.upsert(elsewhere).unwrap();

        let descriptions: Vec<_> = repo
            .get_by_group(group_id)
            .unwrap()
            .into_iter()
            .map(|e| e.description)
            .collect();
        assert_eq!(descriptions, vec!["Lunch", "Taxi"]);
        assert!(repo.get_by_group(GroupId::new()).unwrap().is_empty());
    }

    #[test]
    fn test_find_and_replace_settlement() {
        let (_temp_dir, repo) = create_test_repo();
        let group_id = GroupId::new();
        let payer = MemberId::new();
        let expense = expense_with_settlements(group_id, payer, &[MemberId::new(), MemberId::new()]);
        let expense_id = expense.id;
        let target = expense.settlements[0].clone();
        repo.upsert(expense).unwrap();

        let (found_expense, mut settlement) = repo.find_settlement(target.id).unwrap().unwrap();
        assert_eq!(found_expense, expense_id);

        settlement.mark_settled(payer, Utc::now());
        assert_eq!(repo.replace_settlement(expense_id, &settlement).unwrap(), group_id);

        let stored = repo.get(expense_id).unwrap().unwrap();
        assert!(stored.settlement(target.id).unwrap().is_settled());
        assert!(!stored.settlements[1].is_settled());
    }

    #[test]
    fn test_replace_unknown_settlement() {
        let (_temp_dir, repo) = create_test_repo();
        let payer = MemberId::new();
        let expense = expense_with_settlements(GroupId::new(), payer, &[MemberId::new()]);
        let expense_id = expense.id;
        repo.upsert(expense).unwrap();

        let stray = Settlement::new(MemberId::new(), Money::from_major(1));
        let err = repo.replace_settlement(expense_id, &stray).unwrap_err();
        assert!(err.is_not_found());

        let err = repo.replace_settlement(ExpenseId::new(), &stray).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let group_id = GroupId::new();
        let expense = expense_with_settlements(group_id, MemberId::new(), &[MemberId::new()]);
        let settlement_id = expense.settlements[0].id;
        repo.upsert(expense).unwrap();
        repo.save().unwrap();

        let reloaded = ExpenseRepository::new(temp_dir.path().join("expenses.json"));
        reloaded.load().unwrap();

        assert_eq!(reloaded.count().unwrap(), 1);
        assert_eq!(reloaded.get_by_group(group_id).unwrap().len(), 1);
        assert!(reloaded
            .find_settlement_by_reference(&settlement_id.to_string())
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_ambiguous_settlement_reference_is_rejected() {
        let (_temp_dir, repo) = create_test_repo();
        let payer = MemberId::new();
        let mut expense = expense_with_settlements(GroupId::new(), payer, &[MemberId::new(), MemberId::new()]);
        expense.settlements[0].id =
            SettlementId::from_uuid(Uuid::parse_str("0badcafe-0000-4000-8000-000000000001").unwrap());
        expense.settlements[1].id =
            SettlementId::from_uuid(Uuid::parse_str("0badcafe-0000-4000-8000-000000000002").unwrap());
        let second = expense.settlements[1].id;
        repo.upsert(expense).unwrap();

        let err = repo.find_settlement_by_reference("stl-0badcafe").unwrap_err();
        assert!(err.is_validation());

        let (_, found) = repo
            .find_settlement_by_reference(&second.as_uuid().to_string())
            .unwrap()
            .unwrap();
        assert_eq!(found.id, second);
    }

    #[test]
    fn test_load_rejects_expense_without_participants() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("expenses.json");
        let broken = Expense::new(GroupId::new(), "Ghost", Money::from_major(10), MemberId::new(), &[]);
        write_json_atomic(&path, &ExpenseData { expenses: vec![broken] }).unwrap();

        let repo = ExpenseRepository::new(path);
        let err = repo.load().unwrap_err();
        assert!(matches!(err, PayupError::Storage(ref msg) if msg.contains("no participants")));
        assert_eq!(repo.count().unwrap(), 0);
    }
}
