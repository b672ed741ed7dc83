//! Expense service
//!
//! Validates new expenses, generates their settlements and persists both in
//! a single write.

use tracing::info;

use crate::audit::EntityType;
use crate::engine::create_settlements_for_expense;
use crate::error::{PayupError, PayupResult};
use crate::models::{Expense, ExpenseId, GroupId, MemberId, Money};
use crate::storage::{LedgerStore, Storage};

/// Service for expense management
pub struct ExpenseService<'a> {
    storage: &'a Storage,
}

/// Input for recording a new expense
#[derive(Debug, Clone)]
pub struct AddExpenseInput {
    pub group_id: GroupId,
    pub description: String,
    pub amount: Money,
    pub paid_by: MemberId,
    pub participants: Vec<MemberId>,
}

impl<'a> ExpenseService<'a> {
    /// Create a new expense service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record an expense and the settlements it creates
    ///
    /// Nothing is persisted unless every check passes.
    pub fn add(&self, input: AddExpenseInput) -> PayupResult<Expense> {
        let group = self.storage.fetch_group(input.group_id)?;

        let description = input.description.trim();
        if description.is_empty() || input.participants.is_empty() {
            return Err(PayupError::Validation(
                "Description, amount, payer and participants are all required".into(),
            ));
        }

        if !input.amount.is_positive() {
            return Err(PayupError::Validation(format!(
                "Amount must be positive, got {}",
                input.amount.format_plain()
            )));
        }

        if !group.is_member(input.paid_by) {
            return Err(PayupError::Validation("Payer must be a group member".into()));
        }

        if let Some(outsider) = input.participants.iter().find(|&&p| !group.is_member(p)) {
            return Err(PayupError::Validation(format!(
                "All participants must be group members ({} is not)",
                outsider
            )));
        }

        let mut expense = Expense::new(
            group.id,
            description,
            input.amount,
            input.paid_by,
            &input.participants,
        );
        expense
            .validate()
            .map_err(|e| PayupError::Validation(e.to_string()))?;

        let settlements = create_settlements_for_expense(&expense);
        self.storage.persist_expense(&expense, &settlements)?;
        expense.settlements = settlements;

        self.storage.log_create(
            EntityType::Expense,
            expense.id.to_string(),
            Some(expense.description.clone()),
            &expense,
        )?;

        info!(
            expense = %expense.id,
            group = %group.id,
            amount = %expense.amount.format_plain(),
            settlements = expense.settlements.len(),
            "expense recorded"
        );

        Ok(expense)
    }

    /// List a group's expenses, newest first
    pub fn list(&self, group_id: GroupId) -> PayupResult<Vec<Expense>> {
        self.storage.fetch_group(group_id)?;
        self.storage.fetch_group_expenses(group_id)
    }

    /// Get an expense by ID
    pub fn get(&self, id: ExpenseId) -> PayupResult<Option<Expense>> {
        self.storage.expenses.get(id)
    }

    /// Find an expense by a full or shortened id
    pub fn find(&self, identifier: &str) -> PayupResult<Option<Expense>> {
        self.storage.expenses.find_by_reference(identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::PayupPaths;
    use crate::models::Group;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = PayupPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn setup_group(storage: &Storage) -> (GroupId, MemberId, MemberId, MemberId) {
        let (a, b, c) = (MemberId::new(), MemberId::new(), MemberId::new());
        let group = Group::new("Trip", a, &[b, c]);
        let group_id = group.id;
        storage.groups.upsert(group).unwrap();
        (group_id, a, b, c)
    }

    fn input(group_id: GroupId, amount: Money, paid_by: MemberId, participants: Vec<MemberId>) -> AddExpenseInput {
        AddExpenseInput {
            group_id,
            description: "Dinner".to_string(),
            amount,
            paid_by,
            participants,
        }
    }

    #[test]
    fn test_add_expense_creates_settlements() {
        let (_temp_dir, storage) = create_test_storage();
        let (group_id, a, b, c) = setup_group(&storage);
        let service = ExpenseService::new(&storage);

        let expense = service
            .add(input(group_id, Money::from_major(300), a, vec![a, b, c]))
            .unwrap();

        assert_eq!(expense.settlements.len(), 2);
        assert!(expense.settlements.iter().all(|s| s.amount == Money::from_major(100)));
        assert!(expense.settlements.iter().all(|s| !s.is_settled()));
        assert!(expense.settlements.iter().all(|s| s.participant != a));

        let stored = service.get(expense.id).unwrap().unwrap();
        assert_eq!(stored.settlements, expense.settlements);
    }

    #[test]
    fn test_payer_outside_participants() {
        let (_temp_dir, storage) = create_test_storage();
        let (group_id, a, b, c) = setup_group(&storage);
        let service = ExpenseService::new(&storage);

        let expense = service
            .add(input(group_id, Money::from_major(90), a, vec![b, c]))
            .unwrap();
        assert_eq!(expense.settlements.len(), 2);
        assert!(expense.settlements.iter().all(|s| s.amount == Money::from_major(45)));
    }

    #[test]
    fn test_uneven_split_keeps_exact_share() {
        let (_temp_dir, storage) = create_test_storage();
        let (group_id, a, b, c) = setup_group(&storage);
        let service = ExpenseService::new(&storage);

        let expense = service
            .add(input(group_id, Money::from_major(100), a, vec![a, b, c]))
            .unwrap();
        let share = expense.settlements[0].amount;
        assert_eq!(share.rounded(), Money::from_decimal(dec!(33.33)));
        assert_ne!(share, share.rounded());
    }

    #[test]
    fn test_payer_only_expense_has_no_settlements() {
        let (_temp_dir, storage) = create_test_storage();
        let (group_id, a, _b, _c) = setup_group(&storage);
        let service = ExpenseService::new(&storage);

        let expense = service
            .add(input(group_id, Money::from_major(50), a, vec![a, a]))
            .unwrap();
        assert_eq!(expense.participants, vec![a]);
        assert!(expense.settlements.is_empty());
    }

    #[test]
    fn test_validation_rejects_before_persisting() {
        let (_temp_dir, storage) = create_test_storage();
        let (group_id, a, b, _c) = setup_group(&storage);
        let outsider = MemberId::new();
        let service = ExpenseService::new(&storage);

        let cases = vec![
            input(group_id, Money::from_major(10), a, vec![]),
            input(group_id, Money::zero(), a, vec![a, b]),
            input(group_id, Money::from_major(-5), a, vec![a, b]),
            input(group_id, Money::from_major(10), outsider, vec![a, b]),
            input(group_id, Money::from_major(10), a, vec![a, outsider]),
            AddExpenseInput {
                description: "   ".to_string(),
                ..input(group_id, Money::from_major(10), a, vec![a])
            },
        ];

        for case in cases {
            assert!(service.add(case).unwrap_err().is_validation());
        }

        let missing_group = input(GroupId::new(), Money::from_major(10), a, vec![a]);
        assert!(service.add(missing_group).unwrap_err().is_not_found());

        assert_eq!(storage.expenses.count().unwrap(), 0);
        assert!(storage.audit().read_all().unwrap().is_empty());
    }

    #[test]
    fn test_list_newest_first() {
        let (_temp_dir, storage) = create_test_storage();
        let (group_id, a, b, _c) = setup_group(&storage);
        let service = ExpenseService::new(&storage);

        let first = service.add(input(group_id, Money::from_major(10), a, vec![a, b])).unwrap();
        let second = service.add(input(group_id, Money::from_major(20), b, vec![a, b])).unwrap();

        let listed = service.list(group_id).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
        assert!(service.find(&first.id.to_string()).unwrap().is_some());
        assert!(service.list(GroupId::new()).unwrap_err().is_not_found());
    }
}
