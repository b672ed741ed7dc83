//! Group service
//!
//! Creating groups, managing membership and assembling the group detail view.

use serde::Serialize;
use tracing::info;

use crate::audit::EntityType;
use crate::engine::{aggregate, SettlementSummary};
use crate::error::{PayupError, PayupResult};
use crate::models::{Expense, Group, GroupId, Member, MemberId, Money};
use crate::storage::{LedgerStore, Storage};

use super::balance::BalanceService;

/// Service for group management
pub struct GroupService<'a> {
    storage: &'a Storage,
    default_payment_id: Option<String>,
}

/// Input for creating a new group
#[derive(Debug, Clone, Default)]
pub struct CreateGroupInput {
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<MemberId>,
    pub payment_id: Option<String>,
}

/// A group member with their rounded balance
#[derive(Debug, Clone, Serialize)]
pub struct MemberWithBalance {
    pub member: Member,
    pub balance: Money,
}

/// Everything shown on a group's detail page
#[derive(Debug, Clone, Serialize)]
pub struct GroupDetails {
    pub group: Group,
    pub members: Vec<MemberWithBalance>,
    /// Newest first, settlements included
    pub expenses: Vec<Expense>,
    pub summary: SettlementSummary,
    /// Rounded net contribution of ids no longer in the group
    pub unattributed: Vec<(MemberId, Money)>,
}

impl<'a> GroupService<'a> {
    /// Create a new group service
    pub fn new(storage: &'a Storage) -> Self {
        Self {
            storage,
            default_payment_id: None,
        }
    }

    /// Payment id given to new groups that don't name one
    pub fn with_default_payment_id(mut self, payment_id: Option<String>) -> Self {
        self.default_payment_id = payment_id.filter(|id| !id.trim().is_empty());
        self
    }

    /// Create a new group
    ///
    /// Every listed member must exist. The creator is always a member.
    pub fn create(&self, creator: MemberId, input: CreateGroupInput) -> PayupResult<Group> {
        let name = input.name.trim();
        if name.is_empty() || input.members.is_empty() {
            return Err(PayupError::Validation(
                "Name and at least one member are required".into(),
            ));
        }

        self.require_member(creator)?;
        for &member_id in &input.members {
            self.require_member(member_id)?;
        }

        let mut group = Group::new(name, creator, &input.members);
        group.description = input
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        group.payment_id = input
            .payment_id
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .or_else(|| self.default_payment_id.clone());

        group
            .validate()
            .map_err(|e| PayupError::Validation(e.to_string()))?;

        self.storage.groups.upsert(group.clone())?;
        self.storage.groups.save()?;

        self.storage.log_create(
            EntityType::Group,
            group.id.to_string(),
            Some(group.name.clone()),
            &group,
        )?;

        info!(group = %group.id, members = group.members.len(), "group created");
        Ok(group)
    }

    /// Add an existing member to a group
    pub fn add_member(&self, group_id: GroupId, member_id: MemberId) -> PayupResult<Group> {
        self.require_member(member_id)?;
        let mut group = self.storage.fetch_group(group_id)?;
        let before = group.clone();

        if !group.add_member(member_id) {
            return Err(PayupError::Duplicate {
                entity_type: "Group member",
                identifier: member_id.to_string(),
            });
        }

        self.storage.groups.upsert(group.clone())?;
        self.storage.balances.invalidate(group_id)?;
        self.storage.groups.save()?;

        self.storage.log_update(
            EntityType::Group,
            group.id.to_string(),
            Some(group.name.clone()),
            &before,
            &group,
        )?;

        info!(group = %group.id, member = %member_id, "member added to group");
        Ok(group)
    }

    /// Get a group by ID
    pub fn get(&self, id: GroupId) -> PayupResult<Option<Group>> {
        self.storage.groups.get(id)
    }

    /// Find a group by id reference or name
    pub fn find(&self, identifier: &str) -> PayupResult<Option<Group>> {
        self.storage.groups.find(identifier)
    }

    /// All groups containing a member
    pub fn groups_for_member(&self, member_id: MemberId) -> PayupResult<Vec<Group>> {
        self.storage.groups.get_for_member(member_id)
    }

    /// Members, balances, expenses and settlement totals of a group
    pub fn details(&self, group_id: GroupId) -> PayupResult<GroupDetails> {
        let group = self.storage.fetch_group(group_id)?;
        let sheet = BalanceService::new(self.storage).group_balances(group_id)?;

        let members = self
            .storage
            .fetch_group_members(group_id)?
            .into_iter()
            .map(|member| MemberWithBalance {
                balance: sheet.balance(member.id).unwrap_or_default(),
                member: member.without_credentials(),
            })
            .collect();

        let expenses = self.storage.fetch_group_expenses(group_id)?;
        let summary = aggregate(expenses.iter().flat_map(|e| e.settlements.iter()));
        let unattributed = sheet
            .unattributed()
            .iter()
            .map(|(&id, amount)| (id, amount.rounded()))
            .collect();

        Ok(GroupDetails {
            group,
            members,
            expenses,
            summary,
            unattributed,
        })
    }

    fn require_member(&self, member_id: MemberId) -> PayupResult<Member> {
        self.storage
            .members
            .get(member_id)?
            .ok_or_else(|| PayupError::member_not_found(member_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::PayupPaths;
    use crate::engine::create_settlements_for_expense;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = PayupPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn add_member(storage: &Storage, name: &str) -> MemberId {
        let member = Member::new(name, format!("{}@example.com", name.to_lowercase()), "+910000000000");
        let id = member.id;
        storage.members.upsert(member).unwrap();
        id
    }

    fn input(name: &str, members: Vec<MemberId>) -> CreateGroupInput {
        CreateGroupInput {
            name: name.to_string(),
            members,
            ..Default::default()
        }
    }

    #[test]
    fn test_create_group_adds_creator_and_default_payment_id() {
        let (_temp_dir, storage) = create_test_storage();
        let asha = add_member(&storage, "Asha");
        let ravi = add_member(&storage, "Ravi");
        let service = GroupService::new(&storage).with_default_payment_id(Some("payup@upi".into()));

        let group = service.create(asha, input("Goa Trip", vec![ravi, ravi])).unwrap();
        assert_eq!(group.members.len(), 2);
        assert!(group.is_member(asha));
        assert_eq!(group.creator, asha);
        assert_eq!(group.payment_id.as_deref(), Some("payup@upi"));

        let mut explicit = input("Flat", vec![ravi]);
        explicit.payment_id = Some("flat@upi".into());
        let group = service.create(asha, explicit).unwrap();
        assert_eq!(group.payment_id.as_deref(), Some("flat@upi"));
    }

    #[test]
    fn test_create_group_validation() {
        let (_temp_dir, storage) = create_test_storage();
        let asha = add_member(&storage, "Asha");
        let service = GroupService::new(&storage);

        assert!(service.create(asha, input("  ", vec![asha])).unwrap_err().is_validation());
        assert!(service.create(asha, input("Trip", vec![])).unwrap_err().is_validation());
        assert!(service
            .create(asha, input("Trip", vec![MemberId::new()]))
            .unwrap_err()
            .is_not_found());
        assert_eq!(storage.groups.count().unwrap(), 0);
    }

    #[test]
    fn test_add_member() {
        let (_temp_dir, storage) = create_test_storage();
        let asha = add_member(&storage, "Asha");
        let ravi = add_member(&storage, "Ravi");
        let service = GroupService::new(&storage);
        let group = service.create(asha, input("Trip", vec![asha])).unwrap();

        let updated = service.add_member(group.id, ravi).unwrap();
        assert!(updated.is_member(ravi));
        assert_eq!(service.groups_for_member(ravi).unwrap().len(), 1);

        let err = service.add_member(group.id, ravi).unwrap_err();
        assert!(matches!(err, PayupError::Duplicate { .. }));

        assert!(service.add_member(group.id, MemberId::new()).unwrap_err().is_not_found());
        assert!(service.add_member(GroupId::new(), ravi).unwrap_err().is_not_found());
    }

    #[test]
    fn test_adding_member_invalidates_balances() {
        let (_temp_dir, storage) = create_test_storage();
        let asha = add_member(&storage, "Asha");
        let ravi = add_member(&storage, "Ravi");
        let service = GroupService::new(&storage);
        let group = service.create(asha, input("Trip", vec![asha])).unwrap();

        BalanceService::new(&storage).group_balances(group.id).unwrap();
        assert!(storage.balances.get(group.id).unwrap().is_some());

        service.add_member(group.id, ravi).unwrap();
        assert!(storage.balances.get(group.id).unwrap().is_none());
    }

    #[test]
    fn test_details() {
        let (_temp_dir, storage) = create_test_storage();
        let asha = add_member(&storage, "Asha");
        let ravi = add_member(&storage, "Ravi");
        let service = GroupService::new(&storage);
        let group = service.create(asha, input("Trip", vec![ravi])).unwrap();

        let expense = Expense::new(group.id, "Dinner", Money::from_major(90), asha, &[asha, ravi]);
        let settlements = create_settlements_for_expense(&expense);
        storage.persist_expense(&expense, &settlements).unwrap();

        let details = service.details(group.id).unwrap();
        assert_eq!(details.expenses.len(), 1);
        assert_eq!(details.summary.pending_count, 1);
        assert_eq!(details.summary.total_pending, Money::from_major(45));
        assert!(details.unattributed.is_empty());

        let ravi_row = details.members.iter().find(|m| m.member.id == ravi).unwrap();
        assert_eq!(ravi_row.balance, Money::from_major(-45));
        assert!(ravi_row.member.password_hash.is_empty());
    }
}
