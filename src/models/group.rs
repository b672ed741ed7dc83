//! Group model
//!
//! A named set of members who share expenses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{GroupId, MemberId};
use super::member::{deserialize_member_id, deserialize_member_ids};

/// A group of members sharing expenses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// Unique identifier
    pub id: GroupId,

    /// Group name
    pub name: String,

    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Payment-collection identifier shown in reminders (e.g. a UPI id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,

    /// Member who created the group
    #[serde(deserialize_with = "deserialize_member_id")]
    pub creator: MemberId,

    /// Members of the group; always contains the creator
    #[serde(deserialize_with = "deserialize_member_ids")]
    pub members: Vec<MemberId>,

    /// When the group was created
    pub created_at: DateTime<Utc>,
}

impl Group {
    /// Create a new group
    ///
    /// The creator is always added to the member list and duplicate member
    /// ids are collapsed, keeping first-seen order.
    pub fn new(name: impl Into<String>, creator: MemberId, members: &[MemberId]) -> Self {
        let mut group = Self {
            id: GroupId::new(),
            name: name.into(),
            description: None,
            payment_id: None,
            creator,
            members: Vec::with_capacity(members.len() + 1),
            created_at: Utc::now(),
        };

        for &member in members {
            group.add_member(member);
        }
        group.add_member(creator);

        group
    }

    /// Check whether a member belongs to the group
    pub fn is_member(&self, member_id: MemberId) -> bool {
        self.members.contains(&member_id)
    }

    /// Add a member; returns false if already present
    pub fn add_member(&mut self, member_id: MemberId) -> bool {
        if self.is_member(member_id) {
            return false;
        }
        self.members.push(member_id);
        true
    }

    /// Validate the group
    pub fn validate(&self) -> Result<(), GroupValidationError> {
        if self.name.trim().is_empty() {
            return Err(GroupValidationError::EmptyName);
        }
        if self.members.is_empty() {
            return Err(GroupValidationError::NoMembers);
        }
        if !self.is_member(self.creator) {
            return Err(GroupValidationError::CreatorNotMember);
        }
        Ok(())
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} members)", self.name, self.members.len())
    }
}

/// Validation errors for groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupValidationError {
    EmptyName,
    NoMembers,
    CreatorNotMember,
}

impl fmt::Display for GroupValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Group name cannot be empty"),
            Self::NoMembers => write!(f, "A group needs at least one member"),
            Self::CreatorNotMember => write!(f, "The group creator must be a member"),
        }
    }
}

impl std::error::Error for GroupValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creator_always_member() {
        let creator = MemberId::new();
        let other = MemberId::new();

        let group = Group::new("Flat 4B", creator, &[other]);
        assert!(group.is_member(creator));
        assert!(group.is_member(other));
        assert_eq!(group.members.len(), 2);
        assert!(group.validate().is_ok());
    }

    #[test]
    fn test_duplicate_members_collapse() {
        let creator = MemberId::new();
        let other = MemberId::new();

        let group = Group::new("Trip", creator, &[other, creator, other]);
        assert_eq!(group.members, vec![other, creator]);
    }

    #[test]
    fn test_add_member() {
        let creator = MemberId::new();
        let mut group = Group::new("Trip", creator, &[]);

        let newcomer = MemberId::new();
        assert!(group.add_member(newcomer));
        assert!(!group.add_member(newcomer));
        assert_eq!(group.members.len(), 2);
    }

    #[test]
    fn test_validation() {
        let creator = MemberId::new();
        let mut group = Group::new("  ", creator, &[]);
        assert_eq!(group.validate(), Err(GroupValidationError::EmptyName));

        group.name = "Trip".into();
        group.members.clear();
        assert_eq!(group.validate(), Err(GroupValidationError::NoMembers));

        group.members.push(MemberId::new());
        assert_eq!(group.validate(), Err(GroupValidationError::CreatorNotMember));
    }

    #[test]
    fn test_deserialize_populated_members() {
        let creator = MemberId::new();
        let other = MemberId::new();
        let json = format!(
            r#"{{
                "id": "{}",
                "name": "Trip",
                "creator": {{"_id": "{}", "name": "Asha"}},
                "members": ["{}", {{"_id": "{}", "name": "Ravi"}}],
                "created_at": "2025-01-15T10:00:00Z"
            }}"#,
            GroupId::new().as_uuid(),
            creator.as_uuid(),
            creator.as_uuid(),
            other.as_uuid()
        );

        let group: Group = serde_json::from_str(&json).unwrap();
        assert_eq!(group.creator, creator);
        assert_eq!(group.members, vec![creator, other]);
    }
}
