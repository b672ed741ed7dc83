//! Member model
//!
//! A registered person who can belong to groups, pay for expenses and owe
//! shares of them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::ids::MemberId;

/// A registered member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// Unique identifier
    pub id: MemberId,

    /// Display name
    pub name: String,

    /// Email address (unique, used for login)
    pub email: String,

    /// WhatsApp number used for reminders (unique, used for login)
    #[serde(default)]
    pub whatsapp: String,

    /// Argon2 PHC string; never the plain password
    #[serde(default)]
    pub password_hash: String,

    /// When the member registered
    pub created_at: DateTime<Utc>,
}

impl Member {
    /// Create a new member without credentials
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        whatsapp: impl Into<String>,
    ) -> Self {
        Self {
            id: MemberId::new(),
            name: name.into(),
            email: email.into(),
            whatsapp: whatsapp.into(),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    /// The handle reminders are delivered to, if the member has one
    pub fn contact(&self) -> Option<&str> {
        let handle = self.whatsapp.trim();
        if handle.is_empty() {
            None
        } else {
            Some(handle)
        }
    }

    /// Check whether a login string names this member (email or WhatsApp)
    pub fn has_login(&self, login: &str) -> bool {
        let login = login.trim();
        self.email.eq_ignore_ascii_case(login) || (!login.is_empty() && self.whatsapp == login)
    }

    /// Copy of the member with the password hash blanked, for logs and exports
    pub fn without_credentials(&self) -> Self {
        Self {
            password_hash: String::new(),
            ..self.clone()
        }
    }

    /// Case-insensitive match on name, email or WhatsApp
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.name.to_lowercase().contains(&query)
            || self.email.to_lowercase().contains(&query)
            || self.whatsapp.contains(&query)
    }

    /// Validate the member
    pub fn validate(&self) -> Result<(), MemberValidationError> {
        if self.name.trim().is_empty() {
            return Err(MemberValidationError::EmptyName);
        }
        if !self.email.contains('@') {
            return Err(MemberValidationError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Validation errors for members
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberValidationError {
    EmptyName,
    InvalidEmail(String),
}

impl fmt::Display for MemberValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Member name cannot be empty"),
            Self::InvalidEmail(email) => write!(f, "Invalid email address: '{}'", email),
        }
    }
}

impl std::error::Error for MemberValidationError {}

/// A member reference as it appears in stored or imported documents
///
/// Depending on how a record was produced, a payer or participant field holds
/// either a bare member id or an expanded member object. Both shapes collapse
/// to a plain [`MemberId`] through [`MemberRef::id`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MemberRef {
    Id(MemberId),
    Populated(PopulatedMember),
}

/// The expanded form of a member reference
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PopulatedMember {
    #[serde(alias = "_id")]
    pub id: MemberId,
    #[serde(default)]
    pub name: Option<String>,
}

impl MemberRef {
    /// The referenced member's id
    pub fn id(&self) -> MemberId {
        match self {
            Self::Id(id) => *id,
            Self::Populated(member) => member.id,
        }
    }
}

impl From<MemberId> for MemberRef {
    fn from(id: MemberId) -> Self {
        Self::Id(id)
    }
}

/// Deserialize a `MemberId` field that may hold either reference shape
pub fn deserialize_member_id<'de, D>(deserializer: D) -> Result<MemberId, D::Error>
where
    D: Deserializer<'de>,
{
    MemberRef::deserialize(deserializer).map(|r| r.id())
}

/// Deserialize an optional `MemberId` field that may hold either reference shape
pub fn deserialize_opt_member_id<'de, D>(deserializer: D) -> Result<Option<MemberId>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<MemberRef>::deserialize(deserializer).map(|r| r.map(|r| r.id()))
}

/// Deserialize a list of `MemberId`s whose entries may hold either reference shape
pub fn deserialize_member_ids<'de, D>(deserializer: D) -> Result<Vec<MemberId>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<MemberRef>::deserialize(deserializer).map(|refs| refs.iter().map(MemberRef::id).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact() {
        let mut member = Member::new("Asha", "asha@example.com", "+919800000001");
        assert_eq!(member.contact(), Some("+919800000001"));

        member.whatsapp = "  ".into();
        assert_eq!(member.contact(), None);
    }

    #[test]
    fn test_has_login() {
        let member = Member::new("Asha", "Asha@Example.com", "+919800000001");
        assert!(member.has_login("asha@example.com"));
        assert!(member.has_login("+919800000001"));
        assert!(!member.has_login("ravi@example.com"));
        assert!(!member.has_login(""));
    }

    #[test]
    fn test_matches_query() {
        let member = Member::new("Asha Rao", "asha@example.com", "+919800000001");
        assert!(member.matches_query("rao"));
        assert!(member.matches_query("EXAMPLE"));
        assert!(member.matches_query("9800"));
        assert!(member.matches_query(""));
        assert!(!member.matches_query("ravi"));
    }

    #[test]
    fn test_validate() {
        assert!(Member::new("Asha", "asha@example.com", "").validate().is_ok());
        assert_eq!(
            Member::new(" ", "asha@example.com", "").validate(),
            Err(MemberValidationError::EmptyName)
        );
        assert!(matches!(
            Member::new("Asha", "nope", "").validate(),
            Err(MemberValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_member_ref_both_shapes_normalize() {
        let id = MemberId::new();

        let bare: MemberRef = serde_json::from_str(&format!("\"{}\"", id.as_uuid())).unwrap();
        let populated: MemberRef =
            serde_json::from_str(&format!(r#"{{"_id": "{}", "name": "Asha"}}"#, id.as_uuid()))
                .unwrap();
        let populated_plain: MemberRef =
            serde_json::from_str(&format!(r#"{{"id": "{}"}}"#, id.as_uuid())).unwrap();

        assert_eq!(bare.id(), id);
        assert_eq!(populated.id(), id);
        assert_eq!(populated_plain.id(), id);
    }
}
