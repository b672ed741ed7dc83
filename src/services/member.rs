//! Member service
//!
//! Registration, login checks and lookup of members.

use tracing::info;

use crate::audit::EntityType;
use crate::crypto::{hash_password, verify_password, SecretString};
use crate::error::{PayupError, PayupResult};
use crate::models::{Member, MemberId};
use crate::storage::Storage;

/// Service for member management
pub struct MemberService<'a> {
    storage: &'a Storage,
}

/// Input for registering a new member
#[derive(Debug, Clone)]
pub struct RegisterMemberInput {
    pub name: String,
    pub email: String,
    pub whatsapp: String,
    pub password: SecretString,
}

impl<'a> MemberService<'a> {
    /// Create a new member service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Register a new member
    ///
    /// Email and WhatsApp number must both be unused.
    pub fn register(&self, input: RegisterMemberInput) -> PayupResult<Member> {
        let name = input.name.trim();
        let email = input.email.trim();
        let whatsapp = input.whatsapp.trim();

        if name.is_empty() || email.is_empty() || whatsapp.is_empty() || input.password.is_blank() {
            return Err(PayupError::Validation(
                "Name, email, WhatsApp number and password are all required".into(),
            ));
        }

        if let Some(taken) = self.storage.members.login_taken(email, whatsapp)? {
            return Err(PayupError::Duplicate {
                entity_type: "Member",
                identifier: taken,
            });
        }

        let mut member = Member::new(name, email, whatsapp);
        member
            .validate()
            .map_err(|e| PayupError::Validation(e.to_string()))?;
        member.password_hash = hash_password(&input.password)?;

        self.storage.members.upsert(member.clone())?;
        self.storage.members.save()?;

        self.storage.log_create(
            EntityType::Member,
            member.id.to_string(),
            Some(member.name.clone()),
            &member.without_credentials(),
        )?;

        info!(member = %member.id, "member registered");
        Ok(member)
    }

    /// Check a login (email or WhatsApp number) and password
    ///
    /// Unknown logins and wrong passwords fail identically.
    pub fn authenticate(&self, login: &str, password: &SecretString) -> PayupResult<Member> {
        let invalid = || PayupError::Credential("Invalid credentials".into());

        let member = self.storage.members.find_by_login(login)?.ok_or_else(invalid)?;

        if member.password_hash.is_empty() || !verify_password(password, &member.password_hash)? {
            return Err(invalid());
        }

        Ok(member)
    }

    /// Get a member by ID
    pub fn get(&self, id: MemberId) -> PayupResult<Option<Member>> {
        self.storage.members.get(id)
    }

    /// Get a member by ID, failing if it does not exist
    pub fn require(&self, id: MemberId) -> PayupResult<Member> {
        self.storage
            .members
            .get(id)?
            .ok_or_else(|| PayupError::member_not_found(id.to_string()))
    }

    /// Find a member by id reference, email or WhatsApp number
    pub fn find(&self, identifier: &str) -> PayupResult<Option<Member>> {
        if let Some(member) = self.storage.members.find_by_reference(identifier)? {
            return Ok(Some(member));
        }
        self.storage.members.find_by_login(identifier)
    }

    /// Search members by name, email or WhatsApp number
    ///
    /// An empty query returns everyone.
    pub fn search(&self, query: &str) -> PayupResult<Vec<Member>> {
        let members = self.storage.members.get_all()?;
        Ok(members.into_iter().filter(|m| m.matches_query(query)).collect())
    }
}
