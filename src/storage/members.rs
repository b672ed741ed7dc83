//! Member repository for JSON storage
//!
//! Manages loading and saving members to members.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::PayupError;
use crate::models::{Member, MemberId};

use super::file_io::{read_json, write_json_atomic};
use super::unique_reference;

/// Serializable member data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct MemberData {
    members: Vec<Member>,
}

/// Repository for member persistence
pub struct MemberRepository {
    path: PathBuf,
    data: RwLock<HashMap<MemberId, Member>>,
}

impl MemberRepository {
    /// Create a new member repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load members from disk
    pub fn load(&self) -> Result<(), PayupError> {
        let file_data: MemberData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.clear();
        for member in file_data.members {
            data.insert(member.id, member);
        }

        Ok(())
    }

    /// Save members to disk
    pub fn save(&self) -> Result<(), PayupError> {
        let data = self.data.read().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut members: Vec<_> = data.values().cloned().collect();
        members.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        write_json_atomic(&self.path, &MemberData { members })
    }

    /// Get a member by ID
    pub fn get(&self, id: MemberId) -> Result<Option<Member>, PayupError> {
        let data = self.data.read().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.get(&id).cloned())
    }

    /// Get all members sorted by name
    pub fn get_all(&self) -> Result<Vec<Member>, PayupError> {
        let data = self.data.read().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut members: Vec<_> = data.values().cloned().collect();
        members.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(members)
    }

    /// Find a member by email or WhatsApp number
    pub fn find_by_login(&self, login: &str) -> Result<Option<Member>, PayupError> {
        let data = self.data.read().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.values().find(|m| m.has_login(login)).cloned())
    }

    /// Find a member by a full or shortened id
    pub fn find_by_reference(&self, reference: &str) -> Result<Option<Member>, PayupError> {
        let data = self.data.read().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let matches = data.values().filter(|m| m.id.matches_reference(reference));
        Ok(unique_reference("member", reference, matches)?.cloned())
    }

    /// Check whether an email or WhatsApp number is already registered
    pub fn login_taken(&self, email: &str, whatsapp: &str) -> Result<Option<String>, PayupError> {
        let data = self.data.read().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        for member in data.values() {
            if member.has_login(email) {
                return Ok(Some(email.to_string()));
            }
            if member.has_login(whatsapp) {
                return Ok(Some(whatsapp.to_string()));
            }
        }

        Ok(None)
    }

    /// Insert or update a member
    pub fn upsert(&self, member: Member) -> Result<(), PayupError> {
        let mut data = self.data.write().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.insert(member.id, member);
        Ok(())
    }

    /// Count members
    pub fn count(&self) -> Result<usize, PayupError> {
        let data = self.data.read().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.len())
    }
}
