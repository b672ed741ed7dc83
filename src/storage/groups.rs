//! Group repository for JSON storage
//!
//! Manages loading and saving groups to groups.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::PayupError;
use crate::models::{Group, GroupId, MemberId};

use super::file_io::{read_json, write_json_atomic};
use super::unique_reference;

/// Serializable group data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct GroupData {
    groups: Vec<Group>,
}

/// Repository for group persistence
pub struct GroupRepository {
    path: PathBuf,
    data: RwLock<HashMap<GroupId, Group>>,
}

impl GroupRepository {
    /// Create a new group repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load groups from disk
    pub fn load(&self) -> Result<(), PayupError> {
        let file_data: GroupData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.clear();
        for group in file_data.groups {
            data.insert(group.id, group);
        }

        Ok(())
    }

    /// Save groups to disk
    pub fn save(&self) -> Result<(), PayupError> {
        let data = self.data.read().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut groups: Vec<_> = data.values().cloned().collect();
        groups.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        write_json_atomic(&self.path, &GroupData { groups })
    }

    /// Get a group by ID
    pub fn get(&self, id: GroupId) -> Result<Option<Group>, PayupError> {
        let data = self.data.read().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.get(&id).cloned())
    }

    /// Get all groups, oldest first
    pub fn get_all(&self) -> Result<Vec<Group>, PayupError> {
        let data = self.data.read().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut groups: Vec<_> = data.values().cloned().collect();
        groups.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(groups)
    }

    /// Get the groups a member belongs to, oldest first
    pub fn get_for_member(&self, member_id: MemberId) -> Result<Vec<Group>, PayupError> {
        let data = self.data.read().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut groups: Vec<_> = data
            .values()
            .filter(|g| g.is_member(member_id))
            .cloned()
            .collect();
        groups.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(groups)
    }

    /// Find a group by id reference or case-insensitive name
    ///
    /// Id references win over names. When several groups share a name the
    /// oldest one is returned.
    pub fn find(&self, reference: &str) -> Result<Option<Group>, PayupError> {
        let data = self.data.read().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let matches = data.values().filter(|g| g.id.matches_reference(reference));
        if let Some(group) = unique_reference("group", reference, matches)? {
            return Ok(Some(group.clone()));
        }

        let reference = reference.trim();
        Ok(data
            .values()
            .filter(|g| g.name.eq_ignore_ascii_case(reference))
            .min_by_key(|g| g.created_at)
            .cloned())
    }

    /// Insert or update a group
    pub fn upsert(&self, group: Group) -> Result<(), PayupError> {
        let mut data = self.data.write().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.insert(group.id, group);
        Ok(())
    }

    /// Count groups
    pub fn count(&self) -> Result<usize, PayupError> {
        let data = self.data.read().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.len())
    }
}
