//! Per-group balance cache
//!
//! Balances are a pure function of a group's members and expenses, so a
//! computed sheet stays valid until one of those changes. Every write path
//! that touches a group invalidates its entry.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{PayupError, PayupResult};
use crate::models::GroupId;

use super::balance::BalanceSheet;

/// Cache of computed balance sheets keyed by group
///
/// Each group carries a generation that every invalidation bumps. A sheet
/// computed while the generation moved is returned to its caller but never
/// stored, so the cache cannot keep a sheet older than the last write.
#[derive(Debug, Default)]
pub struct BalanceCache {
    inner: RwLock<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    sheets: HashMap<GroupId, BalanceSheet>,
    generations: HashMap<GroupId, u64>,
    /// Bumped by `clear`, which invalidates every group at once
    epoch: u64,
}

impl CacheState {
    fn generation(&self, group_id: GroupId) -> (u64, u64) {
        (self.epoch, self.generations.get(&group_id).copied().unwrap_or(0))
    }
}

impl BalanceCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached sheet for a group, computing and storing it on a miss
    pub fn get_or_compute<F>(&self, group_id: GroupId, compute: F) -> PayupResult<BalanceSheet>
    where
        F: FnOnce() -> PayupResult<BalanceSheet>,
    {
        let started_at = {
            let state = self.inner.read().map_err(|e| {
                PayupError::Storage(format!("Failed to acquire read lock: {}", e))
            })?;
            if let Some(sheet) = state.sheets.get(&group_id) {
                return Ok(sheet.clone());
            }
            state.generation(group_id)
        };

        let sheet = compute()?;

        let mut state = self.inner.write().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        if state.generation(group_id) == started_at {
            state.sheets.insert(group_id, sheet.clone());
        }

        Ok(sheet)
    }

    /// Cached sheet for a group, if present
    pub fn get(&self, group_id: GroupId) -> PayupResult<Option<BalanceSheet>> {
        let state = self.inner.read().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(state.sheets.get(&group_id).cloned())
    }

    /// Drop the cached sheet for a group
    pub fn invalidate(&self, group_id: GroupId) -> PayupResult<()> {
        let mut state = self.inner.write().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        state.sheets.remove(&group_id);
        *state.generations.entry(group_id).or_insert(0) += 1;
        Ok(())
    }

    /// Drop every cached sheet
    pub fn clear(&self) -> PayupResult<()> {
        let mut state = self.inner.write().map_err(|e| {
            PayupError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        state.sheets.clear();
        state.epoch += 1;
        Ok(())
    }
}
