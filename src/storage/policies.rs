//! Household policy repository
//!
//! Stores at most one apportionment policy per household in policies.json.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::SettleError;
use crate::models::{HouseholdId, HouseholdPolicy};

use super::file_io::{read_json, write_json_atomic};
use super::lock_error;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct PolicyData {
    #[serde(default)]
    policies: Vec<HouseholdPolicy>,
}

/// Repository for household policies
pub struct PolicyRepository {
    path: PathBuf,
    policies: RwLock<HashMap<HouseholdId, HouseholdPolicy>>,
}

impl PolicyRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            policies: RwLock::new(HashMap::new()),
        }
    }

    /// Load policies from disk
    pub fn load(&self) -> Result<(), SettleError> {
        let file_data: PolicyData = read_json(&self.path)?;
        let mut policies = self.policies.write().map_err(lock_error)?;

        policies.clear();
        for policy in file_data.policies {
            policies.insert(policy.household_id, policy);
        }
        Ok(())
    }

    /// Save policies to disk
    pub fn save(&self) -> Result<(), SettleError> {
        let policies = self.policies.read().map_err(lock_error)?;
        let mut list: Vec<_> = policies.values().copied().collect();
        list.sort_by_key(|p| p.household_id);
        write_json_atomic(&self.path, &PolicyData { policies: list })
    }

    /// The stored policy for a household, if any
    pub fn get(&self, household_id: HouseholdId) -> Result<Option<HouseholdPolicy>, SettleError> {
        let policies = self.policies.read().map_err(lock_error)?;
        Ok(policies.get(&household_id).copied())
    }

    /// Insert or replace a household's policy
    pub fn upsert(&self, policy: HouseholdPolicy) -> Result<(), SettleError> {
        let mut policies = self.policies.write().map_err(lock_error)?;
        policies.insert(policy.household_id, policy);
        Ok(())
    }
}
