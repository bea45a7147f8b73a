//! Household member repository
//!
//! Membership rows in members.json, keyed by (household, user).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::SettleError;
use crate::models::{HouseholdId, HouseholdMember, UserId};

use super::file_io::{read_json, write_json_atomic};
use super::lock_error;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct MemberData {
    #[serde(default)]
    members: Vec<HouseholdMember>,
}

/// Repository for household memberships
pub struct MemberRepository {
    path: PathBuf,
    members: RwLock<HashMap<(HouseholdId, UserId), HouseholdMember>>,
}

impl MemberRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            members: RwLock::new(HashMap::new()),
        }
    }

    /// Load memberships from disk
    pub fn load(&self) -> Result<(), SettleError> {
        let file_data: MemberData = read_json(&self.path)?;
        let mut members = self.members.write().map_err(lock_error)?;

        members.clear();
        for member in file_data.members {
            members.insert((member.household_id, member.user_id), member);
        }
        Ok(())
    }

    /// Save memberships to disk
    pub fn save(&self) -> Result<(), SettleError> {
        let members = self.members.read().map_err(lock_error)?;
        let mut list: Vec<_> = members.values().cloned().collect();
        list.sort_by(|a, b| {
            (a.household_id, &a.display_name).cmp(&(b.household_id, &b.display_name))
        });
        write_json_atomic(&self.path, &MemberData { members: list })
    }

    /// Look up a user's membership in a household
    pub fn get(
        &self,
        household_id: HouseholdId,
        user_id: UserId,
    ) -> Result<Option<HouseholdMember>, SettleError> {
        let members = self.members.read().map_err(lock_error)?;
        Ok(members.get(&(household_id, user_id)).cloned())
    }

    /// All members of a household, by display name
    pub fn get_for_household(
        &self,
        household_id: HouseholdId,
    ) -> Result<Vec<HouseholdMember>, SettleError> {
        let members = self.members.read().map_err(lock_error)?;
        let mut list: Vec<_> = members
            .values()
            .filter(|m| m.household_id == household_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(list)
    }

    /// Insert or replace a membership
    pub fn upsert(&self, member: HouseholdMember) -> Result<(), SettleError> {
        let mut members = self.members.write().map_err(lock_error)?;
        members.insert((member.household_id, member.user_id), member);
        Ok(())
    }
}
