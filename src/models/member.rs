//! Household membership
//!
//! Members are maintained elsewhere; settlement only reads them to resolve
//! display names and to check who may finalize.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{HouseholdId, UserId};

/// Privilege level of a member within a household
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Admin,
    #[default]
    Member,
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "Admin"),
            Self::Member => write!(f, "Member"),
        }
    }
}

/// A user's membership in a household
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseholdMember {
    pub household_id: HouseholdId,
    pub user_id: UserId,
    pub display_name: String,
    #[serde(default)]
    pub role: MemberRole,
}

impl HouseholdMember {
    pub fn new(household_id: HouseholdId, user_id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            household_id,
            user_id,
            display_name: display_name.into(),
            role: MemberRole::Member,
        }
    }

    pub fn admin(household_id: HouseholdId, user_id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            role: MemberRole::Admin,
            ..Self::new(household_id, user_id, display_name)
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == MemberRole::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles() {
        let household = HouseholdId::new();
        let member = HouseholdMember::new(household, UserId::new(), "Aki");
        let admin = HouseholdMember::admin(household, UserId::new(), "Ren");

        assert!(!member.is_admin());
        assert!(admin.is_admin());
    }

    #[test]
    fn test_role_defaults_to_member() {
        let json = format!(
            r#"{{"household_id":"{}","user_id":"{}","display_name":"Aki"}}"#,
            HouseholdId::new().as_uuid(),
            UserId::new().as_uuid()
        );
        let member: HouseholdMember = serde_json::from_str(&json).unwrap();
        assert_eq!(member.role, MemberRole::Member);
    }
}
