//! Household apportionment policy
//!
//! Decides how shared costs are split when nobody has allocatable income, and
//! how fractional yen are rounded per expense per member.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::HouseholdId;

/// What to do when total allocatable income for the month is zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ZeroIncomePolicy {
    /// Nobody gets a share; shared costs stay with whoever paid them
    #[default]
    Exclude,
    /// Every member with an income row gets an equal share
    Equal,
}

impl fmt::Display for ZeroIncomePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exclude => write!(f, "EXCLUDE"),
            Self::Equal => write!(f, "EQUAL"),
        }
    }
}

/// How a fractional share is turned into whole yen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoundingPolicy {
    Ceiling,
    Floor,
    /// Half away from zero
    #[default]
    Round,
}

impl RoundingPolicy {
    /// Round `numerator / denominator` to a whole number
    ///
    /// `denominator` must be positive. Works in exact integer arithmetic so the
    /// result never depends on floating-point representation.
    pub fn apply(&self, numerator: i128, denominator: i128) -> i128 {
        debug_assert!(denominator > 0);
        match self {
            Self::Floor => numerator.div_euclid(denominator),
            Self::Ceiling => -(-numerator).div_euclid(denominator),
            Self::Round => {
                let magnitude = (2 * numerator.abs() + denominator) / (2 * denominator);
                numerator.signum() * magnitude
            }
        }
    }
}

impl fmt::Display for RoundingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ceiling => write!(f, "CEILING"),
            Self::Floor => write!(f, "FLOOR"),
            Self::Round => write!(f, "ROUND"),
        }
    }
}

/// A household's apportionment settings, fully populated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdPolicy {
    pub household_id: HouseholdId,
    #[serde(default)]
    pub apportionment_zero_income: ZeroIncomePolicy,
    #[serde(default)]
    pub rounding: RoundingPolicy,
}

impl HouseholdPolicy {
    /// Default policy for a household: `EXCLUDE` and `ROUND`
    pub fn defaults(household_id: HouseholdId) -> Self {
        Self {
            household_id,
            apportionment_zero_income: ZeroIncomePolicy::default(),
            rounding: RoundingPolicy::default(),
        }
    }

    /// Use the stored policy if there is one, otherwise the defaults
    pub fn resolve(household_id: HouseholdId, stored: Option<HouseholdPolicy>) -> Self {
        stored.unwrap_or_else(|| Self::defaults(household_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_thirds() {
        // 100 yen at weight 1/3 and 2/3
        assert_eq!(RoundingPolicy::Ceiling.apply(100, 3), 34);
        assert_eq!(RoundingPolicy::Ceiling.apply(200, 3), 67);
        assert_eq!(RoundingPolicy::Floor.apply(100, 3), 33);
        assert_eq!(RoundingPolicy::Floor.apply(200, 3), 66);
        assert_eq!(RoundingPolicy::Round.apply(100, 3), 33);
        assert_eq!(RoundingPolicy::Round.apply(200, 3), 67);
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(RoundingPolicy::Round.apply(5, 2), 3);
        assert_eq!(RoundingPolicy::Round.apply(-5, 2), -3);
        assert_eq!(RoundingPolicy::Round.apply(7, 2), 4);
    }

    #[test]
    fn test_exact_division_is_unchanged() {
        for policy in [
            RoundingPolicy::Ceiling,
            RoundingPolicy::Floor,
            RoundingPolicy::Round,
        ] {
            assert_eq!(policy.apply(7_500, 1), 7_500);
            assert_eq!(policy.apply(30_000, 4), 7_500);
        }
    }

    #[test]
    fn test_negative_ceiling_and_floor() {
        assert_eq!(RoundingPolicy::Ceiling.apply(-7, 2), -3);
        assert_eq!(RoundingPolicy::Floor.apply(-7, 2), -4);
    }

    #[test]
    fn test_resolve_defaults() {
        let household = HouseholdId::new();
        let policy = HouseholdPolicy::resolve(household, None);
        assert_eq!(policy.household_id, household);
        assert_eq!(policy.apportionment_zero_income, ZeroIncomePolicy::Exclude);
        assert_eq!(policy.rounding, RoundingPolicy::Round);
    }

    #[test]
    fn test_resolve_keeps_stored_policy() {
        let household = HouseholdId::new();
        let stored = HouseholdPolicy {
            household_id: household,
            apportionment_zero_income: ZeroIncomePolicy::Equal,
            rounding: RoundingPolicy::Floor,
        };
        assert_eq!(HouseholdPolicy::resolve(household, Some(stored)), stored);
    }

    #[test]
    fn test_missing_fields_deserialize_to_defaults() {
        let household = HouseholdId::new();
        let json = format!(r#"{{"household_id":"{}"}}"#, household.as_uuid());
        let policy: HouseholdPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(policy, HouseholdPolicy::defaults(household));
    }
}
