//! Household expense apportionment
//!
//! Each shared expense is split across the weighted members and rounded per
//! expense per member. The rounded shares may add up to slightly more or less
//! than the expense; that drift is carried into the balances as-is.

use std::collections::BTreeMap;

use crate::models::{RoundingPolicy, Transaction, UserId, Yen};

use super::weights::{Weight, WeightMap};

/// One member's rounded share of a single amount
pub fn share_of(amount: Yen, weight: Weight, rounding: RoundingPolicy) -> Yen {
    let numerator = i128::from(amount.abs().value()) * i128::from(weight.numerator());
    let rounded = rounding.apply(numerator, i128::from(weight.denominator()));
    // weight <= 1, so the share never exceeds the amount
    Yen::new(rounded as i64)
}

/// Fair share of the month's shared expenses per weighted member
///
/// Every weighted member gets an entry, zero if nothing was shared.
pub fn apportion_household_expenses(
    expenses: &[&Transaction],
    weights: &WeightMap,
    rounding: RoundingPolicy,
) -> BTreeMap<UserId, Yen> {
    let mut shares: BTreeMap<UserId, Yen> =
        weights.keys().map(|user| (*user, Yen::zero())).collect();

    for expense in expenses {
        for (user, weight) in weights {
            let share = share_of(expense.magnitude(), *weight, rounding);
            *shares.entry(*user).or_default() += share;
        }
    }

    shares
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HouseholdId;
    use chrono::NaiveDate;

    fn expense(payer: UserId, amount: i64) -> Transaction {
        Transaction::household_expense(
            HouseholdId::new(),
            payer,
            Yen::new(amount),
            NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
        )
    }

    fn thirds(a: UserId, b: UserId) -> WeightMap {
        let mut weights = WeightMap::new();
        weights.insert(a, Weight::new(1, 3).unwrap());
        weights.insert(b, Weight::new(2, 3).unwrap());
        weights
    }

    #[test]
    fn test_three_quarter_split() {
        let (a, b) = (UserId::new(), UserId::new());
        let mut weights = WeightMap::new();
        weights.insert(a, Weight::new(300_000, 400_000).unwrap());
        weights.insert(b, Weight::new(100_000, 400_000).unwrap());

        let txn = expense(a, 10_000);
        let shares = apportion_household_expenses(&[&txn], &weights, RoundingPolicy::Round);

        assert_eq!(shares[&a], Yen::new(7_500));
        assert_eq!(shares[&b], Yen::new(2_500));
    }

    #[test]
    fn test_ceiling_thirds_drifts_up() {
        let (a, b) = (UserId::new(), UserId::new());
        let txn = expense(a, 100);
        let shares =
            apportion_household_expenses(&[&txn], &thirds(a, b), RoundingPolicy::Ceiling);

        assert_eq!(shares[&a], Yen::new(34));
        assert_eq!(shares[&b], Yen::new(67));
        assert_eq!(shares.values().sum::<Yen>(), Yen::new(101));
    }

    #[test]
    fn test_floor_thirds_drifts_down() {
        let (a, b) = (UserId::new(), UserId::new());
        let txn = expense(a, 100);
        let shares = apportion_household_expenses(&[&txn], &thirds(a, b), RoundingPolicy::Floor);

        assert_eq!(shares[&a], Yen::new(33));
        assert_eq!(shares[&b], Yen::new(66));
    }

    #[test]
    fn test_rounding_is_per_expense() {
        // Two 100 yen expenses at 1/3: ceil(33.3) twice is 68, not ceil(66.6) = 67
        let (a, b) = (UserId::new(), UserId::new());
        let first = expense(a, 100);
        let second = expense(b, 100);
        let shares = apportion_household_expenses(
            &[&first, &second],
            &thirds(a, b),
            RoundingPolicy::Ceiling,
        );

        assert_eq!(shares[&a], Yen::new(68));
        assert_eq!(shares[&b], Yen::new(134));
    }

    #[test]
    fn test_negative_amounts_use_magnitude() {
        let (a, b) = (UserId::new(), UserId::new());
        let txn = expense(a, -300);
        let shares = apportion_household_expenses(&[&txn], &thirds(a, b), RoundingPolicy::Round);

        assert_eq!(shares[&a], Yen::new(100));
        assert_eq!(shares[&b], Yen::new(200));
    }

    #[test]
    fn test_weighted_members_present_without_expenses() {
        let (a, b) = (UserId::new(), UserId::new());
        let shares = apportion_household_expenses(&[], &thirds(a, b), RoundingPolicy::Round);

        assert_eq!(shares.len(), 2);
        assert!(shares.values().all(|s| s.is_zero()));
    }

    #[test]
    fn test_no_weights_no_shares() {
        let txn = expense(UserId::new(), 5_000);
        let shares =
            apportion_household_expenses(&[&txn], &WeightMap::new(), RoundingPolicy::Round);
        assert!(shares.is_empty());
    }
}
