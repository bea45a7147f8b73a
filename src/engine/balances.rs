//! Member balances for a month
//!
//! Positive balance: the household owes the member. Negative: the member owes.

use std::collections::BTreeMap;

use crate::models::{Transaction, UserId, Yen};

pub type BalanceMap = BTreeMap<UserId, Yen>;

/// Total paid per member for shared expenses, unrounded
pub fn aggregate_payments(expenses: &[&Transaction]) -> BalanceMap {
    let mut paid = BalanceMap::new();
    for expense in expenses {
        *paid.entry(expense.payer_user_id).or_default() += expense.magnitude();
    }
    paid
}

/// `paid - fair_share` over every member that paid or owes a share
pub fn household_deltas(paid: &BalanceMap, fair_shares: &BalanceMap) -> BalanceMap {
    let mut deltas = BalanceMap::new();
    for (user, amount) in paid {
        *deltas.entry(*user).or_default() += *amount;
    }
    for (user, share) in fair_shares {
        *deltas.entry(*user).or_default() -= *share;
    }
    deltas
}

/// Net effect of personal expenses one member paid for another
///
/// Self-paid personal expenses are skipped entirely.
pub fn personal_reimbursements(expenses: &[&Transaction]) -> BalanceMap {
    let mut deltas = BalanceMap::new();
    for expense in expenses {
        let Some(owed_by) = expense.should_pay_user_id else {
            continue;
        };
        if owed_by == expense.payer_user_id {
            continue;
        }
        let amount = expense.magnitude();
        *deltas.entry(expense.payer_user_id).or_default() += amount;
        *deltas.entry(owed_by).or_default() -= amount;
    }
    deltas
}

/// Household delta plus reimbursement delta, over the union of members
pub fn merge_balances(household: &BalanceMap, reimbursements: &BalanceMap) -> BalanceMap {
    let mut merged = household.clone();
    for (user, amount) in reimbursements {
        *merged.entry(*user).or_default() += *amount;
    }
    merged
}

/// Sum of all balances; zero when the month nets out exactly
pub fn drift(balances: &BalanceMap) -> Yen {
    balances.values().sum()
}
