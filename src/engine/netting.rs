//! Debt netting
//!
//! Greedy matching of debtors to creditors. Not guaranteed to find the
//! minimum number of transfers, but deterministic: members with equal
//! balances keep their input order.

use std::collections::BTreeMap;

use crate::models::{UserId, Yen};

use super::balances::BalanceMap;

/// A payment from one member to another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub from: UserId,
    pub to: UserId,
    /// Always positive
    pub amount: Yen,
}

/// Result of netting a set of balances
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NettingOutcome {
    pub transfers: Vec<Transfer>,
    /// Balances left over when the input did not sum to zero
    pub unsettled: BTreeMap<UserId, Yen>,
}

impl NettingOutcome {
    pub fn is_fully_settled(&self) -> bool {
        self.unsettled.is_empty()
    }
}

/// Produce transfers that clear the given balances
///
/// Payers (negative) are visited most-indebted first and each is matched
/// against receivers (positive) largest credit first.
pub fn net_balances(balances: &BalanceMap) -> NettingOutcome {
    let mut payers: Vec<(UserId, Yen)> = balances
        .iter()
        .filter(|(_, b)| b.is_negative())
        .map(|(u, b)| (*u, *b))
        .collect();
    let mut receivers: Vec<(UserId, Yen)> = balances
        .iter()
        .filter(|(_, b)| b.is_positive())
        .map(|(u, b)| (*u, *b))
        .collect();

    // sort_by is stable
    payers.sort_by(|a, b| a.1.cmp(&b.1));
    receivers.sort_by(|a, b| b.1.cmp(&a.1));

    let mut outcome = NettingOutcome::default();

    for (payer, balance) in payers {
        let mut remaining = balance.abs();

        for (receiver, credit) in receivers.iter_mut() {
            if remaining.is_zero() {
                break;
            }
            if !credit.is_positive() {
                continue;
            }

            let amount = remaining.min(*credit);
            outcome.transfers.push(Transfer {
                from: payer,
                to: *receiver,
                amount,
            });
            remaining -= amount;
            *credit -= amount;
        }

        if remaining.is_positive() {
            outcome.unsettled.insert(payer, -remaining);
        }
    }

    for (receiver, credit) in receivers {
        if credit.is_positive() {
            outcome.unsettled.insert(receiver, credit);
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(balances: &BalanceMap, transfers: &[Transfer]) -> BalanceMap {
        let mut after = balances.clone();
        for t in transfers {
            *after.entry(t.from).or_default() += t.amount;
            *after.entry(t.to).or_default() -= t.amount;
        }
        after
    }

    #[test]
    fn test_two_members_single_transfer() {
        let (a, b) = (UserId::new(), UserId::new());
        let balances: BalanceMap = [(a, Yen::new(2_500)), (b, Yen::new(-2_500))].into();

        let outcome = net_balances(&balances);
        assert_eq!(
            outcome.transfers,
            vec![Transfer {
                from: b,
                to: a,
                amount: Yen::new(2_500)
            }]
        );
        assert!(outcome.is_fully_settled());
    }

    #[test]
    fn test_most_indebted_pays_largest_creditor_first() {
        let (a, b, c, d) = (UserId::new(), UserId::new(), UserId::new(), UserId::new());
        let balances: BalanceMap = [
            (a, Yen::new(7_000)),
            (b, Yen::new(3_000)),
            (c, Yen::new(-8_000)),
            (d, Yen::new(-2_000)),
        ]
        .into();

        let outcome = net_balances(&balances);
        assert_eq!(
            outcome.transfers,
            vec![
                Transfer { from: c, to: a, amount: Yen::new(7_000) },
                Transfer { from: c, to: b, amount: Yen::new(1_000) },
                Transfer { from: d, to: b, amount: Yen::new(2_000) },
            ]
        );
        assert!(apply(&balances, &outcome.transfers).values().all(|b| b.is_zero()));
    }

    #[test]
    fn test_zero_balances_generate_nothing() {
        let (a, b) = (UserId::new(), UserId::new());
        let balances: BalanceMap = [(a, Yen::zero()), (b, Yen::zero())].into();

        let outcome = net_balances(&balances);
        assert!(outcome.transfers.is_empty());
        assert!(outcome.is_fully_settled());
    }

    #[test]
    fn test_equal_balances_keep_input_order() {
        let mut ids = [UserId::new(), UserId::new(), UserId::new()];
        ids.sort();
        let [payer, first, second] = ids;
        let balances: BalanceMap = [
            (payer, Yen::new(-200)),
            (first, Yen::new(100)),
            (second, Yen::new(100)),
        ]
        .into();

        let outcome = net_balances(&balances);
        assert_eq!(outcome.transfers[0].to, first);
        assert_eq!(outcome.transfers[1].to, second);
    }

    #[test]
    fn test_residual_is_reported_not_dropped() {
        let (a, b) = (UserId::new(), UserId::new());
        // A paid 100 but shares drifted to 101 under ceiling
        let balances: BalanceMap = [(a, Yen::new(66)), (b, Yen::new(-67))].into();

        let outcome = net_balances(&balances);
        assert_eq!(outcome.transfers.len(), 1);
        assert_eq!(outcome.transfers[0].amount, Yen::new(66));
        assert_eq!(outcome.unsettled[&b], Yen::new(-1));
        assert!(!outcome.is_fully_settled());
    }

    #[test]
    fn test_receivers_without_payers_stay_unsettled() {
        let a = UserId::new();
        let balances: BalanceMap = [(a, Yen::new(10_000))].into();

        let outcome = net_balances(&balances);
        assert!(outcome.transfers.is_empty());
        assert_eq!(outcome.unsettled[&a], Yen::new(10_000));
    }
}
