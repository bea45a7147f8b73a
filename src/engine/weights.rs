//! Income weight calculation
//!
//! Turns a month's income rows into each member's share of household costs.
//! Weights are kept as exact fractions of whole yen so that apportionment can
//! round in integer arithmetic.

use std::collections::BTreeMap;

use crate::models::{Income, UserId, Yen, ZeroIncomePolicy};

/// A member's fraction of shared costs, `numerator / denominator`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Weight {
    numerator: i64,
    denominator: i64,
}

/// Apportionment weights keyed by member
pub type WeightMap = BTreeMap<UserId, Weight>;

impl Weight {
    /// Create a weight; `None` unless `0 <= numerator <= denominator` and
    /// `denominator > 0`
    pub fn new(numerator: i64, denominator: i64) -> Option<Self> {
        if denominator <= 0 || numerator < 0 || numerator > denominator {
            return None;
        }
        Some(Self {
            numerator,
            denominator,
        })
    }

    pub fn numerator(&self) -> i64 {
        self.numerator
    }

    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    /// Approximate value, for display and tolerance checks only
    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

/// Compute apportionment weights for a month's incomes
///
/// With positive total allocatable income every member with a row is weighted
/// by their allocatable share, zero-income members included at weight 0. With
/// zero total, `Exclude` yields no weights and `Equal` splits evenly among the
/// members that have a row; no rows at all yields no weights either way.
pub fn income_weights(incomes: &[Income], policy: ZeroIncomePolicy) -> WeightMap {
    let mut allocatable: BTreeMap<UserId, Yen> = BTreeMap::new();
    for income in incomes {
        *allocatable.entry(income.user_id).or_default() += income.allocatable();
    }

    let total: Yen = allocatable.values().sum();

    if total.is_positive() {
        return allocatable
            .into_iter()
            .filter_map(|(user, amount)| {
                Weight::new(amount.value(), total.value()).map(|w| (user, w))
            })
            .collect();
    }

    match policy {
        ZeroIncomePolicy::Exclude => WeightMap::new(),
        ZeroIncomePolicy::Equal => {
            let count = allocatable.len() as i64;
            allocatable
                .into_keys()
                .filter_map(|user| Weight::new(1, count).map(|w| (user, w)))
                .collect()
        }
    }
}
