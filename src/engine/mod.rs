//! Settlement computation
//!
//! A pure function of one month's ledger: no storage, no clock. The stages run
//! in a fixed order:
//!
//! 1. `weights`: income rows to apportionment weights
//! 2. `apportion`: each member's fair share of shared expenses
//! 3. `balances`: payments, household deltas, personal reimbursements, merge
//! 4. `netting`: balances to transfers
//!
//! # Example
//!
//! ```rust,ignore
//! let policy = HouseholdPolicy::resolve(household, storage.load_policy(household)?);
//! let breakdown = compute_settlement(&transactions, &incomes, &policy);
//! for transfer in &breakdown.netting.transfers {
//!     println!("{} -> {}: {}", transfer.from, transfer.to, transfer.amount);
//! }
//! ```

pub mod apportion;
pub mod balances;
pub mod netting;
pub mod weights;

pub use apportion::{apportion_household_expenses, share_of};
pub use balances::{
    aggregate_payments, household_deltas, merge_balances, personal_reimbursements, BalanceMap,
};
pub use netting::{net_balances, NettingOutcome, Transfer};
pub use weights::{income_weights, Weight, WeightMap};

use tracing::{debug, warn};

use crate::models::{HouseholdPolicy, Income, Transaction, Yen};

/// Every intermediate result of a settlement computation
#[derive(Debug, Clone)]
pub struct SettlementBreakdown {
    pub policy: HouseholdPolicy,
    pub weights: WeightMap,
    pub fair_shares: BalanceMap,
    pub paid: BalanceMap,
    pub household_deltas: BalanceMap,
    pub reimbursements: BalanceMap,
    pub balances: BalanceMap,
    pub netting: NettingOutcome,
    /// Number of shared expenses that were apportioned
    pub shared_expense_count: usize,
}

impl SettlementBreakdown {
    /// Sum of the final balances
    pub fn drift(&self) -> Yen {
        balances::drift(&self.balances)
    }

    pub fn transfers(&self) -> &[Transfer] {
        &self.netting.transfers
    }
}

/// Run every stage over a month's transactions and incomes
///
/// Deleted rows and income entries are ignored even if the caller passes them.
pub fn compute_settlement(
    transactions: &[Transaction],
    incomes: &[Income],
    policy: &HouseholdPolicy,
) -> SettlementBreakdown {
    let live_incomes: Vec<Income> = incomes.iter().filter(|i| !i.is_deleted()).cloned().collect();
    let shared: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| !t.is_deleted() && t.is_household_expense())
        .collect();
    let personal: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| !t.is_deleted() && t.is_personal_expense())
        .collect();

    let weights = income_weights(&live_incomes, policy.apportionment_zero_income);
    debug!(
        members = weights.len(),
        incomes = live_incomes.len(),
        "computed income weights"
    );

    let fair_shares = apportion_household_expenses(&shared, &weights, policy.rounding);
    let paid = aggregate_payments(&shared);
    let household = household_deltas(&paid, &fair_shares);
    let reimbursements = personal_reimbursements(&personal);
    let balances = merge_balances(&household, &reimbursements);
    debug!(
        shared = shared.len(),
        personal = personal.len(),
        drift = balances::drift(&balances).value(),
        "merged member balances"
    );

    let netting = net_balances(&balances);
    if !netting.is_fully_settled() {
        let residual: Yen = netting.unsettled.values().sum();
        warn!(
            unsettled_members = netting.unsettled.len(),
            residual = residual.value(),
            "balances did not net to zero"
        );
    }

    SettlementBreakdown {
        policy: *policy,
        weights,
        fair_shares,
        paid,
        household_deltas: household,
        reimbursements,
        balances,
        netting,
        shared_expense_count: shared.len(),
    }
}
