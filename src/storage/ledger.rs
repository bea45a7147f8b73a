//! Read-only ledger views consumed by settlement
//!
//! The settlement service only ever reads ledger data through this trait, so
//! any store that can answer these four questions can back it.

use crate::error::SettleResult;
use crate::models::{
    HouseholdId, HouseholdMember, HouseholdPolicy, Income, SettlementMonth, Transaction,
};

/// Month-scoped views of a household's ledger
pub trait LedgerSource {
    /// Non-deleted transactions that occurred within `month`
    fn load_month_transactions(
        &self,
        household_id: HouseholdId,
        month: SettlementMonth,
    ) -> SettleResult<Vec<Transaction>>;

    /// Non-deleted incomes recorded for `month`
    fn load_month_incomes(
        &self,
        household_id: HouseholdId,
        month: SettlementMonth,
    ) -> SettleResult<Vec<Income>>;

    /// The household's stored policy, if one was ever set
    fn load_policy(&self, household_id: HouseholdId) -> SettleResult<Option<HouseholdPolicy>>;

    /// Members of the household
    fn load_members(&self, household_id: HouseholdId) -> SettleResult<Vec<HouseholdMember>>;
}
