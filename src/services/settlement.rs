//! Settlement service
//!
//! Runs the settlement engine over a household-month and manages the
//! resulting record through its lifecycle: a DRAFT that is rebuilt on every
//! run, then a FINALIZED record that nothing may change.

use chrono::Utc;
use tracing::{info, warn};

use crate::engine::{compute_settlement, SettlementBreakdown};
use crate::error::{SettleError, SettleResult};
use crate::models::{
    HouseholdId, HouseholdPolicy, Settlement, SettlementId, SettlementMonth, UnsettledBalance,
    UserId,
};
use crate::storage::{LedgerSource, Storage};

/// Service for running and finalizing settlements
pub struct SettlementService<'a> {
    storage: &'a Storage,
}

impl<'a> SettlementService<'a> {
    /// Create a new settlement service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Compute a month's settlement without persisting anything
    pub fn preview(
        &self,
        household_id: HouseholdId,
        month: SettlementMonth,
    ) -> SettleResult<SettlementBreakdown> {
        let transactions = self.storage.load_month_transactions(household_id, month)?;
        let incomes = self.storage.load_month_incomes(household_id, month)?;
        let policy = HouseholdPolicy::resolve(household_id, self.storage.load_policy(household_id)?);

        Ok(compute_settlement(&transactions, &incomes, &policy))
    }

    /// Compute and store a fresh DRAFT for the month
    ///
    /// Any previous DRAFT for the month is replaced in the same unit of work.
    /// Fails with a conflict once the month has been finalized.
    pub fn run_settlement(
        &self,
        household_id: HouseholdId,
        month: SettlementMonth,
    ) -> SettleResult<Settlement> {
        let breakdown = self.preview(household_id, month)?;
        let draft = build_draft(household_id, month, &breakdown)?;

        let replaced = self.storage.settlements.transaction(|uow| {
            if let Some(finalized) = uow.finalized_for(household_id, month) {
                return Err(SettleError::Conflict(format!(
                    "Settlement for {} is already finalized ({})",
                    month, finalized.id
                )));
            }

            let previous = uow.draft_for(household_id, month).map(|s| s.id);
            let replaced = match previous {
                Some(id) => Some(uow.remove(id)?),
                None => None,
            };
            uow.insert_draft(draft.clone())?;
            Ok(replaced)
        })?;

        if let Some(old) = &replaced {
            warn_on_audit_failure(old, self.storage.log_settlement_replaced(old));
        }
        warn_on_audit_failure(&draft, self.storage.log_settlement_created(&draft));

        info!(
            household = %household_id,
            period = %month,
            settlement = %draft.id,
            lines = draft.lines.len(),
            total = draft.total_transferred().value(),
            replaced = replaced.is_some(),
            "settlement drafted"
        );

        Ok(draft)
    }

    /// Move a DRAFT to FINALIZED on behalf of an admin member
    pub fn finalize_settlement(
        &self,
        household_id: HouseholdId,
        settlement_id: SettlementId,
        actor: UserId,
    ) -> SettleResult<Settlement> {
        match self.storage.members.get(household_id, actor)? {
            Some(member) if member.is_admin() => {}
            Some(_) => {
                return Err(SettleError::Forbidden(format!(
                    "{} is not an admin of household {}",
                    actor, household_id
                )))
            }
            None => {
                return Err(SettleError::Forbidden(format!(
                    "{} is not a member of household {}",
                    actor, household_id
                )))
            }
        }

        let (before, after) = self.storage.settlements.transaction(|uow| {
            let settlement = uow
                .get_mut(settlement_id)
                .filter(|s| s.household_id == household_id)
                .ok_or_else(|| SettleError::settlement_not_found(settlement_id.to_string()))?;

            let before = settlement.clone();
            settlement.finalize(actor, Utc::now()).map_err(|e| {
                SettleError::Conflict(format!("{} ({})", e, settlement_id))
            })?;
            Ok((before, settlement.clone()))
        })?;

        warn_on_audit_failure(
            &after,
            self.storage.log_settlement_finalized(&before, &after, actor),
        );

        info!(
            household = %household_id,
            period = %after.period(),
            settlement = %settlement_id,
            finalized_by = %actor,
            "settlement finalized"
        );

        Ok(after)
    }

    /// A settlement of this household, with its lines
    pub fn find_one(
        &self,
        household_id: HouseholdId,
        settlement_id: SettlementId,
    ) -> SettleResult<Settlement> {
        self.storage
            .settlements
            .get(settlement_id)?
            .filter(|s| s.household_id == household_id)
            .ok_or_else(|| SettleError::settlement_not_found(settlement_id.to_string()))
    }

    /// All settlements of the household, newest month first
    pub fn find_all(&self, household_id: HouseholdId) -> SettleResult<Vec<Settlement>> {
        self.storage.settlements.get_for_household(household_id)
    }
}

/// The settlement is already committed when its audit entry is written, so a
/// failed write is reported but does not undo or fail the operation.
fn warn_on_audit_failure(settlement: &Settlement, result: SettleResult<()>) {
    if let Err(e) = result {
        warn!(
            settlement = %settlement.id,
            period = %settlement.period(),
            error = %e,
            "failed to write audit entry"
        );
    }
}

/// Turn a computed breakdown into an unsaved DRAFT
fn build_draft(
    household_id: HouseholdId,
    month: SettlementMonth,
    breakdown: &SettlementBreakdown,
) -> SettleResult<Settlement> {
    let mut draft = Settlement::draft(household_id, month);

    for transfer in breakdown.transfers() {
        draft
            .add_line(transfer.from, transfer.to, transfer.amount)
            .map_err(|e| SettleError::Validation(e.to_string()))?;
    }
    draft.unsettled = breakdown
        .netting
        .unsettled
        .iter()
        .map(|(&user_id, &amount)| UnsettledBalance { user_id, amount })
        .collect();

    Ok(draft)
}
