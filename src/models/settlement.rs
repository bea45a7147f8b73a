//! Settlement model
//!
//! A settlement is the set of transfers that squares a household's month.
//! It starts as a DRAFT that is rebuilt on every run and becomes immutable
//! once FINALIZED.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{HouseholdId, SettlementId, UserId};
use super::money::Yen;
use super::period::SettlementMonth;

/// Lifecycle state of a settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum SettlementStatus {
    /// Recomputed on every run, replaced wholesale
    #[default]
    Draft,
    /// Terminal; the record and its lines are frozen
    Finalized,
}

impl SettlementStatus {
    /// Check if this settlement is locked against changes
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Finalized)
    }
}

impl fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "Draft"),
            Self::Finalized => write!(f, "Finalized"),
        }
    }
}

/// One transfer owed between two members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementLine {
    pub settlement_id: SettlementId,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    /// Always positive
    pub amount: Yen,
    #[serde(default)]
    pub description: String,
}

/// A balance the transfers could not clear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsettledBalance {
    pub user_id: UserId,
    pub amount: Yen,
}

/// Errors from invalid state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementStateError {
    AlreadyFinalized,
    NonPositiveLine(Yen),
    SelfTransfer,
}

impl fmt::Display for SettlementStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyFinalized => write!(f, "Settlement is already finalized"),
            Self::NonPositiveLine(amount) => {
                write!(f, "Settlement line amount must be positive, got {}", amount)
            }
            Self::SelfTransfer => write!(f, "Settlement line cannot pay a member to themselves"),
        }
    }
}

impl std::error::Error for SettlementStateError {}

/// A household-month settlement with its lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub id: SettlementId,
    pub household_id: HouseholdId,
    pub year: i32,
    pub month: u32,
    #[serde(default)]
    pub status: SettlementStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finalized_by: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finalized_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub lines: Vec<SettlementLine>,
    /// Residual balances left after netting (rounding drift, unassigned cost)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unsettled: Vec<UnsettledBalance>,
}

impl Settlement {
    /// Create an empty draft for a household-month
    pub fn draft(household_id: HouseholdId, month: SettlementMonth) -> Self {
        Self {
            id: SettlementId::new(),
            household_id,
            year: month.year(),
            month: month.month(),
            status: SettlementStatus::Draft,
            finalized_by: None,
            finalized_at: None,
            created_at: Utc::now(),
            lines: Vec::new(),
            unsettled: Vec::new(),
        }
    }

    /// The settlement's month
    pub fn period(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    pub fn is_for(&self, household_id: HouseholdId, month: SettlementMonth) -> bool {
        self.household_id == household_id && month.matches(self.year, self.month)
    }

    pub fn is_draft(&self) -> bool {
        self.status == SettlementStatus::Draft
    }

    pub fn is_locked(&self) -> bool {
        self.status.is_locked()
    }

    /// Append a transfer line
    pub fn add_line(
        &mut self,
        from_user_id: UserId,
        to_user_id: UserId,
        amount: Yen,
    ) -> Result<(), SettlementStateError> {
        if self.is_locked() {
            return Err(SettlementStateError::AlreadyFinalized);
        }
        if !amount.is_positive() {
            return Err(SettlementStateError::NonPositiveLine(amount));
        }
        if from_user_id == to_user_id {
            return Err(SettlementStateError::SelfTransfer);
        }

        let description = format!("Household settlement {}", self.period());
        self.lines.push(SettlementLine {
            settlement_id: self.id,
            from_user_id,
            to_user_id,
            amount,
            description,
        });
        Ok(())
    }

    /// Total of all transfer lines
    pub fn total_transferred(&self) -> Yen {
        self.lines.iter().map(|l| l.amount).sum()
    }

    /// Flip DRAFT to FINALIZED, stamping who and when
    pub fn finalize(
        &mut self,
        finalized_by: UserId,
        finalized_at: DateTime<Utc>,
    ) -> Result<(), SettlementStateError> {
        if self.is_locked() {
            return Err(SettlementStateError::AlreadyFinalized);
        }
        self.status = SettlementStatus::Finalized;
        self.finalized_by = Some(finalized_by);
        self.finalized_at = Some(finalized_at);
        Ok(())
    }
}
