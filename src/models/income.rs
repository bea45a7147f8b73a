//! Monthly income model
//!
//! One row per member per month. The allocatable part (gross minus
//! deductions, never below zero) is what apportionment weights are built from.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{HouseholdId, IncomeId, UserId};
use super::money::Yen;
use super::period::SettlementMonth;

/// Validation errors for incomes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncomeValidationError {
    NegativeGross,
    NegativeDeduction,
}

impl std::fmt::Display for IncomeValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeGross => write!(f, "Gross income cannot be negative"),
            Self::NegativeDeduction => write!(f, "Deductions cannot be negative"),
        }
    }
}

impl std::error::Error for IncomeValidationError {}

/// A member's income for one month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Income {
    pub id: IncomeId,
    pub household_id: HouseholdId,
    pub user_id: UserId,
    pub year: i32,
    pub month: u32,
    pub gross_income: Yen,
    /// Tax, social insurance and other deductions, collapsed
    #[serde(default)]
    pub deduction: Yen,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Income {
    /// Create a new income row
    pub fn new(
        household_id: HouseholdId,
        user_id: UserId,
        month: SettlementMonth,
        gross_income: Yen,
        deduction: Yen,
    ) -> Self {
        Self {
            id: IncomeId::new(),
            household_id,
            user_id,
            year: month.year(),
            month: month.month(),
            gross_income,
            deduction,
            deleted_at: None,
            created_at: Utc::now(),
        }
    }

    /// Income available for apportionment: `max(0, gross - deduction)`
    pub fn allocatable(&self) -> Yen {
        (self.gross_income - self.deduction).clamp_non_negative()
    }

    pub fn is_for(&self, month: SettlementMonth) -> bool {
        month.matches(self.year, self.month)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Validate the income row
    pub fn validate(&self) -> Result<(), IncomeValidationError> {
        if self.gross_income.is_negative() {
            return Err(IncomeValidationError::NegativeGross);
        }
        if self.deduction.is_negative() {
            return Err(IncomeValidationError::NegativeDeduction);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan() -> SettlementMonth {
        SettlementMonth::new(2025, 1).unwrap()
    }

    #[test]
    fn test_allocatable() {
        let income = Income::new(
            HouseholdId::new(),
            UserId::new(),
            jan(),
            Yen::new(300_000),
            Yen::new(60_000),
        );
        assert_eq!(income.allocatable(), Yen::new(240_000));
    }

    #[test]
    fn test_allocatable_never_negative() {
        let income = Income::new(
            HouseholdId::new(),
            UserId::new(),
            jan(),
            Yen::new(50_000),
            Yen::new(80_000),
        );
        assert_eq!(income.allocatable(), Yen::zero());
    }

    #[test]
    fn test_is_for_month() {
        let income = Income::new(
            HouseholdId::new(),
            UserId::new(),
            jan(),
            Yen::new(1),
            Yen::zero(),
        );
        assert!(income.is_for(jan()));
        assert!(!income.is_for(jan().next()));
    }

    #[test]
    fn test_validation() {
        let mut income = Income::new(
            HouseholdId::new(),
            UserId::new(),
            jan(),
            Yen::new(-1),
            Yen::zero(),
        );
        assert_eq!(income.validate(), Err(IncomeValidationError::NegativeGross));

        income.gross_income = Yen::new(100);
        income.deduction = Yen::new(-5);
        assert_eq!(
            income.validate(),
            Err(IncomeValidationError::NegativeDeduction)
        );
    }
}
