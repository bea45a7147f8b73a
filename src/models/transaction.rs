//! Transaction model
//!
//! A household ledger entry. Expenses carry who paid (`payer_user_id`) and who
//! the cost belongs to (`should_pay`): the whole household, shared by income
//! weight, or one member personally.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{HouseholdId, TransactionId, UserId};
use super::money::Yen;

/// Direction of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "Income"),
            Self::Expense => write!(f, "Expense"),
        }
    }
}

/// Who bears the cost of an expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShouldPay {
    /// Shared by all members in proportion to their income weight
    Household,
    /// Owed in full by `should_pay_user_id`
    User,
}

impl fmt::Display for ShouldPay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Household => write!(f, "Household"),
            Self::User => write!(f, "User"),
        }
    }
}

/// A household ledger transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,

    pub household_id: HouseholdId,

    /// Signed amount; expenses are consumed by magnitude
    pub amount: Yen,

    pub kind: TransactionKind,

    pub should_pay: ShouldPay,

    /// Member who actually paid
    pub payer_user_id: UserId,

    /// Member the cost belongs to, for personal expenses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_pay_user_id: Option<UserId>,

    pub occurred_on: NaiveDate,

    #[serde(default)]
    pub description: String,

    /// Soft-delete marker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    ZeroAmount,
    MissingBeneficiary,
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroAmount => write!(f, "Transaction amount cannot be zero"),
            Self::MissingBeneficiary => {
                write!(f, "Personal expense needs the member who should pay")
            }
        }
    }
}

impl std::error::Error for TransactionValidationError {}

impl Transaction {
    /// Create an expense shared by the whole household
    pub fn household_expense(
        household_id: HouseholdId,
        payer: UserId,
        amount: Yen,
        occurred_on: NaiveDate,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            household_id,
            amount,
            kind: TransactionKind::Expense,
            should_pay: ShouldPay::Household,
            payer_user_id: payer,
            should_pay_user_id: None,
            occurred_on,
            description: String::new(),
            deleted_at: None,
            created_at: Utc::now(),
        }
    }

    /// Create a personal expense paid by `payer` on behalf of `owed_by`
    pub fn personal_expense(
        household_id: HouseholdId,
        payer: UserId,
        owed_by: UserId,
        amount: Yen,
        occurred_on: NaiveDate,
    ) -> Self {
        Self {
            should_pay: ShouldPay::User,
            should_pay_user_id: Some(owed_by),
            ..Self::household_expense(household_id, payer, amount, occurred_on)
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Expense shared by income weight
    pub fn is_household_expense(&self) -> bool {
        self.is_expense() && self.should_pay == ShouldPay::Household
    }

    /// Expense owed by a single member
    pub fn is_personal_expense(&self) -> bool {
        self.is_expense() && self.should_pay == ShouldPay::User
    }

    /// Unsigned amount of the transaction
    pub fn magnitude(&self) -> Yen {
        self.amount.abs()
    }

    /// Validate the transaction
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if self.amount.is_zero() {
            return Err(TransactionValidationError::ZeroAmount);
        }
        if self.is_personal_expense() && self.should_pay_user_id.is_none() {
            return Err(TransactionValidationError::MissingBeneficiary);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    #[test]
    fn test_household_expense() {
        let txn = Transaction::household_expense(
            HouseholdId::new(),
            UserId::new(),
            Yen::new(10_000),
            date(),
        );

        assert!(txn.is_household_expense());
        assert!(!txn.is_personal_expense());
        assert!(txn.should_pay_user_id.is_none());
        assert!(txn.validate().is_ok());
    }

    #[test]
    fn test_personal_expense_records_beneficiary() {
        let payer = UserId::new();
        let owed_by = UserId::new();
        let txn =
            Transaction::personal_expense(HouseholdId::new(), payer, owed_by, Yen::new(800), date())
                .with_description("Lunch");

        assert!(txn.is_personal_expense());
        assert_eq!(txn.payer_user_id, payer);
        assert_eq!(txn.should_pay_user_id, Some(owed_by));
        assert_eq!(txn.description, "Lunch");
    }

    #[test]
    fn test_magnitude_of_negative_amount() {
        let txn = Transaction::household_expense(
            HouseholdId::new(),
            UserId::new(),
            Yen::new(-3_000),
            date(),
        );
        assert_eq!(txn.magnitude(), Yen::new(3_000));
    }

    #[test]
    fn test_validation() {
        let mut txn = Transaction::household_expense(
            HouseholdId::new(),
            UserId::new(),
            Yen::zero(),
            date(),
        );
        assert_eq!(txn.validate(), Err(TransactionValidationError::ZeroAmount));

        txn.amount = Yen::new(500);
        txn.should_pay = ShouldPay::User;
        assert_eq!(
            txn.validate(),
            Err(TransactionValidationError::MissingBeneficiary)
        );
    }

    #[test]
    fn test_wire_format_uses_uppercase_tags() {
        let txn = Transaction::household_expense(
            HouseholdId::new(),
            UserId::new(),
            Yen::new(1_000),
            date(),
        );
        let json = serde_json::to_value(&txn).unwrap();
        assert_eq!(json["kind"], "EXPENSE");
        assert_eq!(json["should_pay"], "HOUSEHOLD");
        assert!(json.get("deleted_at").is_none());
    }
}
