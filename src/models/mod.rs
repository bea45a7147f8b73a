//! Core data models for household settlement
//!
//! This module contains the data structures of the settlement domain: ledger
//! transactions, monthly incomes, apportionment policy, members and the
//! settlements themselves.

pub mod ids;
pub mod income;
pub mod member;
pub mod money;
pub mod period;
pub mod policy;
pub mod settlement;
pub mod transaction;

pub use ids::{HouseholdId, IncomeId, SettlementId, TransactionId, UserId};
pub use income::Income;
pub use member::{HouseholdMember, MemberRole};
pub use money::Yen;
pub use period::SettlementMonth;
pub use policy::{HouseholdPolicy, RoundingPolicy, ZeroIncomePolicy};
pub use settlement::{
    Settlement, SettlementLine, SettlementStateError, SettlementStatus, UnsettledBalance,
};
pub use transaction::{ShouldPay, Transaction, TransactionKind};
