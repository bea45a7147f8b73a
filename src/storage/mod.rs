//! Storage layer for household-settle
//!
//! JSON file storage with atomic writes and automatic directory creation.
//! Ledger data (transactions, incomes, policies, members) is read-only from
//! the settlement engine's point of view; settlements are the only table it
//! writes, and always through a unit of work.

pub mod file_io;
pub mod incomes;
pub mod init;
pub mod ledger;
pub mod members;
pub mod policies;
pub mod settlements;
pub mod transactions;

pub use file_io::{read_json, write_json_atomic};
pub use incomes::IncomeRepository;
pub use init::{initialize_storage, needs_initialization};
pub use ledger::LedgerSource;
pub use members::MemberRepository;
pub use policies::PolicyRepository;
pub use settlements::{SettlementRepository, SettlementUnitOfWork};
pub use transactions::TransactionRepository;

use crate::audit::{generate_diff, AuditEntry, AuditLogger, EntityType};
use crate::config::paths::SettlePaths;
use crate::error::{SettleError, SettleResult};
use crate::models::{
    HouseholdId, HouseholdMember, HouseholdPolicy, Income, Settlement, SettlementMonth,
    Transaction, UserId,
};

pub(crate) fn lock_error<E: std::fmt::Display>(e: E) -> SettleError {
    SettleError::Storage(format!("Failed to acquire lock: {}", e))
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: SettlePaths,
    pub transactions: TransactionRepository,
    pub incomes: IncomeRepository,
    pub policies: PolicyRepository,
    pub members: MemberRepository,
    pub settlements: SettlementRepository,
    audit: AuditLogger,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: SettlePaths) -> SettleResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            transactions: TransactionRepository::new(paths.transactions_file()),
            incomes: IncomeRepository::new(paths.incomes_file()),
            policies: PolicyRepository::new(paths.policies_file()),
            members: MemberRepository::new(paths.members_file()),
            settlements: SettlementRepository::new(paths.settlements_file()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &SettlePaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&self) -> SettleResult<()> {
        self.transactions.load()?;
        self.incomes.load()?;
        self.policies.load()?;
        self.members.load()?;
        self.settlements.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> SettleResult<()> {
        self.transactions.save()?;
        self.incomes.save()?;
        self.policies.save()?;
        self.members.save()?;
        self.settlements.save()?;
        Ok(())
    }

    /// Check if storage has been initialized
    pub fn is_initialized(&self) -> bool {
        !needs_initialization(&self.paths)
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Record a newly created draft
    pub fn log_settlement_created(&self, settlement: &Settlement) -> SettleResult<()> {
        self.audit.log(&AuditEntry::create(
            EntityType::Settlement,
            settlement.id.as_uuid().to_string(),
            settlement.household_id,
            Some(settlement.period()),
            settlement,
        ))
    }

    /// Record a draft removed by a rerun
    pub fn log_settlement_replaced(&self, settlement: &Settlement) -> SettleResult<()> {
        self.audit.log(&AuditEntry::delete(
            EntityType::Settlement,
            settlement.id.as_uuid().to_string(),
            settlement.household_id,
            Some(settlement.period()),
            settlement,
        ))
    }

    /// Record a finalization together with the acting member
    pub fn log_settlement_finalized(
        &self,
        before: &Settlement,
        after: &Settlement,
        actor: UserId,
    ) -> SettleResult<()> {
        let diff_summary = match (serde_json::to_value(before), serde_json::to_value(after)) {
            (Ok(b), Ok(a)) => generate_diff(&b, &a),
            _ => None,
        };

        let entry = AuditEntry::update(
            EntityType::Settlement,
            after.id.as_uuid().to_string(),
            after.household_id,
            Some(after.period()),
            before,
            after,
            diff_summary,
        )
        .by(actor);
        self.audit.log(&entry)
    }
}

impl LedgerSource for Storage {
    fn load_month_transactions(
        &self,
        household_id: HouseholdId,
        month: SettlementMonth,
    ) -> SettleResult<Vec<Transaction>> {
        self.transactions.get_for_month(household_id, month)
    }

    fn load_month_incomes(
        &self,
        household_id: HouseholdId,
        month: SettlementMonth,
    ) -> SettleResult<Vec<Income>> {
        self.incomes.get_for_month(household_id, month)
    }

    fn load_policy(&self, household_id: HouseholdId) -> SettleResult<Option<HouseholdPolicy>> {
        self.policies.get(household_id)
    }

    fn load_members(&self, household_id: HouseholdId) -> SettleResult<Vec<HouseholdMember>> {
        self.members.get_for_household(household_id)
    }
}
