//! Storage initialization
//!
//! First-run setup: directories, default settings and empty data files.

use tracing::info;

use crate::config::paths::SettlePaths;
use crate::config::settings::Settings;
use crate::error::SettleResult;

use super::{
    IncomeRepository, MemberRepository, PolicyRepository, SettlementRepository,
    TransactionRepository,
};

/// Initialize storage for a fresh installation
///
/// Existing files are left untouched, so running it twice is harmless.
pub fn initialize_storage(paths: &SettlePaths) -> SettleResult<()> {
    paths.ensure_directories()?;

    if !paths.settings_file().exists() {
        Settings::default().save(paths)?;
    }

    if !paths.transactions_file().exists() {
        TransactionRepository::new(paths.transactions_file()).save()?;
    }
    if !paths.incomes_file().exists() {
        IncomeRepository::new(paths.incomes_file()).save()?;
    }
    if !paths.policies_file().exists() {
        PolicyRepository::new(paths.policies_file()).save()?;
    }
    if !paths.members_file().exists() {
        MemberRepository::new(paths.members_file()).save()?;
    }
    if !paths.settlements_file().exists() {
        SettlementRepository::new(paths.settlements_file()).save()?;
    }

    info!(base_dir = %paths.base_dir().display(), "storage initialized");
    Ok(())
}

/// Check if storage needs initialization
pub fn needs_initialization(paths: &SettlePaths) -> bool {
    !paths.settings_file().exists()
}
