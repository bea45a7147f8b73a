//! Transaction repository for JSON storage
//!
//! Manages loading and saving ledger transactions to transactions.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::SettleError;
use crate::models::{HouseholdId, SettlementMonth, Transaction, TransactionId};

use super::file_io::{read_json, write_json_atomic};
use super::lock_error;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransactionData {
    #[serde(default)]
    transactions: Vec<Transaction>,
}

/// Repository for ledger transactions, indexed by household
pub struct TransactionRepository {
    path: PathBuf,
    data: RwLock<HashMap<TransactionId, Transaction>>,
    by_household: RwLock<HashMap<HouseholdId, Vec<TransactionId>>>,
}

impl TransactionRepository {
    /// Create a new transaction repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_household: RwLock::new(HashMap::new()),
        }
    }

    /// Load transactions from disk and build the household index
    pub fn load(&self) -> Result<(), SettleError> {
        let file_data: TransactionData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(lock_error)?;
        let mut by_household = self.by_household.write().map_err(lock_error)?;

        data.clear();
        by_household.clear();

        for txn in file_data.transactions {
            by_household.entry(txn.household_id).or_default().push(txn.id);
            data.insert(txn.id, txn);
        }

        Ok(())
    }

    /// Save transactions to disk
    pub fn save(&self) -> Result<(), SettleError> {
        let data = self.data.read().map_err(lock_error)?;

        let mut transactions: Vec<_> = data.values().cloned().collect();
        transactions.sort_by(|a, b| {
            a.occurred_on
                .cmp(&b.occurred_on)
                .then(a.created_at.cmp(&b.created_at))
        });

        write_json_atomic(&self.path, &TransactionData { transactions })
    }

    /// Get a transaction by ID
    pub fn get(&self, id: TransactionId) -> Result<Option<Transaction>, SettleError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.get(&id).cloned())
    }

    /// Non-deleted transactions of a household that occurred in `month`
    ///
    /// Ordered by date, then creation time, so the result is reproducible.
    pub fn get_for_month(
        &self,
        household_id: HouseholdId,
        month: SettlementMonth,
    ) -> Result<Vec<Transaction>, SettleError> {
        let data = self.data.read().map_err(lock_error)?;
        let by_household = self.by_household.read().map_err(lock_error)?;

        let ids = by_household
            .get(&household_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        let mut transactions: Vec<_> = ids
            .iter()
            .filter_map(|id| data.get(id))
            .filter(|t| !t.is_deleted() && month.contains(t.occurred_on))
            .cloned()
            .collect();
        transactions.sort_by(|a, b| {
            a.occurred_on
                .cmp(&b.occurred_on)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        Ok(transactions)
    }

    /// Insert or update a transaction
    pub fn upsert(&self, txn: Transaction) -> Result<(), SettleError> {
        txn.validate()
            .map_err(|e| SettleError::Validation(e.to_string()))?;

        let mut data = self.data.write().map_err(lock_error)?;
        let mut by_household = self.by_household.write().map_err(lock_error)?;

        if let Some(previous) = data.get(&txn.id) {
            if previous.household_id != txn.household_id {
                if let Some(ids) = by_household.get_mut(&previous.household_id) {
                    ids.retain(|id| *id != txn.id);
                }
            }
        }

        let ids = by_household.entry(txn.household_id).or_default();
        if !ids.contains(&txn.id) {
            ids.push(txn.id);
        }
        data.insert(txn.id, txn);
        Ok(())
    }

    /// Count all transactions
    pub fn count(&self) -> Result<usize, SettleError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.len())
    }
}
