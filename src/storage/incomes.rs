//! Income repository
//!
//! Handles persistence of monthly incomes to incomes.json. At most one row
//! exists per (household, user, year, month); upserting replaces it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::SettleError;
use crate::models::{HouseholdId, Income, SettlementMonth, UserId};

use super::file_io::{read_json, write_json_atomic};
use super::lock_error;

type IncomeKey = (HouseholdId, UserId, i32, u32);

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct IncomeData {
    #[serde(default)]
    incomes: Vec<Income>,
}

/// Repository for monthly incomes
pub struct IncomeRepository {
    path: PathBuf,
    incomes: RwLock<HashMap<IncomeKey, Income>>,
}

fn key_of(income: &Income) -> IncomeKey {
    (income.household_id, income.user_id, income.year, income.month)
}

impl IncomeRepository {
    /// Create a new repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            incomes: RwLock::new(HashMap::new()),
        }
    }

    /// Load incomes from disk
    ///
    /// Later rows for the same (household, user, year, month) win.
    pub fn load(&self) -> Result<(), SettleError> {
        let file_data: IncomeData = read_json(&self.path)?;
        let mut incomes = self.incomes.write().map_err(lock_error)?;

        incomes.clear();
        for income in file_data.incomes {
            incomes.insert(key_of(&income), income);
        }
        Ok(())
    }

    /// Save incomes to disk
    pub fn save(&self) -> Result<(), SettleError> {
        let incomes = self.incomes.read().map_err(lock_error)?;

        let mut list: Vec<_> = incomes.values().cloned().collect();
        list.sort_by(|a, b| {
            (a.year, a.month, a.user_id).cmp(&(b.year, b.month, b.user_id))
        });

        write_json_atomic(&self.path, &IncomeData { incomes: list })
    }

    /// Insert an income, replacing any row for the same user and month
    pub fn upsert(&self, income: Income) -> Result<Option<Income>, SettleError> {
        income
            .validate()
            .map_err(|e| SettleError::Validation(e.to_string()))?;

        let mut incomes = self.incomes.write().map_err(lock_error)?;
        Ok(incomes.insert(key_of(&income), income))
    }

    /// Non-deleted incomes of a household for `month`, ordered by user
    pub fn get_for_month(
        &self,
        household_id: HouseholdId,
        month: SettlementMonth,
    ) -> Result<Vec<Income>, SettleError> {
        let incomes = self.incomes.read().map_err(lock_error)?;

        let mut list: Vec<_> = incomes
            .values()
            .filter(|i| i.household_id == household_id && i.is_for(month) && !i.is_deleted())
            .cloned()
            .collect();
        list.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(list)
    }
}
