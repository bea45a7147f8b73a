//! Settlement repository
//!
//! Settlements and their lines live together in settlements.json. Every
//! mutation goes through [`SettlementRepository::transaction`], which gives
//! the caller a [`SettlementUnitOfWork`] over a working copy and commits it
//! (file first, then memory) only if the closure succeeds. The unit of work
//! holds an advisory lock on a sibling `.lock` file, so two `settle`
//! processes sharing a data directory never commit over each other.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;
use std::sync::RwLock;

use tracing::debug;

use crate::error::{SettleError, SettleResult};
use crate::models::{HouseholdId, Settlement, SettlementId, SettlementMonth};

use super::file_io::{read_json, write_json_atomic};
use super::lock_error;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct SettlementData {
    #[serde(default)]
    settlements: Vec<Settlement>,
}

impl SettlementData {
    fn from_map(map: &HashMap<SettlementId, Settlement>) -> Self {
        let mut settlements: Vec<_> = map.values().cloned().collect();
        settlements.sort_by(|a, b| {
            (a.household_id, a.year, a.month, a.created_at)
                .cmp(&(b.household_id, b.year, b.month, b.created_at))
        });
        Self { settlements }
    }
}

/// Working copy of the settlement table for one atomic change
pub struct SettlementUnitOfWork {
    settlements: HashMap<SettlementId, Settlement>,
    dirty: bool,
}

impl SettlementUnitOfWork {
    /// Get a settlement by ID
    pub fn get(&self, id: SettlementId) -> Option<&Settlement> {
        self.settlements.get(&id)
    }

    /// Get a settlement for modification
    pub fn get_mut(&mut self, id: SettlementId) -> Option<&mut Settlement> {
        self.dirty = true;
        self.settlements.get_mut(&id)
    }

    /// The DRAFT for a household-month, if any
    pub fn draft_for(&self, household_id: HouseholdId, month: SettlementMonth) -> Option<&Settlement> {
        self.settlements
            .values()
            .find(|s| s.is_draft() && s.is_for(household_id, month))
    }

    /// The FINALIZED settlement for a household-month, if any
    pub fn finalized_for(
        &self,
        household_id: HouseholdId,
        month: SettlementMonth,
    ) -> Option<&Settlement> {
        self.settlements
            .values()
            .find(|s| s.is_locked() && s.is_for(household_id, month))
    }

    /// Delete a settlement together with its lines
    pub fn remove(&mut self, id: SettlementId) -> SettleResult<Settlement> {
        let existing = self
            .settlements
            .get(&id)
            .ok_or_else(|| SettleError::settlement_not_found(id.to_string()))?;
        if existing.is_locked() {
            return Err(SettleError::Conflict(format!(
                "Settlement {} is finalized and cannot be deleted",
                id
            )));
        }

        self.dirty = true;
        self.settlements
            .remove(&id)
            .ok_or_else(|| SettleError::settlement_not_found(id.to_string()))
    }

    /// Add a new DRAFT
    ///
    /// Fails with Conflict if the household-month already has a draft or is
    /// finalized.
    pub fn insert_draft(&mut self, settlement: Settlement) -> SettleResult<()> {
        if !settlement.is_draft() {
            return Err(SettleError::Validation(
                "Only draft settlements can be inserted".into(),
            ));
        }
        let month = SettlementMonth::new(settlement.year, settlement.month)
            .map_err(|e| SettleError::Validation(e.to_string()))?;

        if self.finalized_for(settlement.household_id, month).is_some() {
            return Err(SettleError::Conflict(format!(
                "Settlement for {} is already finalized",
                month
            )));
        }
        if self.draft_for(settlement.household_id, month).is_some() {
            return Err(SettleError::Conflict(format!(
                "A draft settlement for {} already exists",
                month
            )));
        }
        if self.settlements.contains_key(&settlement.id) {
            return Err(SettleError::Conflict(format!(
                "Settlement {} already exists",
                settlement.id
            )));
        }

        self.dirty = true;
        self.settlements.insert(settlement.id, settlement);
        Ok(())
    }
}

/// Repository for settlements and their lines
pub struct SettlementRepository {
    path: PathBuf,
    data: RwLock<HashMap<SettlementId, Settlement>>,
}

impl SettlementRepository {
    /// Create a new settlement repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load settlements from disk
    pub fn load(&self) -> SettleResult<()> {
        let file_data: SettlementData = read_json(&self.path)?;
        let mut data = self.data.write().map_err(lock_error)?;

        data.clear();
        for settlement in file_data.settlements {
            data.insert(settlement.id, settlement);
        }
        Ok(())
    }

    /// Save settlements to disk
    pub fn save(&self) -> SettleResult<()> {
        let data = self.data.read().map_err(lock_error)?;
        write_json_atomic(&self.path, &SettlementData::from_map(&data))
    }

    /// Sibling file the cross-process lock is taken on
    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn open_lock_file(&self) -> SettleResult<fd_lock::RwLock<File>> {
        let lock_path = self.lock_path();
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettleError::Storage(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| {
                SettleError::Storage(format!("Failed to open {}: {}", lock_path.display(), e))
            })?;
        Ok(fd_lock::RwLock::new(file))
    }

    /// Run `work` as one all-or-nothing change
    ///
    /// An exclusive lock on `settlements.json.lock` is held for the whole
    /// closure, so callers in this process and in other processes are
    /// serialized. The working copy is read from disk under that lock, never
    /// from an earlier snapshot. Changes reach memory only after they are on
    /// disk.
    pub fn transaction<T, F>(&self, work: F) -> SettleResult<T>
    where
        F: FnOnce(&mut SettlementUnitOfWork) -> SettleResult<T>,
    {
        let mut data = self.data.write().map_err(lock_error)?;

        let mut file_lock = self.open_lock_file()?;
        let _guard = file_lock.write().map_err(|e| {
            SettleError::Storage(format!(
                "Failed to lock {}: {}",
                self.lock_path().display(),
                e
            ))
        })?;

        let on_disk: SettlementData = read_json(&self.path)?;
        let current: HashMap<SettlementId, Settlement> = on_disk
            .settlements
            .into_iter()
            .map(|s| (s.id, s))
            .collect();
        *data = current.clone();

        let mut unit = SettlementUnitOfWork {
            settlements: current,
            dirty: false,
        };

        let result = work(&mut unit)?;

        if unit.dirty {
            write_json_atomic(&self.path, &SettlementData::from_map(&unit.settlements))?;
            *data = unit.settlements;
            debug!(path = %self.path.display(), "committed settlement changes");
        }
        Ok(result)
    }

    /// Get a settlement by ID
    pub fn get(&self, id: SettlementId) -> SettleResult<Option<Settlement>> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.get(&id).cloned())
    }

    /// All settlements of a household, newest month first
    pub fn get_for_household(&self, household_id: HouseholdId) -> SettleResult<Vec<Settlement>> {
        let data = self.data.read().map_err(lock_error)?;
        let mut list: Vec<_> = data
            .values()
            .filter(|s| s.household_id == household_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| (b.year, b.month, b.created_at).cmp(&(a.year, a.month, a.created_at)));
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{UserId, Yen};
    use chrono::Utc;
    use tempfile::TempDir;

    fn jan() -> SettlementMonth {
        SettlementMonth::new(2025, 1).unwrap()
    }

    fn create_test_repo() -> (TempDir, SettlementRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = SettlementRepository::new(temp_dir.path().join("settlements.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_commit_persists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settlements.json");
        let household = HouseholdId::new();
        let mut draft = Settlement::draft(household, jan());
        draft.add_line(UserId::new(), UserId::new(), Yen::new(100)).unwrap();
        let id = draft.id;

        let repo = SettlementRepository::new(path.clone());
        repo.transaction(|uow| uow.insert_draft(draft)).unwrap();
        assert!(repo.get(id).unwrap().is_some());

        let reloaded = SettlementRepository::new(path);
        reloaded.load().unwrap();
        let loaded = reloaded.get(id).unwrap().unwrap();
        assert_eq!(loaded.lines.len(), 1);
    }

    #[test]
    fn test_failed_work_changes_nothing() {
        let (temp_dir, repo) = create_test_repo();
        let household = HouseholdId::new();
        let draft = Settlement::draft(household, jan());
        let id = draft.id;

        let result: SettleResult<()> = repo.transaction(|uow| {
            uow.insert_draft(draft)?;
            Err(SettleError::Storage("simulated failure".into()))
        });

        assert!(result.is_err());
        assert!(repo.get(id).unwrap().is_none());
        assert!(!temp_dir.path().join("settlements.json").exists());
    }

    #[test]
    fn test_second_draft_for_month_conflicts() {
        let (_temp_dir, repo) = create_test_repo();
        let household = HouseholdId::new();

        repo.transaction(|uow| uow.insert_draft(Settlement::draft(household, jan())))
            .unwrap();
        let err = repo
            .transaction(|uow| uow.insert_draft(Settlement::draft(household, jan())))
            .unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(repo.get_for_household(household).unwrap().len(), 1);
    }

    #[test]
    fn test_draft_next_to_finalized_conflicts() {
        let (_temp_dir, repo) = create_test_repo();
        let household = HouseholdId::new();
        let mut finalized = Settlement::draft(household, jan());
        finalized.finalize(UserId::new(), Utc::now()).unwrap();

        repo.transaction(|uow| {
            uow.settlements.insert(finalized.id, finalized);
            uow.dirty = true;
            Ok(())
        })
        .unwrap();

        let err = repo
            .transaction(|uow| uow.insert_draft(Settlement::draft(household, jan())))
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_finalized_cannot_be_removed() {
        let (_temp_dir, repo) = create_test_repo();
        let household = HouseholdId::new();
        let draft = Settlement::draft(household, jan());
        let id = draft.id;

        repo.transaction(|uow| uow.insert_draft(draft)).unwrap();
        repo.transaction(|uow| {
            let settlement = uow
                .get_mut(id)
                .ok_or_else(|| SettleError::settlement_not_found(id.to_string()))?;
            settlement
                .finalize(UserId::new(), Utc::now())
                .map_err(|e| SettleError::Conflict(e.to_string()))
        })
        .unwrap();

        let err = repo.transaction(|uow| uow.remove(id)).unwrap_err();
        assert!(err.is_conflict());
        assert!(repo.get(id).unwrap().unwrap().is_locked());
    }

    #[test]
    fn test_replace_draft_in_one_unit() {
        let (_temp_dir, repo) = create_test_repo();
        let household = HouseholdId::new();
        let first = Settlement::draft(household, jan());
        let first_id = first.id;
        repo.transaction(|uow| uow.insert_draft(first)).unwrap();

        let second = Settlement::draft(household, jan());
        let second_id = second.id;
        repo.transaction(|uow| {
            let old = uow.draft_for(household, jan()).map(|s| s.id);
            if let Some(old) = old {
                uow.remove(old)?;
            }
            uow.insert_draft(second)
        })
        .unwrap();

        assert!(repo.get(first_id).unwrap().is_none());
        assert!(repo.get(second_id).unwrap().is_some());
    }

    #[test]
    fn test_get_for_household_newest_first() {
        let (_temp_dir, repo) = create_test_repo();
        let household = HouseholdId::new();

        repo.transaction(|uow| {
            uow.insert_draft(Settlement::draft(household, jan()))?;
            uow.insert_draft(Settlement::draft(household, jan().next()))?;
            uow.insert_draft(Settlement::draft(HouseholdId::new(), jan()))
        })
        .unwrap();

        let list = repo.get_for_household(household).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].month, 2);
        assert_eq!(list[1].month, 1);
    }

    #[test]
    fn test_unit_of_work_reads_latest_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settlements.json");
        let household = HouseholdId::new();
        let writer = SettlementRepository::new(path.clone());
        let stale = SettlementRepository::new(path.clone());
        writer.load().unwrap();
        stale.load().unwrap();

        let draft = Settlement::draft(household, jan());
        let id = draft.id;
        writer.transaction(|uow| uow.insert_draft(draft)).unwrap();
        writer
            .transaction(|uow| {
                let settlement = uow
                    .get_mut(id)
                    .ok_or_else(|| SettleError::settlement_not_found(id.to_string()))?;
                settlement
                    .finalize(UserId::new(), Utc::now())
                    .map_err(|e| SettleError::Conflict(e.to_string()))
            })
            .unwrap();

        assert!(stale.get(id).unwrap().is_none());
        let err = stale
            .transaction(|uow| uow.insert_draft(Settlement::draft(household, jan())))
            .unwrap_err();
        assert!(err.is_conflict());
        assert!(stale.get(id).unwrap().unwrap().is_locked());

        let reloaded = SettlementRepository::new(path);
        reloaded.load().unwrap();
        let on_disk = reloaded.get_for_household(household).unwrap();
        assert_eq!(on_disk.len(), 1);
        assert!(on_disk[0].is_locked());
        assert!(temp_dir.path().join("settlements.json.lock").exists());
    }
}
