//! Path management for household-settle
//!
//! ## Path Resolution Order
//!
//! 1. `SETTLE_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/household-settle` or `~/.config/household-settle`
//! 3. Windows: `%APPDATA%\household-settle`

use std::path::PathBuf;

use crate::error::{SettleError, SettleResult};

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "SETTLE_DATA_DIR";

const APP_DIR: &str = "household-settle";

/// Manages all paths used by household-settle
#[derive(Debug, Clone)]
pub struct SettlePaths {
    base_dir: PathBuf,
}

impl SettlePaths {
    /// Resolve the base directory from the environment
    ///
    /// # Errors
    ///
    /// Returns a config error if no home or config directory can be found.
    pub fn new() -> SettleResult<Self> {
        let base_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create paths rooted at a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Ledger and settlement data (`<base>/data/`)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    pub fn transactions_file(&self) -> PathBuf {
        self.data_dir().join("transactions.json")
    }

    pub fn incomes_file(&self) -> PathBuf {
        self.data_dir().join("incomes.json")
    }

    pub fn policies_file(&self) -> PathBuf {
        self.data_dir().join("policies.json")
    }

    pub fn members_file(&self) -> PathBuf {
        self.data_dir().join("members.json")
    }

    pub fn settlements_file(&self) -> PathBuf {
        self.data_dir().join("settlements.json")
    }

    /// Create the base and data directories if missing
    pub fn ensure_directories(&self) -> SettleResult<()> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| SettleError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| SettleError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }
}

/// Resolve the default base directory for this platform
#[cfg(not(windows))]
fn resolve_default_path() -> SettleResult<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(xdg).join(APP_DIR));
    }
    let dirs = directories::BaseDirs::new()
        .ok_or_else(|| SettleError::Config("Could not determine home directory".into()))?;
    Ok(dirs.home_dir().join(".config").join(APP_DIR))
}

/// Resolve the default base directory for this platform
#[cfg(windows)]
fn resolve_default_path() -> SettleResult<PathBuf> {
    let dirs = directories::BaseDirs::new()
        .ok_or_else(|| SettleError::Config("Could not determine APPDATA directory".into()))?;
    Ok(dirs.config_dir().join(APP_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SettlePaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SettlePaths::with_base_dir(temp_dir.path().join("nested"));

        paths.ensure_directories().unwrap();

        assert!(paths.base_dir().exists());
        assert!(paths.data_dir().exists());
    }

    #[test]
    fn test_file_paths() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SettlePaths::with_base_dir(temp_dir.path().to_path_buf());
        let data = temp_dir.path().join("data");

        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(paths.audit_log(), temp_dir.path().join("audit.log"));
        assert_eq!(paths.transactions_file(), data.join("transactions.json"));
        assert_eq!(paths.incomes_file(), data.join("incomes.json"));
        assert_eq!(paths.policies_file(), data.join("policies.json"));
        assert_eq!(paths.members_file(), data.join("members.json"));
        assert_eq!(paths.settlements_file(), data.join("settlements.json"));
    }
}
