//! household-settle - monthly household expense settlement
//!
//! Splits a household's shared expenses between members in proportion to
//! their income, folds in personal expenses one member paid for another, and
//! nets every member's balance into a short list of transfers. Each month's
//! result is stored as a DRAFT that can be rerun freely until an admin
//! finalizes it.
//!
//! # Architecture
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Ledger and settlement data models
//! - `engine`: Pure settlement computation (weights, apportionment, netting)
//! - `storage`: JSON file storage layer
//! - `services`: Settlement lifecycle on top of storage
//! - `audit`: Audit logging system
//! - `cli` / `display`: Command handlers and terminal formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use household_settle::config::paths::SettlePaths;
//! use household_settle::services::SettlementService;
//! use household_settle::storage::Storage;
//!
//! let storage = Storage::new(SettlePaths::new()?)?;
//! storage.load_all()?;
//! let draft = SettlementService::new(&storage).run_settlement(household, "2025-01".parse()?)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{SettleError, SettleResult};
