//! CLI command handlers
//!
//! Bridges the clap argument parsing with the service layer.

pub mod settlement;

pub use settlement::{handle_settlement_command, SettlementCommands};
