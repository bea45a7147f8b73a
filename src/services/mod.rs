//! Service layer for household-settle
//!
//! Business logic on top of the storage layer: ledger reads, the settlement
//! engine, the DRAFT/FINALIZED lifecycle and its audit trail.

pub mod settlement;

pub use settlement::SettlementService;
