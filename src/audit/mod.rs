//! Audit logging for settlements
//!
//! Every settlement lifecycle change is appended to `audit.log` as one JSON
//! line with before/after snapshots:
//!
//! - a draft is created on every run (`create`)
//! - the previous draft for the month is replaced (`delete`)
//! - a draft is finalized (`update`, with the acting member and a field diff)
//!
//! # Example
//!
//! ```rust,ignore
//! let logger = AuditLogger::new(paths.audit_log());
//! let entry = AuditEntry::create(
//!     EntityType::Settlement,
//!     settlement.id.to_string(),
//!     settlement.household_id,
//!     Some(settlement.period()),
//!     &settlement,
//! );
//! logger.log(&entry)?;
//! ```

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
