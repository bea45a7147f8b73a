//! Configuration for household-settle
//!
//! - XDG-compliant path resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::SettlePaths;
pub use settings::Settings;
