//! Display formatting for terminal output

pub mod settlement;

pub use settlement::{
    format_breakdown, format_settlement_details, format_settlement_list, MemberNames,
};
