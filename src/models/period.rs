//! Calendar month a settlement covers

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Validation errors for settlement months
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    InvalidMonth(u32),
    InvalidYear(i32),
    InvalidFormat(String),
}

impl fmt::Display for PeriodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMonth(m) => write!(f, "Month must be between 1 and 12, got {}", m),
            Self::InvalidYear(y) => write!(f, "Year must be between 1 and 9999, got {}", y),
            Self::InvalidFormat(s) => write!(f, "Invalid month '{}', expected YYYY-MM", s),
        }
    }
}

impl std::error::Error for PeriodError {}

/// A (year, month) pair, validated on construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SettlementMonth {
    year: i32,
    month: u32,
}

impl SettlementMonth {
    /// Create a month, rejecting out-of-range values
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodError::InvalidMonth(month));
        }
        if !(1..=9999).contains(&year) {
            return Err(PeriodError::InvalidYear(year));
        }
        Ok(Self { year, month })
    }

    /// The month containing the given date
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The current month in local time
    pub fn current() -> Self {
        Self::of(chrono::Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Check if a date falls within this month
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Check if a (year, month) pair stored on a record refers to this month
    pub fn matches(&self, year: i32, month: u32) -> bool {
        self.year == year && self.month == month
    }

    /// The previous calendar month
    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// The next calendar month
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for SettlementMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for SettlementMonth {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| PeriodError::InvalidFormat(s.to_string()))?;

        let year: i32 = year
            .parse()
            .map_err(|_| PeriodError::InvalidFormat(s.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| PeriodError::InvalidFormat(s.to_string()))?;

        Self::new(year, month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_month() {
        assert!(SettlementMonth::new(2025, 1).is_ok());
        assert!(SettlementMonth::new(2025, 12).is_ok());
        assert_eq!(
            SettlementMonth::new(2025, 13),
            Err(PeriodError::InvalidMonth(13))
        );
        assert_eq!(
            SettlementMonth::new(2025, 0),
            Err(PeriodError::InvalidMonth(0))
        );
    }

    #[test]
    fn test_contains() {
        let jan = SettlementMonth::new(2025, 1).unwrap();
        assert!(jan.contains(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
        assert!(jan.contains(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()));
        assert!(!jan.contains(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()));
        assert!(!jan.contains(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()));
    }

    #[test]
    fn test_parse_and_display() {
        let month: SettlementMonth = "2025-03".parse().unwrap();
        assert_eq!(month.year(), 2025);
        assert_eq!(month.month(), 3);
        assert_eq!(month.to_string(), "2025-03");

        assert!("2025/03".parse::<SettlementMonth>().is_err());
        assert!("2025-3x".parse::<SettlementMonth>().is_err());
        assert!("2025-13".parse::<SettlementMonth>().is_err());
    }

    #[test]
    fn test_navigation_wraps_years() {
        let dec = SettlementMonth::new(2024, 12).unwrap();
        assert_eq!(dec.next(), SettlementMonth::new(2025, 1).unwrap());
        assert_eq!(dec.next().prev(), dec);
    }

    #[test]
    fn test_ordering() {
        let a = SettlementMonth::new(2024, 12).unwrap();
        let b = SettlementMonth::new(2025, 1).unwrap();
        assert!(a < b);
    }
}
