//! Calendar-month scalar used to key rent payments.
//!
//! Rent is tracked per calendar month. `PaymentMonth` is a small `Copy`
//! value ordered chronologically and rendered as `YYYY-MM`, which is also
//! the storage format (text ordering and chronological ordering agree).

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// A calendar month (year + month), e.g. `2024-03`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PaymentMonth {
    year: i32,
    month: u32,
}

impl PaymentMonth {
    /// Create a month; `month` must be in 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The month a given date falls in.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First day of the month.
    pub fn first_day(&self) -> NaiveDate {
        // year/month are validated on construction, so this cannot fail
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap()
    }

    /// The following calendar month.
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

    /// All months from `self` through `end`, inclusive. Empty if `end < self`.
    pub fn months_through(&self, end: PaymentMonth) -> Vec<PaymentMonth> {
        let mut out = Vec::new();
        let mut current = *self;
        while current <= end {
            out.push(current);
            current = current.next();
        }
        out
    }
}

impl fmt::Display for PaymentMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PaymentMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("invalid month '{}': expected YYYY-MM", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("invalid year in month '{}'", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("invalid month number in '{}'", s))?;
        PaymentMonth::new(year, month).ok_or_else(|| format!("month out of range in '{}'", s))
    }
}

impl Serialize for PaymentMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PaymentMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_month() {
        let m = PaymentMonth::new(2024, 3).unwrap();
        assert_eq!(m.to_string(), "2024-03");
    }

    #[test]
    fn test_parse_roundtrip() {
        let m: PaymentMonth = "2024-11".parse().unwrap();
        assert_eq!(m, PaymentMonth::new(2024, 11).unwrap());
        assert_eq!(m.to_string(), "2024-11");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("2024".parse::<PaymentMonth>().is_err());
        assert!("2024-13".parse::<PaymentMonth>().is_err());
        assert!("2024-00".parse::<PaymentMonth>().is_err());
        assert!("abcd-01".parse::<PaymentMonth>().is_err());
    }

    #[test]
    fn test_next_wraps_year() {
        let dec = PaymentMonth::new(2023, 12).unwrap();
        assert_eq!(dec.next(), PaymentMonth::new(2024, 1).unwrap());
    }

    #[test]
    fn test_ordering_matches_text_ordering() {
        let a = PaymentMonth::new(2023, 12).unwrap();
        let b = PaymentMonth::new(2024, 1).unwrap();
        assert!(a < b);
        assert!(a.to_string() < b.to_string());
    }

    #[test]
    fn test_months_through_inclusive() {
        let start = PaymentMonth::new(2024, 1).unwrap();
        let end = PaymentMonth::new(2024, 3).unwrap();
        let months = start.months_through(end);
        assert_eq!(months.len(), 3);
        assert_eq!(months[0].to_string(), "2024-01");
        assert_eq!(months[2].to_string(), "2024-03");
    }

    #[test]
    fn test_months_through_empty_when_reversed() {
        let start = PaymentMonth::new(2024, 3).unwrap();
        let end = PaymentMonth::new(2024, 1).unwrap();
        assert!(start.months_through(end).is_empty());
    }

    #[test]
    fn test_from_date() {
        let d = NaiveDate::from_ymd_opt(2024, 7, 19).unwrap();
        assert_eq!(PaymentMonth::from_date(d).to_string(), "2024-07");
    }
}
