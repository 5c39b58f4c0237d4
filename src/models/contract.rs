//! Lease contracts.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ContractId, RoomId, UserId};

/// A lease contract binding a tenant to a room for a date range.
///
/// Invariant (enforced by the repositories under a room lock): at most one
/// contract per room whose `[start_date, end_date]` range overlaps another's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub user_id: UserId,
    pub room_id: RoomId,
    pub start_date: NaiveDate,
    /// Inclusive end of the lease.
    pub end_date: NaiveDate,
    /// Monthly rent in cents.
    pub rent_cents: i64,
    /// Deposit in cents.
    pub deposit_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Contract {
    /// Whether this contract's date range overlaps `[start, end]`.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }

    /// A contract is active on `date` if the range contains it.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Fields for creating a contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContract {
    pub user_id: UserId,
    pub room_id: RoomId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rent_cents: i64,
    pub deposit_cents: i64,
}

impl NewContract {
    pub fn validate(&self) -> Result<(), String> {
        if self.end_date < self.start_date {
            return Err("contract end date must not precede its start date".to_string());
        }
        if self.rent_cents < 0 || self.deposit_cents < 0 {
            return Err("amounts must not be negative".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn contract(start: NaiveDate, end: NaiveDate) -> Contract {
        Contract {
            id: ContractId::random(),
            user_id: UserId::random(),
            room_id: RoomId::random(),
            start_date: start,
            end_date: end,
            rent_cents: 50_000,
            deposit_cents: 100_000,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_overlap_detection() {
        let c = contract(date(2024, 1, 1), date(2024, 6, 30));
        // Overlapping ranges
        assert!(c.overlaps(date(2024, 6, 30), date(2024, 12, 31)));
        assert!(c.overlaps(date(2023, 12, 1), date(2024, 1, 1)));
        assert!(c.overlaps(date(2024, 2, 1), date(2024, 3, 1)));
        // Disjoint ranges
        assert!(!c.overlaps(date(2024, 7, 1), date(2024, 12, 31)));
        assert!(!c.overlaps(date(2023, 1, 1), date(2023, 12, 31)));
    }

    #[test]
    fn test_new_contract_validation() {
        let bad = NewContract {
            user_id: UserId::random(),
            room_id: RoomId::random(),
            start_date: date(2024, 5, 1),
            end_date: date(2024, 4, 1),
            rent_cents: 50_000,
            deposit_cents: 0,
        };
        assert!(bad.validate().is_err());
    }
}
