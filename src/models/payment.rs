//! Rent payments and their approval lifecycle.
//!
//! One `RentPayment` row exists per contract per calendar month. The status
//! walks a fixed graph:
//!
//! ```text
//! upcoming ──(month passes)──► overdue ──(receipt)──► pending_review
//! pending_review ──► approved | rejected
//! rejected ──(status refresh)──► overdue
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ContractId, PaymentId};
use super::month::PaymentMonth;

/// Approval status of a monthly rent payment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RentPaymentStatus {
    /// Month not yet due.
    Upcoming,
    /// Month due with no accepted receipt.
    Overdue,
    /// Receipt uploaded, awaiting admin review.
    PendingReview,
    /// Admin accepted the receipt.
    Approved,
    /// Admin rejected the receipt; reverts to overdue on refresh.
    Rejected,
}

impl RentPaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RentPaymentStatus::Upcoming => "upcoming",
            RentPaymentStatus::Overdue => "overdue",
            RentPaymentStatus::PendingReview => "pending_review",
            RentPaymentStatus::Approved => "approved",
            RentPaymentStatus::Rejected => "rejected",
        }
    }

    /// Whether `self → next` is a legal lifecycle edge.
    pub fn can_transition_to(&self, next: RentPaymentStatus) -> bool {
        use RentPaymentStatus::*;
        matches!(
            (*self, next),
            (Upcoming, Overdue)
                | (Overdue, PendingReview)
                | (PendingReview, Approved)
                | (PendingReview, Rejected)
                | (Rejected, Overdue)
        )
    }

    /// Statuses that count against a tenant's standing for months already due.
    pub fn is_outstanding(&self) -> bool {
        matches!(
            self,
            RentPaymentStatus::Overdue | RentPaymentStatus::PendingReview | RentPaymentStatus::Rejected
        )
    }
}

impl std::fmt::Display for RentPaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RentPaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(RentPaymentStatus::Upcoming),
            "overdue" => Ok(RentPaymentStatus::Overdue),
            "pending_review" => Ok(RentPaymentStatus::PendingReview),
            "approved" => Ok(RentPaymentStatus::Approved),
            "rejected" => Ok(RentPaymentStatus::Rejected),
            other => Err(format!("unknown rent payment status '{}'", other)),
        }
    }
}

/// One month of rent for a contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentPayment {
    pub id: PaymentId,
    pub contract_id: ContractId,
    pub month: PaymentMonth,
    pub status: RentPaymentStatus,
    /// Date the tenant uploaded the receipt.
    pub payment_date: Option<NaiveDate>,
    /// Storage path of the uploaded receipt image.
    pub receipt_path: Option<String>,
    pub admin_comment: Option<String>,
    pub user_comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a payment row (used by schedule generation).
#[derive(Debug, Clone)]
pub struct NewRentPayment {
    pub contract_id: ContractId,
    pub month: PaymentMonth,
    pub status: RentPaymentStatus,
}

/// Partial update of a payment row; `None` leaves the field unchanged.
///
/// Comments are `Option<Option<_>>` so callers can clear them explicitly.
#[derive(Debug, Clone, Default)]
pub struct RentPaymentUpdate {
    pub status: Option<RentPaymentStatus>,
    pub payment_date: Option<Option<NaiveDate>>,
    pub receipt_path: Option<Option<String>>,
    pub admin_comment: Option<Option<String>>,
    pub user_comment: Option<Option<String>>,
}

/// Build the payment schedule for a contract: one row per calendar month
/// from `start` through `end`, inclusive. Months strictly before the current
/// month start out overdue, the rest upcoming.
pub fn generate_schedule(
    contract_id: ContractId,
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> Vec<NewRentPayment> {
    let current = PaymentMonth::from_date(today);
    PaymentMonth::from_date(start)
        .months_through(PaymentMonth::from_date(end))
        .into_iter()
        .map(|month| NewRentPayment {
            contract_id,
            month,
            status: if month < current {
                RentPaymentStatus::Overdue
            } else {
                RentPaymentStatus::Upcoming
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_three_month_contract_yields_three_rows() {
        let id = ContractId::random();
        let rows = generate_schedule(id, date(2024, 1, 1), date(2024, 3, 31), date(2024, 1, 10));
        assert_eq!(rows.len(), 3);
        let months: Vec<String> = rows.iter().map(|r| r.month.to_string()).collect();
        assert_eq!(months, vec!["2024-01", "2024-02", "2024-03"]);
    }

    #[test]
    fn test_past_months_start_overdue() {
        let id = ContractId::random();
        let rows = generate_schedule(id, date(2024, 1, 1), date(2024, 4, 30), date(2024, 3, 15));
        let statuses: Vec<RentPaymentStatus> = rows.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![
                RentPaymentStatus::Overdue,
                RentPaymentStatus::Overdue,
                RentPaymentStatus::Upcoming, // current month is not yet overdue
                RentPaymentStatus::Upcoming,
            ]
        );
    }

    #[test]
    fn test_mid_month_dates_still_cover_every_month() {
        let id = ContractId::random();
        let rows = generate_schedule(id, date(2024, 1, 15), date(2024, 3, 10), date(2024, 1, 1));
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_transition_table_matches_lifecycle() {
        use RentPaymentStatus::*;
        assert!(Upcoming.can_transition_to(Overdue));
        assert!(Overdue.can_transition_to(PendingReview));
        assert!(PendingReview.can_transition_to(Approved));
        assert!(PendingReview.can_transition_to(Rejected));
        assert!(Rejected.can_transition_to(Overdue));

        assert!(!Upcoming.can_transition_to(Approved));
        assert!(!Overdue.can_transition_to(Approved));
        assert!(!Approved.can_transition_to(Overdue));
        assert!(!Rejected.can_transition_to(PendingReview));
        assert!(!PendingReview.can_transition_to(Overdue));
    }

    #[test]
    fn test_status_string_roundtrip() {
        use RentPaymentStatus::*;
        for status in [Upcoming, Overdue, PendingReview, Approved, Rejected] {
            assert_eq!(status.as_str().parse::<RentPaymentStatus>().unwrap(), status);
        }
    }
}
