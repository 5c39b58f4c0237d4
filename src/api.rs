//! Public API surface for the rental backend.
//!
//! This file consolidates the domain types and the filter/summary types
//! shared between the service layer and the HTTP API. All types derive
//! Serialize/Deserialize for JSON serialization.

pub use crate::models::contract::{Contract, NewContract};
pub use crate::models::ids::{BookingId, BuildingId, ContractId, PaymentId, RoomId, UserId};
pub use crate::models::laundry::{
    Actor, BookingAction, BookingStatus, LaundryBooking, NewBooking,
};
pub use crate::models::month::PaymentMonth;
pub use crate::models::payment::{NewRentPayment, RentPayment, RentPaymentStatus};
pub use crate::models::property::{Building, NewBuilding, NewRoom, Room};
pub use crate::models::user::{NewUser, Role, User, UserUpdate};

use serde::{Deserialize, Serialize};

/// Filter for listing rent payments.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentFilter {
    /// Restrict to payments of contracts held by this tenant.
    pub user_id: Option<UserId>,
    pub contract_id: Option<ContractId>,
    pub status: Option<RentPaymentStatus>,
    /// Inclusive month bounds, e.g. `2024-01`.
    pub from_month: Option<PaymentMonth>,
    pub to_month: Option<PaymentMonth>,
}

/// Filter for listing laundry bookings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingFilter {
    pub user_id: Option<UserId>,
    pub status: Option<BookingStatus>,
}

/// Filter for listing contracts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractFilter {
    pub user_id: Option<UserId>,
    pub room_id: Option<RoomId>,
    /// Only contracts active on this date.
    pub active_on: Option<chrono::NaiveDate>,
}

/// Admin dashboard counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminDashboard {
    pub total_users: usize,
    pub total_buildings: usize,
    pub total_rooms: usize,
    pub occupied_rooms: usize,
    pub active_contracts: usize,
    pub overdue_payments: usize,
    pub payments_pending_review: usize,
    pub bookings_awaiting_admin: usize,
}

/// Tenant dashboard summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantDashboard {
    pub active_contract: Option<Contract>,
    pub overdue_payments: usize,
    pub next_payment: Option<RentPayment>,
    pub upcoming_bookings: Vec<LaundryBooking>,
}

/// Outcome of a payment status refresh sweep.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RefreshOutcome {
    /// Upcoming rows whose month has passed, now overdue.
    pub marked_overdue: usize,
    /// Rejected rows reverted to overdue for re-submission.
    pub reverted_rejected: usize,
}
