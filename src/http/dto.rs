//! Data Transfer Objects for the HTTP API.
//!
//! Most domain types already derive Serialize/Deserialize and are used
//! directly as request/response bodies; this module re-exports them and adds
//! the few request shapes that do not map one-to-one onto a domain type.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// Re-export existing types that are already serializable
pub use crate::api::{
    // Domain entities
    Building, Contract, LaundryBooking, RentPayment, Room, User,
    // Creation payloads
    NewBuilding, NewContract, NewRoom, NewUser,
    // Filters (usable straight from query strings)
    BookingFilter, ContractFilter, PaymentFilter,
    // Summaries
    AdminDashboard, RefreshOutcome, TenantDashboard,
    // Updates
    UserUpdate,
};

use crate::models::{BookingAction, BuildingId, NewBooking, UserId};

/// Request body for self-service registration. The created account is always
/// a tenant; staff accounts go through the user-management endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone_number: String,
}

impl From<RegisterRequest> for crate::models::NewUser {
    fn from(req: RegisterRequest) -> Self {
        Self {
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            phone_number: req.phone_number,
            role: crate::models::Role::Tenant,
        }
    }
}

/// Response for contract creation: the contract plus its generated payment
/// schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractCreatedResponse {
    pub contract: Contract,
    pub payments: Vec<RentPayment>,
}

/// Request body for creating a laundry booking. `user_id` is only honored
/// for staff callers; tenants always book for themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub booking_date: NaiveDate,
    pub time_slot: String,
}

impl CreateBookingRequest {
    /// Resolve into a [`NewBooking`], falling back to the caller for the
    /// booking owner.
    pub fn into_new_booking(self, caller: UserId) -> NewBooking {
        NewBooking {
            user_id: self.user_id.unwrap_or(caller),
            booking_date: self.booking_date,
            time_slot: self.time_slot,
        }
    }
}

/// Request body for a negotiation step on a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingActionRequest {
    /// One of `approve`, `reject`, `propose`, `accept`, `counter_propose`.
    pub action: String,
    /// Offered date, required for `propose` and `counter_propose`.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Offered slot, required for `propose` and `counter_propose`.
    #[serde(default)]
    pub time_slot: Option<String>,
    /// Rejection reason, required for `reject`.
    #[serde(default)]
    pub comment: Option<String>,
}

impl BookingActionRequest {
    pub fn into_action(self) -> Result<BookingAction, String> {
        match self.action.as_str() {
            "approve" => Ok(BookingAction::Approve),
            "accept" => Ok(BookingAction::Accept),
            "reject" => {
                let comment = self
                    .comment
                    .ok_or_else(|| "reject requires a comment".to_string())?;
                Ok(BookingAction::Reject { comment })
            }
            "propose" | "counter_propose" => {
                let date = self
                    .date
                    .ok_or_else(|| format!("{} requires a date", self.action))?;
                let time_slot = self
                    .time_slot
                    .ok_or_else(|| format!("{} requires a time_slot", self.action))?;
                if self.action == "propose" {
                    Ok(BookingAction::Propose { date, time_slot })
                } else {
                    Ok(BookingAction::CounterPropose { date, time_slot })
                }
            }
            other => Err(format!("unknown action '{}'", other)),
        }
    }
}

/// Request body for uploading a rent receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReceiptRequest {
    /// Path of the stored receipt image (jpg/jpeg/png/gif).
    pub receipt_path: String,
    #[serde(default)]
    pub user_comment: Option<String>,
}

/// Request body for approving a payment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApprovePaymentRequest {
    #[serde(default)]
    pub comment: Option<String>,
}

/// Request body for rejecting a payment. The comment is mandatory so the
/// tenant knows what to fix before resubmitting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectPaymentRequest {
    pub comment: String,
}

/// Query parameters for the room listing endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomsQuery {
    #[serde(default)]
    pub building_id: Option<BuildingId>,
    /// Keep only rooms with this occupancy state.
    #[serde(default)]
    pub occupied: Option<bool>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Database connection status
    pub database: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(action: &str) -> BookingActionRequest {
        BookingActionRequest {
            action: action.into(),
            date: None,
            time_slot: None,
            comment: None,
        }
    }

    #[test]
    fn test_simple_actions_resolve() {
        assert_eq!(request("approve").into_action(), Ok(BookingAction::Approve));
        assert_eq!(request("accept").into_action(), Ok(BookingAction::Accept));
    }

    #[test]
    fn test_reject_requires_comment() {
        assert!(request("reject").into_action().is_err());

        let mut req = request("reject");
        req.comment = Some("machine is down".into());
        assert_eq!(
            req.into_action(),
            Ok(BookingAction::Reject {
                comment: "machine is down".into()
            })
        );
    }

    #[test]
    fn test_propose_requires_date_and_slot() {
        assert!(request("propose").into_action().is_err());

        let mut req = request("counter_propose");
        req.date = NaiveDate::from_ymd_opt(2024, 6, 1);
        req.time_slot = Some("10:00-12:00".into());
        assert_eq!(
            req.into_action(),
            Ok(BookingAction::CounterPropose {
                date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                time_slot: "10:00-12:00".into()
            })
        );
    }

    #[test]
    fn test_unknown_action_rejected() {
        assert!(request("escalate").into_action().is_err());
    }
}
