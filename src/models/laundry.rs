//! Laundry bookings and the user/admin negotiation state machine.
//!
//! A booking alternates between the tenant and an admin until one side
//! accepts or the admin rejects:
//!
//! ```text
//! pending ──admin approve──► approved
//! pending ──admin reject───► rejected
//! pending ──admin propose──► proposed
//! proposed ──user accept──────────► approved
//! proposed ──user counter-propose─► counter_proposal
//! counter_proposal ──admin approve/reject/propose── (as pending)
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{BookingId, UserId};

/// Negotiation state of a laundry booking.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Tenant request awaiting admin review.
    Pending,
    /// Admin offered an alternative; tenant must respond.
    Proposed,
    /// Tenant countered the admin's offer; admin must respond.
    CounterProposal,
    /// Terminal: a date and slot were agreed.
    Approved,
    /// Terminal: the admin declined.
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Proposed => "proposed",
            BookingStatus::CounterProposal => "counter_proposal",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Approved | BookingStatus::Rejected)
    }

    /// Which side must act next, if any.
    pub fn pending_actor(&self) -> Option<Actor> {
        match self {
            BookingStatus::Pending | BookingStatus::CounterProposal => Some(Actor::Admin),
            BookingStatus::Proposed => Some(Actor::User),
            BookingStatus::Approved | BookingStatus::Rejected => None,
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "proposed" => Ok(BookingStatus::Proposed),
            "counter_proposal" => Ok(BookingStatus::CounterProposal),
            "approved" => Ok(BookingStatus::Approved),
            "rejected" => Ok(BookingStatus::Rejected),
            other => Err(format!("unknown booking status '{}'", other)),
        }
    }
}

/// Side of the negotiation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    User,
    Admin,
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Actor::User => "user",
            Actor::Admin => "admin",
        })
    }
}

impl std::str::FromStr for Actor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Actor::User),
            "admin" => Ok(Actor::Admin),
            other => Err(format!("unknown actor '{}'", other)),
        }
    }
}

/// A step in the negotiation. `Propose` and `CounterPropose` carry the
/// alternative date and slot being offered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingAction {
    Approve,
    Reject { comment: String },
    Propose { date: NaiveDate, time_slot: String },
    Accept,
    CounterPropose { date: NaiveDate, time_slot: String },
}

impl BookingAction {
    /// Which side is allowed to take this action.
    pub fn actor(&self) -> Actor {
        match self {
            BookingAction::Approve | BookingAction::Reject { .. } | BookingAction::Propose { .. } => {
                Actor::Admin
            }
            BookingAction::Accept | BookingAction::CounterPropose { .. } => Actor::User,
        }
    }
}

/// A laundry slot booking under negotiation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaundryBooking {
    pub id: BookingId,
    pub user_id: UserId,
    /// The date currently on the table (tenant's request, or the last
    /// adopted offer).
    pub booking_date: NaiveDate,
    pub time_slot: String,
    pub status: BookingStatus,
    /// Standing offer from the other side, when one exists.
    pub proposed_date: Option<NaiveDate>,
    pub proposed_time_slot: Option<String>,
    /// Who moved last; the other side moves next.
    pub last_action_by: Option<Actor>,
    pub admin_comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Negotiation error: the action is not legal in the booking's current state.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct IllegalBookingAction(pub String);

impl LaundryBooking {
    /// Apply a negotiation step, returning the updated booking.
    ///
    /// Enforces the transition table and turn alternation; approvals and
    /// acceptances adopt the standing offer into `booking_date`/`time_slot`
    /// and clear the proposal fields.
    pub fn apply(&self, actor: Actor, action: BookingAction) -> Result<LaundryBooking, IllegalBookingAction> {
        if action.actor() != actor {
            return Err(IllegalBookingAction(format!(
                "action not available to {}",
                actor
            )));
        }
        if self.status.is_terminal() {
            return Err(IllegalBookingAction(format!(
                "booking is already {}",
                self.status
            )));
        }
        if self.status.pending_actor() != Some(actor) {
            return Err(IllegalBookingAction(format!(
                "booking in status '{}' is not waiting on {}",
                self.status, actor
            )));
        }

        let mut next = self.clone();
        next.last_action_by = Some(actor);

        match (self.status, action) {
            // Admin's turn: pending and counter_proposal accept the same moves.
            (BookingStatus::Pending | BookingStatus::CounterProposal, BookingAction::Approve) => {
                // Adopt the tenant's counter when one is on the table.
                if let (Some(date), Some(slot)) = (self.proposed_date, self.proposed_time_slot.clone()) {
                    next.booking_date = date;
                    next.time_slot = slot;
                }
                next.proposed_date = None;
                next.proposed_time_slot = None;
                next.status = BookingStatus::Approved;
            }
            (
                BookingStatus::Pending | BookingStatus::CounterProposal,
                BookingAction::Reject { comment },
            ) => {
                next.admin_comment = Some(comment);
                next.proposed_date = None;
                next.proposed_time_slot = None;
                next.status = BookingStatus::Rejected;
            }
            (
                BookingStatus::Pending | BookingStatus::CounterProposal,
                BookingAction::Propose { date, time_slot },
            ) => {
                next.proposed_date = Some(date);
                next.proposed_time_slot = Some(time_slot);
                next.status = BookingStatus::Proposed;
            }
            // Tenant's turn.
            (BookingStatus::Proposed, BookingAction::Accept) => {
                if let (Some(date), Some(slot)) = (self.proposed_date, self.proposed_time_slot.clone()) {
                    next.booking_date = date;
                    next.time_slot = slot;
                }
                next.proposed_date = None;
                next.proposed_time_slot = None;
                next.status = BookingStatus::Approved;
            }
            (BookingStatus::Proposed, BookingAction::CounterPropose { date, time_slot }) => {
                next.proposed_date = Some(date);
                next.proposed_time_slot = Some(time_slot);
                next.status = BookingStatus::CounterProposal;
            }
            (status, action) => {
                return Err(IllegalBookingAction(format!(
                    "action {:?} not permitted in status '{}'",
                    action, status
                )));
            }
        }

        Ok(next)
    }
}

/// Fields for creating a booking request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBooking {
    pub user_id: UserId,
    pub booking_date: NaiveDate,
    pub time_slot: String,
}

impl NewBooking {
    pub fn validate(&self) -> Result<(), String> {
        if self.time_slot.trim().is_empty() {
            return Err("time slot must not be empty".into());
        }
        Ok(())
    }
}
