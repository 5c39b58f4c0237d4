//! Laundry booking negotiation.

use chrono::Utc;
use tracing::info;

use super::{ServiceError, ServiceResult};
use crate::api::BookingFilter;
use crate::db::repository::FullRepository;
use crate::models::{
    Actor, BookingAction, BookingId, BookingStatus, LaundryBooking, NewBooking, User,
};

/// Tenants book slots for themselves; staff may book on a tenant's behalf.
pub async fn create_booking(
    repo: &dyn FullRepository,
    actor: &User,
    mut new_booking: NewBooking,
) -> ServiceResult<LaundryBooking> {
    if !actor.is_admin() {
        new_booking.user_id = actor.id;
    }
    new_booking.validate().map_err(ServiceError::Validation)?;
    if new_booking.booking_date < Utc::now().date_naive() {
        return Err(ServiceError::validation("booking date is in the past"));
    }
    let booking = repo.create_booking(new_booking).await?;
    info!(booking_id = %booking.id, user_id = %booking.user_id, date = %booking.booking_date, "created laundry booking");
    Ok(booking)
}

pub async fn list_bookings(
    repo: &dyn FullRepository,
    actor: &User,
    mut filter: BookingFilter,
) -> ServiceResult<Vec<LaundryBooking>> {
    if !actor.is_admin() {
        filter.user_id = Some(actor.id);
    }
    Ok(repo.list_bookings(filter).await?)
}

pub async fn get_booking(
    repo: &dyn FullRepository,
    actor: &User,
    id: BookingId,
) -> ServiceResult<LaundryBooking> {
    let booking = repo.get_booking(id).await?;
    if !actor.is_admin() && booking.user_id != actor.id {
        return Err(ServiceError::NotFound("booking not found".into()));
    }
    Ok(booking)
}

/// Take one negotiation step on a booking.
///
/// The actor's side is derived from their role; the booking state machine
/// rejects out-of-turn or out-of-state moves.
pub async fn act_on_booking(
    repo: &dyn FullRepository,
    actor: &User,
    id: BookingId,
    action: BookingAction,
) -> ServiceResult<LaundryBooking> {
    let booking = repo.get_booking(id).await?;
    let side = if actor.is_admin() {
        Actor::Admin
    } else {
        if booking.user_id != actor.id {
            return Err(ServiceError::NotFound("booking not found".into()));
        }
        Actor::User
    };

    let updated = booking
        .apply(side, action)
        .map_err(|e| ServiceError::Conflict(e.to_string()))?;
    let saved = repo.save_booking(updated).await?;
    info!(booking_id = %id, status = %saved.status, by = %side, "booking negotiation step");
    Ok(saved)
}

/// Tenants may cancel their own booking while it is still being negotiated;
/// staff may delete any booking.
pub async fn delete_booking(
    repo: &dyn FullRepository,
    actor: &User,
    id: BookingId,
) -> ServiceResult<()> {
    let booking = repo.get_booking(id).await?;
    if !actor.is_admin() {
        if booking.user_id != actor.id {
            return Err(ServiceError::NotFound("booking not found".into()));
        }
        if booking.status == BookingStatus::Approved {
            return Err(ServiceError::Conflict(
                "approved bookings can only be cancelled by staff".into(),
            ));
        }
    }
    repo.delete_booking(id).await?;
    info!(booking_id = %id, "deleted laundry booking");
    Ok(())
}
