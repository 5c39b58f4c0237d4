//! Dashboard summaries for staff and tenants.

use chrono::Utc;

use super::{ServiceError, ServiceResult};
use crate::api::{
    AdminDashboard, BookingFilter, ContractFilter, PaymentFilter, TenantDashboard,
};
use crate::db::repository::FullRepository;
use crate::models::{BookingStatus, RentPaymentStatus, User};

/// Counters for the staff landing page.
pub async fn admin_dashboard(
    repo: &dyn FullRepository,
    actor: &User,
) -> ServiceResult<AdminDashboard> {
    if !actor.is_admin() {
        return Err(ServiceError::forbidden("staff only"));
    }
    let today = Utc::now().date_naive();

    let users = repo.list_users().await?;
    let buildings = repo.list_buildings().await?;
    let rooms = repo.list_rooms(None).await?;
    let active_contracts = repo
        .list_contracts(ContractFilter {
            active_on: Some(today),
            ..Default::default()
        })
        .await?;
    let overdue = repo
        .list_payments(PaymentFilter {
            status: Some(RentPaymentStatus::Overdue),
            ..Default::default()
        })
        .await?;
    let pending_review = repo
        .list_payments(PaymentFilter {
            status: Some(RentPaymentStatus::PendingReview),
            ..Default::default()
        })
        .await?;
    let bookings = repo.list_bookings(BookingFilter::default()).await?;

    Ok(AdminDashboard {
        total_users: users.len(),
        total_buildings: buildings.len(),
        total_rooms: rooms.len(),
        occupied_rooms: rooms.iter().filter(|r| r.is_occupied).count(),
        active_contracts: active_contracts.len(),
        overdue_payments: overdue.len(),
        payments_pending_review: pending_review.len(),
        bookings_awaiting_admin: bookings
            .iter()
            .filter(|b| {
                matches!(
                    b.status,
                    BookingStatus::Pending | BookingStatus::CounterProposal
                )
            })
            .count(),
    })
}

/// Summary of the actor's own tenancy.
pub async fn tenant_dashboard(
    repo: &dyn FullRepository,
    actor: &User,
) -> ServiceResult<TenantDashboard> {
    let today = Utc::now().date_naive();

    let active_contract = repo
        .list_contracts(ContractFilter {
            user_id: Some(actor.id),
            active_on: Some(today),
            ..Default::default()
        })
        .await?
        .into_iter()
        .next();

    let payments = repo
        .list_payments(PaymentFilter {
            user_id: Some(actor.id),
            ..Default::default()
        })
        .await?;
    let overdue_payments = payments.iter().filter(|p| p.status.is_outstanding()).count();
    // Earliest month still waiting on the tenant.
    let next_payment = payments
        .iter()
        .filter(|p| {
            matches!(
                p.status,
                RentPaymentStatus::Overdue
                    | RentPaymentStatus::Rejected
                    | RentPaymentStatus::Upcoming
            )
        })
        .min_by_key(|p| p.month)
        .cloned();

    let upcoming_bookings = repo
        .list_bookings(BookingFilter {
            user_id: Some(actor.id),
            ..Default::default()
        })
        .await?
        .into_iter()
        .filter(|b| b.booking_date >= today && b.status != BookingStatus::Rejected)
        .collect();

    Ok(TenantDashboard {
        active_contract,
        overdue_payments,
        next_payment,
        upcoming_bookings,
    })
}
