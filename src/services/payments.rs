//! Rent payment review workflow.
//!
//! Tenants upload a receipt for the earliest unpaid month; staff approve or
//! reject it. Rejected receipts fall back to overdue on the next status
//! refresh so the tenant can resubmit.

use chrono::{NaiveDate, Utc};
use tracing::info;

use super::{ServiceError, ServiceResult};
use crate::api::{PaymentFilter, RefreshOutcome};
use crate::db::repository::FullRepository;
use crate::models::uploads::validate_image_path;
use crate::models::{
    PaymentId, PaymentMonth, RentPayment, RentPaymentStatus, RentPaymentUpdate, User,
};

/// Staff see every payment; tenants only those of their own contracts.
pub async fn list_payments(
    repo: &dyn FullRepository,
    actor: &User,
    mut filter: PaymentFilter,
) -> ServiceResult<Vec<RentPayment>> {
    if !actor.is_admin() {
        filter.user_id = Some(actor.id);
    }
    Ok(repo.list_payments(filter).await?)
}

pub async fn get_payment(
    repo: &dyn FullRepository,
    actor: &User,
    id: PaymentId,
) -> ServiceResult<RentPayment> {
    let payment = repo.get_payment(id).await?;
    if !actor.is_admin() {
        let contract = repo.get_contract(payment.contract_id).await?;
        if contract.user_id != actor.id {
            return Err(ServiceError::NotFound("payment not found".into()));
        }
    }
    Ok(payment)
}

/// A month counts as payable when it is due and every earlier month of the
/// contract has been settled or is at least under review.
fn check_payable(
    payment: &RentPayment,
    siblings: &[RentPayment],
    today: NaiveDate,
) -> ServiceResult<()> {
    let current = PaymentMonth::from_date(today);

    // An upcoming row whose month has passed is effectively overdue even if
    // no refresh sweep has run yet.
    let effective = match payment.status {
        RentPaymentStatus::Upcoming if payment.month < current => RentPaymentStatus::Overdue,
        status => status,
    };

    match effective {
        RentPaymentStatus::Overdue => {}
        RentPaymentStatus::Upcoming if payment.month <= current => {}
        RentPaymentStatus::Upcoming => {
            return Err(ServiceError::validation(
                "this month is not due yet",
            ));
        }
        RentPaymentStatus::PendingReview => {
            return Err(ServiceError::Conflict(
                "a receipt for this month is already under review".into(),
            ));
        }
        RentPaymentStatus::Approved => {
            return Err(ServiceError::Conflict(
                "this month is already paid".into(),
            ));
        }
        RentPaymentStatus::Rejected => {
            // rejected -> pending_review is not a legal edge; the status
            // refresh reverts the month to overdue first.
            return Err(ServiceError::validation(
                "a rejected payment cannot move straight back to review; \
                 run the status refresh to revert it to overdue, then resubmit",
            ));
        }
    }

    // No skipped months: everything earlier must be approved or in review.
    let skipped = siblings.iter().any(|p| {
        p.month < payment.month
            && !matches!(
                p.status,
                RentPaymentStatus::Approved | RentPaymentStatus::PendingReview
            )
    });
    if skipped {
        return Err(ServiceError::validation(
            "earlier months are unpaid; pay them first",
        ));
    }
    Ok(())
}

/// Tenant uploads a receipt for one month of rent.
pub async fn upload_receipt(
    repo: &dyn FullRepository,
    actor: &User,
    id: PaymentId,
    receipt_path: String,
    user_comment: Option<String>,
) -> ServiceResult<RentPayment> {
    let payment = repo.get_payment(id).await?;
    let contract = repo.get_contract(payment.contract_id).await?;
    if !actor.is_admin() && contract.user_id != actor.id {
        return Err(ServiceError::NotFound("payment not found".into()));
    }
    validate_image_path(&receipt_path).map_err(ServiceError::Validation)?;

    let today = Utc::now().date_naive();
    let siblings = repo
        .list_payments(PaymentFilter {
            contract_id: Some(payment.contract_id),
            ..Default::default()
        })
        .await?;
    check_payable(&payment, &siblings, today)?;

    let updated = repo
        .update_payment(
            id,
            RentPaymentUpdate {
                status: Some(RentPaymentStatus::PendingReview),
                payment_date: Some(Some(today)),
                receipt_path: Some(Some(receipt_path)),
                admin_comment: Some(None),
                user_comment: Some(user_comment),
            },
        )
        .await?;
    info!(payment_id = %id, month = %updated.month, "receipt submitted for review");
    Ok(updated)
}

/// Staff accept a receipt under review.
pub async fn approve_payment(
    repo: &dyn FullRepository,
    actor: &User,
    id: PaymentId,
    admin_comment: Option<String>,
) -> ServiceResult<RentPayment> {
    if !actor.is_admin() {
        return Err(ServiceError::forbidden("only staff can review payments"));
    }
    let payment = repo.get_payment(id).await?;
    if !payment
        .status
        .can_transition_to(RentPaymentStatus::Approved)
    {
        return Err(ServiceError::Conflict(format!(
            "payment in status '{}' cannot be approved",
            payment.status
        )));
    }
    let updated = repo
        .update_payment(
            id,
            RentPaymentUpdate {
                status: Some(RentPaymentStatus::Approved),
                admin_comment: Some(admin_comment),
                ..Default::default()
            },
        )
        .await?;
    info!(payment_id = %id, month = %updated.month, "payment approved");
    Ok(updated)
}

/// Staff reject a receipt under review; a comment explaining why is required.
pub async fn reject_payment(
    repo: &dyn FullRepository,
    actor: &User,
    id: PaymentId,
    comment: String,
) -> ServiceResult<RentPayment> {
    if !actor.is_admin() {
        return Err(ServiceError::forbidden("only staff can review payments"));
    }
    if comment.trim().is_empty() {
        return Err(ServiceError::validation(
            "a rejection comment is required",
        ));
    }
    let payment = repo.get_payment(id).await?;
    if !payment
        .status
        .can_transition_to(RentPaymentStatus::Rejected)
    {
        return Err(ServiceError::Conflict(format!(
            "payment in status '{}' cannot be rejected",
            payment.status
        )));
    }
    let updated = repo
        .update_payment(
            id,
            RentPaymentUpdate {
                status: Some(RentPaymentStatus::Rejected),
                admin_comment: Some(Some(comment)),
                ..Default::default()
            },
        )
        .await?;
    info!(payment_id = %id, month = %updated.month, "payment rejected");
    Ok(updated)
}

/// Staff-triggered status sweep across all payments.
pub async fn refresh_statuses(
    repo: &dyn FullRepository,
    actor: &User,
) -> ServiceResult<RefreshOutcome> {
    if !actor.is_admin() {
        return Err(ServiceError::forbidden("only staff can refresh statuses"));
    }
    let outcome = repo
        .refresh_payment_statuses(Utc::now().date_naive())
        .await?;
    info!(
        marked_overdue = outcome.marked_overdue,
        reverted_rejected = outcome.reverted_rejected,
        "payment status refresh complete"
    );
    Ok(outcome)
}
