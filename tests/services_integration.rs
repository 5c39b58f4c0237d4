//! End-to-end service-layer test of the rent payment lifecycle.
//!
//! Walks one contract through its whole arc: schedule generation with
//! already-overdue months, the no-skipped-months rule, receipt review with
//! rejection, the refresh sweep reverting rejected rows, and final approval.

use chrono::{Datelike, Months, Utc};

use renthub::api::PaymentFilter;
use renthub::db::repository::{PropertyRepository, UserRepository};
use renthub::db::LocalRepository;
use renthub::models::{
    NewBuilding, NewContract, NewRoom, NewUser, RentPaymentStatus, Role, User, UserUpdate,
};
use renthub::services::{self, ServiceError};

async fn seed_user(repo: &LocalRepository, email: &str, role: Role) -> User {
    let user = repo
        .create_user(NewUser {
            email: email.into(),
            first_name: "Test".into(),
            last_name: "User".into(),
            phone_number: "".into(),
            role: Role::Tenant,
        })
        .await
        .unwrap();
    if role == Role::Tenant {
        user
    } else {
        repo.update_user(
            user.id,
            UserUpdate {
                role: Some(role),
                ..Default::default()
            },
        )
        .await
        .unwrap()
    }
}

#[tokio::test]
async fn test_payment_lifecycle_from_overdue_to_approved() {
    let repo = LocalRepository::new();
    let admin = seed_user(&repo, "admin@example.com", Role::Admin).await;
    let tenant = seed_user(&repo, "tenant@example.com", Role::Tenant).await;

    let building = repo
        .create_building(NewBuilding {
            name: "Block A".into(),
            address: "1 Main St".into(),
        })
        .await
        .unwrap();
    let room = repo
        .create_room(NewRoom {
            building_id: building.id,
            room_number: 12,
        })
        .await
        .unwrap();

    // Contract started two months ago, so two payments are born overdue and
    // the current month is upcoming.
    let today = Utc::now().date_naive();
    let start = today
        .checked_sub_months(Months::new(2))
        .unwrap()
        .with_day(1)
        .unwrap();
    let (_, mut payments) = services::contracts::create_contract(
        &repo,
        &admin,
        NewContract {
            user_id: tenant.id,
            room_id: room.id,
            start_date: start,
            end_date: today,
            rent_cents: 75000,
            deposit_cents: 150000,
        },
    )
    .await
    .unwrap();

    payments.sort_by_key(|p| p.month);
    assert_eq!(payments.len(), 3);
    assert_eq!(payments[0].status, RentPaymentStatus::Overdue);
    assert_eq!(payments[1].status, RentPaymentStatus::Overdue);
    assert_eq!(payments[2].status, RentPaymentStatus::Upcoming);

    // Months must be settled oldest-first.
    let err = services::payments::upload_receipt(
        &repo,
        &tenant,
        payments[1].id,
        "receipts/second.jpg".into(),
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    // Receipt file type is checked.
    let err = services::payments::upload_receipt(
        &repo,
        &tenant,
        payments[0].id,
        "receipts/first.pdf".into(),
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    // The oldest month goes into review.
    let reviewed = services::payments::upload_receipt(
        &repo,
        &tenant,
        payments[0].id,
        "receipts/first.jpg".into(),
        Some("paid by bank transfer".into()),
    )
    .await
    .unwrap();
    assert_eq!(reviewed.status, RentPaymentStatus::PendingReview);
    assert_eq!(reviewed.payment_date, Some(today));

    // Rejection needs a reason.
    let err = services::payments::reject_payment(&repo, &admin, payments[0].id, "  ".into())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let rejected = services::payments::reject_payment(
        &repo,
        &admin,
        payments[0].id,
        "amount does not match the rent".into(),
    )
    .await
    .unwrap();
    assert_eq!(rejected.status, RentPaymentStatus::Rejected);

    // The sweep puts rejected rows back into the overdue pool.
    let outcome = services::payments::refresh_statuses(&repo, &admin).await.unwrap();
    assert_eq!(outcome.reverted_rejected, 1);

    let refreshed = services::payments::get_payment(&repo, &tenant, payments[0].id)
        .await
        .unwrap();
    assert_eq!(refreshed.status, RentPaymentStatus::Overdue);

    // Second attempt sticks.
    services::payments::upload_receipt(
        &repo,
        &tenant,
        payments[0].id,
        "receipts/first-corrected.jpg".into(),
        None,
    )
    .await
    .unwrap();
    let approved = services::payments::approve_payment(
        &repo,
        &admin,
        payments[0].id,
        Some("thanks".into()),
    )
    .await
    .unwrap();
    assert_eq!(approved.status, RentPaymentStatus::Approved);

    // With the first month approved, the next one unblocks.
    let second = services::payments::upload_receipt(
        &repo,
        &tenant,
        payments[1].id,
        "receipts/second.png".into(),
        None,
    )
    .await
    .unwrap();
    assert_eq!(second.status, RentPaymentStatus::PendingReview);

    // Tenant's view: first month approved, second in review, current month
    // still upcoming. Only the one in review counts as outstanding.
    let mine = services::payments::list_payments(&repo, &tenant, PaymentFilter::default())
        .await
        .unwrap();
    assert_eq!(mine.len(), 3);
    assert_eq!(
        mine.iter().filter(|p| p.status.is_outstanding()).count(),
        1
    );
}
