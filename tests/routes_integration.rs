//! End-to-end tests for the HTTP API.
//!
//! These tests drive the full axum router with `tower::ServiceExt::oneshot`,
//! exercising JWT extraction, role scoping, and the service layer against
//! the in-memory repository.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Datelike, Duration, Utc};
use jsonwebtoken::Algorithm;
use serde_json::{json, Value};
use tower::ServiceExt;

use renthub::auth::{issue_token, JwtConfig};
use renthub::db::repositories::LocalRepository;
use renthub::db::repository::{FullRepository, UserRepository};
use renthub::http::{create_router, AppState};
use renthub::models::{NewUser, Role, User, UserUpdate};

fn jwt_config() -> JwtConfig {
    JwtConfig::new("integration-test-secret", Algorithm::HS256)
}

fn build_app(repo: &Arc<LocalRepository>) -> Router {
    let state = AppState::new(
        Arc::clone(repo) as Arc<dyn FullRepository>,
        jwt_config(),
    );
    create_router(state)
}

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

fn token_for(user: &User) -> String {
    issue_token(user.id, 3600, &jwt_config()).unwrap()
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_requires_no_auth() {
    let repo = Arc::new(LocalRepository::new());
    let app = build_app(&repo);

    let response = app
        .oneshot(request("GET", "/health", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_register_creates_tenant_account() {
    let repo = Arc::new(LocalRepository::new());
    let app = build_app(&repo);

    let response = app
        .oneshot(request(
            "POST",
            "/v1/auth/register",
            None,
            Some(json!({
                "email": "New.Tenant@Example.com",
                "first_name": "New",
                "last_name": "Tenant"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["role"], "tenant");
    // Emails are normalized to lowercase on creation.
    assert_eq!(body["email"], "new.tenant@example.com");
}

#[tokio::test]
async fn test_missing_token_rejected() {
    let repo = Arc::new(LocalRepository::new());
    let app = build_app(&repo);

    let response = app
        .oneshot(request("GET", "/v1/users", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_wrong_secret_rejected() {
    let repo = Arc::new(LocalRepository::new());
    let tenant = seed_user(&repo, "tenant@example.com", Role::Tenant).await;
    let app = build_app(&repo);

    let forged = issue_token(
        tenant.id,
        3600,
        &JwtConfig::new("some-other-secret", Algorithm::HS256),
    )
    .unwrap();
    let response = app
        .oneshot(request("GET", "/v1/users/me", Some(&forged), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_deactivated_account_rejected() {
    let repo = Arc::new(LocalRepository::new());
    let tenant = seed_user(&repo, "tenant@example.com", Role::Tenant).await;
    repo.update_user(
        tenant.id,
        UserUpdate {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let app = build_app(&repo);

    let response = app
        .oneshot(request("GET", "/v1/users/me", Some(&token_for(&tenant)), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_tenant_cannot_list_users() {
    let repo = Arc::new(LocalRepository::new());
    let tenant = seed_user(&repo, "tenant@example.com", Role::Tenant).await;
    let app = build_app(&repo);

    let response = app
        .oneshot(request("GET", "/v1/users", Some(&token_for(&tenant)), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_full_rental_flow() {
    let repo = Arc::new(LocalRepository::new());
    let admin = seed_user(&repo, "admin@example.com", Role::Admin).await;
    let tenant = seed_user(&repo, "tenant@example.com", Role::Tenant).await;
    let app = build_app(&repo);
    let admin_token = token_for(&admin);
    let tenant_token = token_for(&tenant);

    // Admin creates a building and a room.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/v1/buildings",
            Some(&admin_token),
            Some(json!({"name": "Block A", "address": "1 Main St"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let building = body_json(response).await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/v1/rooms",
            Some(&admin_token),
            Some(json!({"building_id": building["id"], "room_number": 101})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let room = body_json(response).await;
    assert_eq!(room["is_occupied"], false);

    // Admin signs a contract covering the current month only, so its single
    // payment is immediately payable.
    let today = Utc::now().date_naive();
    let start = today.with_day(1).unwrap();
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/v1/contracts",
            Some(&admin_token),
            Some(json!({
                "user_id": tenant.id,
                "room_id": room["id"],
                "start_date": start.format("%Y-%m-%d").to_string(),
                "end_date": today.format("%Y-%m-%d").to_string(),
                "rent_cents": 85000,
                "deposit_cents": 170000
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["payments"].as_array().unwrap().len(), 1);
    let payment_id = created["payments"][0]["id"].as_str().unwrap().to_string();
    assert_eq!(created["payments"][0]["status"], "upcoming");
    assert_eq!(
        created["payments"][0]["month"],
        today.format("%Y-%m").to_string()
    );

    // The room now shows as occupied.
    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/v1/rooms/{}", room["id"].as_str().unwrap()),
            Some(&admin_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["is_occupied"], true);

    // Tenant sees their schedule without passing any filter.
    let response = app
        .clone()
        .oneshot(request("GET", "/v1/payments", Some(&tenant_token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    // Tenant uploads a receipt, moving the payment into review.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/v1/payments/{}/receipt", payment_id),
            Some(&tenant_token),
            Some(json!({"receipt_path": "receipts/march.png"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "pending_review");

    // Tenant cannot review their own payment.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/v1/payments/{}/approve", payment_id),
            Some(&tenant_token),
            Some(json!({})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admin approves.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/v1/payments/{}/approve", payment_id),
            Some(&admin_token),
            Some(json!({"comment": "received"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let approved = body_json(response).await;
    assert_eq!(approved["status"], "approved");
    assert_eq!(approved["admin_comment"], "received");
}

#[tokio::test]
async fn test_overlapping_contract_conflicts() {
    let repo = Arc::new(LocalRepository::new());
    let admin = seed_user(&repo, "admin@example.com", Role::Admin).await;
    let tenant_a = seed_user(&repo, "a@example.com", Role::Tenant).await;
    let tenant_b = seed_user(&repo, "b@example.com", Role::Tenant).await;
    let app = build_app(&repo);
    let admin_token = token_for(&admin);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/v1/buildings",
            Some(&admin_token),
            Some(json!({"name": "Block B", "address": "2 Main St"})),
        ))
        .await
        .unwrap();
    let building = body_json(response).await;
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/v1/rooms",
            Some(&admin_token),
            Some(json!({"building_id": building["id"], "room_number": 7})),
        ))
        .await
        .unwrap();
    let room = body_json(response).await;

    let contract_body = |user: &User, start: &str, end: &str| {
        json!({
            "user_id": user.id,
            "room_id": room["id"],
            "start_date": start,
            "end_date": end,
            "rent_cents": 50000,
            "deposit_cents": 0
        })
    };

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/v1/contracts",
            Some(&admin_token),
            Some(contract_body(&tenant_a, "2030-01-01", "2030-06-30")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Same room, overlapping dates: rejected with 409.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/v1/contracts",
            Some(&admin_token),
            Some(contract_body(&tenant_b, "2030-06-01", "2030-12-31")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Back-to-back dates are fine.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/v1/contracts",
            Some(&admin_token),
            Some(contract_body(&tenant_b, "2030-07-01", "2030-12-31")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_tenant_cannot_read_foreign_contract() {
    let repo = Arc::new(LocalRepository::new());
    let admin = seed_user(&repo, "admin@example.com", Role::Admin).await;
    let tenant_a = seed_user(&repo, "a@example.com", Role::Tenant).await;
    let tenant_b = seed_user(&repo, "b@example.com", Role::Tenant).await;
    let app = build_app(&repo);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/v1/buildings",
            Some(&token_for(&admin)),
            Some(json!({"name": "Block C", "address": "3 Main St"})),
        ))
        .await
        .unwrap();
    let building = body_json(response).await;
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/v1/rooms",
            Some(&token_for(&admin)),
            Some(json!({"building_id": building["id"], "room_number": 1})),
        ))
        .await
        .unwrap();
    let room = body_json(response).await;
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/v1/contracts",
            Some(&token_for(&admin)),
            Some(json!({
                "user_id": tenant_a.id,
                "room_id": room["id"],
                "start_date": "2030-01-01",
                "end_date": "2030-12-31",
                "rent_cents": 60000,
                "deposit_cents": 0
            })),
        ))
        .await
        .unwrap();
    let contract = body_json(response).await;

    // Existence stays hidden from other tenants.
    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/v1/contracts/{}", contract["contract"]["id"].as_str().unwrap()),
            Some(&token_for(&tenant_b)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_laundry_negotiation_over_http() {
    let repo = Arc::new(LocalRepository::new());
    let admin = seed_user(&repo, "admin@example.com", Role::Admin).await;
    let tenant = seed_user(&repo, "tenant@example.com", Role::Tenant).await;
    let app = build_app(&repo);
    let admin_token = token_for(&admin);
    let tenant_token = token_for(&tenant);

    let requested = (Utc::now().date_naive() + Duration::days(3))
        .format("%Y-%m-%d")
        .to_string();
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/v1/laundry/bookings",
            Some(&tenant_token),
            Some(json!({"booking_date": requested, "time_slot": "08:00-10:00"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let booking = body_json(response).await;
    assert_eq!(booking["status"], "pending");
    let booking_id = booking["id"].as_str().unwrap().to_string();

    // Admin offers a different slot on the same day.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/v1/laundry/bookings/{}/action", booking_id),
            Some(&admin_token),
            Some(json!({
                "action": "propose",
                "date": requested,
                "time_slot": "16:00-18:00"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "proposed");

    // Admin cannot move again while the ball is in the tenant's court.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/v1/laundry/bookings/{}/action", booking_id),
            Some(&admin_token),
            Some(json!({"action": "approve"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Tenant accepts; the proposal becomes the booked slot.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/v1/laundry/bookings/{}/action", booking_id),
            Some(&tenant_token),
            Some(json!({"action": "accept"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let accepted = body_json(response).await;
    assert_eq!(accepted["status"], "approved");
    assert_eq!(accepted["time_slot"], "16:00-18:00");
    assert!(accepted["proposed_time_slot"].is_null());
}

#[tokio::test]
async fn test_unknown_booking_action_is_bad_request() {
    let repo = Arc::new(LocalRepository::new());
    let tenant = seed_user(&repo, "tenant@example.com", Role::Tenant).await;
    let app = build_app(&repo);
    let token = token_for(&tenant);

    let requested = (Utc::now().date_naive() + Duration::days(1))
        .format("%Y-%m-%d")
        .to_string();
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/v1/laundry/bookings",
            Some(&token),
            Some(json!({"booking_date": requested, "time_slot": "08:00-10:00"})),
        ))
        .await
        .unwrap();
    let booking = body_json(response).await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/v1/laundry/bookings/{}/action", booking["id"].as_str().unwrap()),
            Some(&token),
            Some(json!({"action": "escalate"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dashboards() {
    let repo = Arc::new(LocalRepository::new());
    let admin = seed_user(&repo, "admin@example.com", Role::Admin).await;
    let tenant = seed_user(&repo, "tenant@example.com", Role::Tenant).await;
    let app = build_app(&repo);

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            "/v1/dashboard/admin",
            Some(&token_for(&admin)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let dashboard = body_json(response).await;
    assert_eq!(dashboard["total_users"], 2);
    assert_eq!(dashboard["total_rooms"], 0);

    // Tenants get their own summary but not the staff one.
    let response = app
        .clone()
        .oneshot(request(
            "GET",
            "/v1/dashboard/admin",
            Some(&token_for(&tenant)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            "/v1/dashboard/me",
            Some(&token_for(&tenant)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert!(me["active_contract"].is_null());
    assert_eq!(me["overdue_payments"], 0);
}
