//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint, extracts the authenticated
//! caller where required, and delegates to the service layer for business
//! logic and role scoping.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    ApprovePaymentRequest, BookingActionRequest, ContractCreatedResponse, CreateBookingRequest,
    HealthResponse, RegisterRequest, RejectPaymentRequest, RoomsQuery, UploadReceiptRequest,
};
use super::error::ApiError;
use super::state::AppState;
use crate::api::{
    AdminDashboard, BookingFilter, Building, Contract, ContractFilter, LaundryBooking,
    NewBuilding, NewContract, NewRoom, NewUser, PaymentFilter, RefreshOutcome, RentPayment,
    Room, TenantDashboard, User, UserUpdate,
};
use crate::auth::AuthUser;
use crate::models::{BookingId, BuildingId, ContractId, PaymentId, RoomId, UserId};
use crate::services;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, ApiError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and storage is
/// reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let database = match state.repository.health_check().await {
        Ok(()) => "connected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database,
    }))
}

// =============================================================================
// Auth & Users
// =============================================================================

/// POST /v1/auth/register
///
/// Self-service tenant registration. No token required.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = services::users::register(state.repository.as_ref(), request.into()).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /v1/users
///
/// Create an account with an explicit role. Staff only.
pub async fn create_user(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Json(new_user): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = services::users::create_user(state.repository.as_ref(), &actor, new_user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /v1/users
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
) -> HandlerResult<Vec<User>> {
    let users = services::users::list_users(state.repository.as_ref(), &actor).await?;
    Ok(Json(users))
}

/// GET /v1/users/{user_id}
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(user_id): Path<UserId>,
) -> HandlerResult<User> {
    let user = services::users::get_user(state.repository.as_ref(), &actor, user_id).await?;
    Ok(Json(user))
}

/// GET /v1/users/me
pub async fn get_me(AuthUser(actor): AuthUser) -> HandlerResult<User> {
    Ok(Json(actor))
}

/// PATCH /v1/users/{user_id}
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(user_id): Path<UserId>,
    Json(update): Json<UserUpdate>,
) -> HandlerResult<User> {
    let user =
        services::users::update_user(state.repository.as_ref(), &actor, user_id, update).await?;
    Ok(Json(user))
}

/// DELETE /v1/users/{user_id}
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(user_id): Path<UserId>,
) -> Result<StatusCode, ApiError> {
    services::users::delete_user(state.repository.as_ref(), &actor, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Buildings & Rooms
// =============================================================================

/// POST /v1/buildings
pub async fn create_building(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Json(new_building): Json<NewBuilding>,
) -> Result<(StatusCode, Json<Building>), ApiError> {
    let building =
        services::property::create_building(state.repository.as_ref(), &actor, new_building)
            .await?;
    Ok((StatusCode::CREATED, Json(building)))
}

/// GET /v1/buildings
pub async fn list_buildings(
    State(state): State<AppState>,
    AuthUser(_actor): AuthUser,
) -> HandlerResult<Vec<Building>> {
    let buildings = services::property::list_buildings(state.repository.as_ref()).await?;
    Ok(Json(buildings))
}

/// GET /v1/buildings/{building_id}
pub async fn get_building(
    State(state): State<AppState>,
    AuthUser(_actor): AuthUser,
    Path(building_id): Path<BuildingId>,
) -> HandlerResult<Building> {
    let building = services::property::get_building(state.repository.as_ref(), building_id).await?;
    Ok(Json(building))
}

/// DELETE /v1/buildings/{building_id}
pub async fn delete_building(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(building_id): Path<BuildingId>,
) -> Result<StatusCode, ApiError> {
    services::property::delete_building(state.repository.as_ref(), &actor, building_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/rooms
pub async fn create_room(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Json(new_room): Json<NewRoom>,
) -> Result<(StatusCode, Json<Room>), ApiError> {
    let room = services::property::create_room(state.repository.as_ref(), &actor, new_room).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

/// GET /v1/rooms?building_id=...&occupied=...
pub async fn list_rooms(
    State(state): State<AppState>,
    AuthUser(_actor): AuthUser,
    Query(query): Query<RoomsQuery>,
) -> HandlerResult<Vec<Room>> {
    let mut rooms =
        services::property::list_rooms(state.repository.as_ref(), query.building_id).await?;
    if let Some(occupied) = query.occupied {
        rooms.retain(|r| r.is_occupied == occupied);
    }
    Ok(Json(rooms))
}

/// GET /v1/rooms/available?building_id=...
pub async fn list_available_rooms(
    State(state): State<AppState>,
    AuthUser(_actor): AuthUser,
    Query(query): Query<RoomsQuery>,
) -> HandlerResult<Vec<Room>> {
    let mut rooms =
        services::property::list_rooms(state.repository.as_ref(), query.building_id).await?;
    rooms.retain(|r| !r.is_occupied);
    Ok(Json(rooms))
}

/// GET /v1/buildings/{building_id}/rooms?occupied=...
pub async fn list_building_rooms(
    State(state): State<AppState>,
    AuthUser(_actor): AuthUser,
    Path(building_id): Path<BuildingId>,
    Query(query): Query<RoomsQuery>,
) -> HandlerResult<Vec<Room>> {
    // 404 for unknown buildings rather than an empty list.
    services::property::get_building(state.repository.as_ref(), building_id).await?;
    let mut rooms =
        services::property::list_rooms(state.repository.as_ref(), Some(building_id)).await?;
    if let Some(occupied) = query.occupied {
        rooms.retain(|r| r.is_occupied == occupied);
    }
    Ok(Json(rooms))
}

/// GET /v1/rooms/{room_id}
pub async fn get_room(
    State(state): State<AppState>,
    AuthUser(_actor): AuthUser,
    Path(room_id): Path<RoomId>,
) -> HandlerResult<Room> {
    let room = services::property::get_room(state.repository.as_ref(), room_id).await?;
    Ok(Json(room))
}

/// DELETE /v1/rooms/{room_id}
pub async fn delete_room(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(room_id): Path<RoomId>,
) -> Result<StatusCode, ApiError> {
    services::property::delete_room(state.repository.as_ref(), &actor, room_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Contracts
// =============================================================================

/// POST /v1/contracts
///
/// Creates the contract and its full monthly payment schedule atomically.
pub async fn create_contract(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Json(new_contract): Json<NewContract>,
) -> Result<(StatusCode, Json<ContractCreatedResponse>), ApiError> {
    let (contract, payments) =
        services::contracts::create_contract(state.repository.as_ref(), &actor, new_contract)
            .await?;
    Ok((
        StatusCode::CREATED,
        Json(ContractCreatedResponse { contract, payments }),
    ))
}

/// GET /v1/contracts
pub async fn list_contracts(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Query(filter): Query<ContractFilter>,
) -> HandlerResult<Vec<Contract>> {
    let contracts =
        services::contracts::list_contracts(state.repository.as_ref(), &actor, filter).await?;
    Ok(Json(contracts))
}

/// GET /v1/contracts/{contract_id}
pub async fn get_contract(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(contract_id): Path<ContractId>,
) -> HandlerResult<Contract> {
    let contract =
        services::contracts::get_contract(state.repository.as_ref(), &actor, contract_id).await?;
    Ok(Json(contract))
}

/// GET /v1/contracts/{contract_id}/payments
///
/// The payment schedule of one contract, oldest month first.
pub async fn list_contract_payments(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(contract_id): Path<ContractId>,
) -> HandlerResult<Vec<RentPayment>> {
    // Scoped lookup first so foreign contracts 404 instead of listing empty.
    services::contracts::get_contract(state.repository.as_ref(), &actor, contract_id).await?;
    let mut payments = services::payments::list_payments(
        state.repository.as_ref(),
        &actor,
        PaymentFilter {
            contract_id: Some(contract_id),
            ..Default::default()
        },
    )
    .await?;
    payments.sort_by_key(|p| p.month);
    Ok(Json(payments))
}

/// DELETE /v1/contracts/{contract_id}
pub async fn delete_contract(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(contract_id): Path<ContractId>,
) -> Result<StatusCode, ApiError> {
    services::contracts::delete_contract(state.repository.as_ref(), &actor, contract_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Rent Payments
// =============================================================================

/// GET /v1/payments
pub async fn list_payments(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Query(filter): Query<PaymentFilter>,
) -> HandlerResult<Vec<RentPayment>> {
    let payments =
        services::payments::list_payments(state.repository.as_ref(), &actor, filter).await?;
    Ok(Json(payments))
}

/// GET /v1/payments/{payment_id}
pub async fn get_payment(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(payment_id): Path<PaymentId>,
) -> HandlerResult<RentPayment> {
    let payment =
        services::payments::get_payment(state.repository.as_ref(), &actor, payment_id).await?;
    Ok(Json(payment))
}

/// POST /v1/payments/{payment_id}/receipt
///
/// Tenant submits a receipt for an outstanding payment, moving it into
/// review.
pub async fn upload_receipt(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(payment_id): Path<PaymentId>,
    Json(request): Json<UploadReceiptRequest>,
) -> HandlerResult<RentPayment> {
    let payment = services::payments::upload_receipt(
        state.repository.as_ref(),
        &actor,
        payment_id,
        request.receipt_path,
        request.user_comment,
    )
    .await?;
    Ok(Json(payment))
}

/// POST /v1/payments/{payment_id}/approve
pub async fn approve_payment(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(payment_id): Path<PaymentId>,
    Json(request): Json<ApprovePaymentRequest>,
) -> HandlerResult<RentPayment> {
    let payment = services::payments::approve_payment(
        state.repository.as_ref(),
        &actor,
        payment_id,
        request.comment,
    )
    .await?;
    Ok(Json(payment))
}

/// POST /v1/payments/{payment_id}/reject
pub async fn reject_payment(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(payment_id): Path<PaymentId>,
    Json(request): Json<RejectPaymentRequest>,
) -> HandlerResult<RentPayment> {
    let payment = services::payments::reject_payment(
        state.repository.as_ref(),
        &actor,
        payment_id,
        request.comment,
    )
    .await?;
    Ok(Json(payment))
}

/// POST /v1/payments/refresh
///
/// Sweep payment statuses against today's date. Staff only.
pub async fn refresh_payments(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
) -> HandlerResult<RefreshOutcome> {
    let outcome = services::payments::refresh_statuses(state.repository.as_ref(), &actor).await?;
    Ok(Json(outcome))
}

// =============================================================================
// Laundry Bookings
// =============================================================================

/// POST /v1/laundry/bookings
pub async fn create_booking(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<LaundryBooking>), ApiError> {
    let new_booking = request.into_new_booking(actor.id);
    let booking =
        services::laundry::create_booking(state.repository.as_ref(), &actor, new_booking).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /v1/laundry/bookings
pub async fn list_bookings(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Query(filter): Query<BookingFilter>,
) -> HandlerResult<Vec<LaundryBooking>> {
    let bookings =
        services::laundry::list_bookings(state.repository.as_ref(), &actor, filter).await?;
    Ok(Json(bookings))
}

/// GET /v1/laundry/bookings/{booking_id}
pub async fn get_booking(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(booking_id): Path<BookingId>,
) -> HandlerResult<LaundryBooking> {
    let booking =
        services::laundry::get_booking(state.repository.as_ref(), &actor, booking_id).await?;
    Ok(Json(booking))
}

/// POST /v1/laundry/bookings/{booking_id}/action
///
/// Take one negotiation step (approve/reject/propose/accept/counter_propose).
pub async fn act_on_booking(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(booking_id): Path<BookingId>,
    Json(request): Json<BookingActionRequest>,
) -> HandlerResult<LaundryBooking> {
    let action = request.into_action().map_err(ApiError::BadRequest)?;
    let booking =
        services::laundry::act_on_booking(state.repository.as_ref(), &actor, booking_id, action)
            .await?;
    Ok(Json(booking))
}

/// DELETE /v1/laundry/bookings/{booking_id}
pub async fn delete_booking(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(booking_id): Path<BookingId>,
) -> Result<StatusCode, ApiError> {
    services::laundry::delete_booking(state.repository.as_ref(), &actor, booking_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Dashboards
// =============================================================================

/// GET /v1/dashboard/admin
pub async fn admin_dashboard(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
) -> HandlerResult<AdminDashboard> {
    let dashboard =
        services::dashboard::admin_dashboard(state.repository.as_ref(), &actor).await?;
    Ok(Json(dashboard))
}

/// GET /v1/dashboard/me
pub async fn tenant_dashboard(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
) -> HandlerResult<TenantDashboard> {
    let dashboard =
        services::dashboard::tenant_dashboard(state.repository.as_ref(), &actor).await?;
    Ok(Json(dashboard))
}
