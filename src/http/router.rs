//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the API router with versioned endpoints
    let api_v1 = Router::new()
        // Auth
        .route("/auth/register", post(handlers::register))
        // User management
        .route("/users", get(handlers::list_users).post(handlers::create_user))
        .route("/users/me", get(handlers::get_me))
        .route("/users/{user_id}", get(handlers::get_user))
        .route("/users/{user_id}", patch(handlers::update_user))
        .route("/users/{user_id}", delete(handlers::delete_user))
        // Buildings and rooms
        .route(
            "/buildings",
            get(handlers::list_buildings).post(handlers::create_building),
        )
        .route(
            "/buildings/{building_id}",
            get(handlers::get_building).delete(handlers::delete_building),
        )
        .route(
            "/buildings/{building_id}/rooms",
            get(handlers::list_building_rooms),
        )
        .route("/rooms", get(handlers::list_rooms).post(handlers::create_room))
        .route("/rooms/available", get(handlers::list_available_rooms))
        .route(
            "/rooms/{room_id}",
            get(handlers::get_room).delete(handlers::delete_room),
        )
        // Contracts
        .route(
            "/contracts",
            get(handlers::list_contracts).post(handlers::create_contract),
        )
        .route(
            "/contracts/{contract_id}",
            get(handlers::get_contract).delete(handlers::delete_contract),
        )
        .route(
            "/contracts/{contract_id}/payments",
            get(handlers::list_contract_payments),
        )
        // Rent payments
        .route("/payments", get(handlers::list_payments))
        .route("/payments/refresh", post(handlers::refresh_payments))
        .route("/payments/{payment_id}", get(handlers::get_payment))
        .route("/payments/{payment_id}/receipt", post(handlers::upload_receipt))
        .route("/payments/{payment_id}/approve", post(handlers::approve_payment))
        .route("/payments/{payment_id}/reject", post(handlers::reject_payment))
        // Laundry bookings
        .route(
            "/laundry/bookings",
            get(handlers::list_bookings).post(handlers::create_booking),
        )
        .route(
            "/laundry/bookings/{booking_id}",
            get(handlers::get_booking).delete(handlers::delete_booking),
        )
        .route(
            "/laundry/bookings/{booking_id}/action",
            post(handlers::act_on_booking),
        )
        // Dashboards
        .route("/dashboard/admin", get(handlers::admin_dashboard))
        .route("/dashboard/me", get(handlers::tenant_dashboard));

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        // Request bodies carry JSON and receipt paths only, never raw images.
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
