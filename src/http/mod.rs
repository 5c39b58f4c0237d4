//! HTTP server module for the rental backend.
//!
//! This module provides an axum-based HTTP server that exposes the rental
//! backend as a REST API. It reuses the service layer, repository pattern,
//! and domain models from the core library.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - JWT extraction and request parsing                     │
//! │  - JSON serialization/deserialization                     │
//! │  - CORS, compression, error handling                      │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Service Layer (services/)                                │
//! │  - Business rules and role scoping                        │
//! │  - Payment and booking state machines                     │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Repository Layer (db/)                                   │
//! │  - Data persistence                                       │
//! │  - LocalRepository / PostgresRepository                   │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;

pub mod router;

pub mod state;

pub mod error;

pub mod dto;

pub use router::create_router;

pub use state::AppState;
