//! # RentHub Backend
//!
//! Multi-tenant property-rental management backend.
//!
//! This crate provides the server side of RentHub: user and role management,
//! building/room inventory, lease contracts with generated rent-payment
//! schedules, a rent-payment approval workflow, and a laundry-booking
//! negotiation flow between tenants and admins. The backend exposes a REST
//! API via Axum for the React frontend.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Consolidated public types (id newtypes, filters, summaries)
//! - [`models`]: Domain entities and the two state machines
//! - [`db`]: Database operations, repository pattern, and persistence layer
//! - [`services`]: High-level business logic with role enforcement
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ## State machines
//!
//! Two entities carry workflow state: rent payments
//! (`upcoming → overdue → pending_review → approved | rejected`) and laundry
//! bookings (a two-actor turn-taking negotiation over dates and time slots).
//! Both live in [`models`] as pure transition functions so the repository
//! backends and the HTTP layer share one source of truth.

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;

pub mod db;
pub mod models;

pub mod services;

#[cfg(feature = "http-server")]
pub mod auth;

#[cfg(feature = "http-server")]
pub mod http;
