//! Repository backends.
//!
//! Each submodule implements the traits in [`crate::db::repository`] against
//! one storage technology. The local backend is always available as the
//! fallback; Postgres is gated behind the `postgres-repo` feature.

pub mod local;

pub use local::LocalRepository;

#[cfg(feature = "postgres-repo")]
pub mod postgres;
