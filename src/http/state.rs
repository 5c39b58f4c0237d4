//! Application state for the HTTP server.

use std::sync::Arc;

use crate::auth::JwtConfig;
use crate::db::repository::FullRepository;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    /// JWT verification settings
    pub jwt: JwtConfig,
}

impl AppState {
    /// Create a new application state with the given repository and JWT config.
    pub fn new(repository: Arc<dyn FullRepository>, jwt: JwtConfig) -> Self {
        Self { repository, jwt }
    }
}
