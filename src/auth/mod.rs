//! JWT authentication.
//!
//! The API verifies bearer tokens minted by the identity provider; the only
//! claim consumed is `sub`, which must be the user's id. The account (and
//! with it the role) is re-read from the repository on every request, so a
//! role change or deactivation takes effect immediately rather than at
//! token expiry.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::http::error::ApiError;
use crate::http::state::AppState;
use crate::models::{User, UserId};

/// JWT claims carried by API tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the user id in canonical UUID form.
    pub sub: String,
    /// Expiration time (Unix timestamp).
    pub exp: usize,
    /// Issued at (Unix timestamp).
    pub iat: Option<usize>,
}

/// JWT configuration loaded from environment.
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The secret stays out of logs.
        f.debug_struct("JwtConfig")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// `JWT_SECRET` is required; `JWT_ALGORITHM` defaults to HS256.
    pub fn from_env() -> Result<Self, String> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET environment variable must be set".to_string())?;

        let algorithm = std::env::var("JWT_ALGORITHM")
            .ok()
            .and_then(|a| match a.as_str() {
                "HS256" => Some(Algorithm::HS256),
                "HS384" => Some(Algorithm::HS384),
                "HS512" => Some(Algorithm::HS512),
                _ => None,
            })
            .unwrap_or(Algorithm::HS256);

        Ok(Self { secret, algorithm })
    }

    /// Create from explicit secret (for testing).
    pub fn new(secret: impl Into<String>, algorithm: Algorithm) -> Self {
        Self {
            secret: secret.into(),
            algorithm,
        }
    }
}

/// Verify a bearer token and extract its claims.
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<Claims, String> {
    let mut validation = Validation::new(config.algorithm);
    validation.validate_exp = true;

    let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| format!("Token decode error: {}", e))?;

    Ok(token_data.claims)
}

/// Mint a token for a user, valid for `ttl_secs`. Used by operational tooling
/// and tests; the production identity provider signs with the same secret.
pub fn issue_token(
    user_id: UserId,
    ttl_secs: i64,
    config: &JwtConfig,
) -> Result<String, String> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now + ttl_secs) as usize,
        iat: Some(now as usize),
    };
    let header = Header::new(config.algorithm);
    encode(
        &header,
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| format!("Token encode error: {}", e))
}

/// The authenticated user, extracted from the `Authorization` header.
///
/// Rejects with 401 when the token is missing, malformed, expired, names an
/// unknown user, or the account has been deactivated.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::unauthorized("Authorization header must use Bearer scheme")
        })?;

        let claims = verify_token(token, &state.jwt).map_err(|e| {
            warn!("JWT validation failed: {}", e);
            ApiError::unauthorized("Invalid token")
        })?;

        let user_id = UserId::parse(&claims.sub)
            .map_err(|_| ApiError::unauthorized("Invalid token subject"))?;

        let user = state
            .repository
            .get_user(user_id)
            .await
            .map_err(|_| ApiError::unauthorized("Unknown user"))?;
        if !user.is_active {
            return Err(ApiError::unauthorized("Account is deactivated"));
        }

        debug!(user_id = %user.id, role = %user.role, "authenticated request");
        Ok(AuthUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig::new("test-secret", Algorithm::HS256)
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let user_id = UserId::random();
        let token = issue_token(user_id, 3600, &config()).unwrap();
        let claims = verify_token(&token, &config()).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(UserId::random(), 3600, &config()).unwrap();
        let other = JwtConfig::new("other-secret", Algorithm::HS256);
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = issue_token(UserId::random(), -3600, &config()).unwrap();
        let result = verify_token(&token, &config());
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("test-secret"));
    }
}
