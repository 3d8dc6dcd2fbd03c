//! Bearer-JWT authentication middleware.
//!
//! Validates the token before any service call and threads the verified
//! subject through as a typed [`AuthenticatedPrincipal`] request extension
//! instead of an untyped context bag.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, ApiState};
use crate::errors::{CachetteError, Result};

/// The verified caller identity, extracted from the JWT subject claim.
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal {
    pub subject: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: u64,
}

/// Reject requests without a valid bearer JWT; on success, insert the
/// [`AuthenticatedPrincipal`] extension for handlers downstream.
pub async fn require_bearer_jwt(
    State(state): State<ApiState>,
    mut request: Request,
    next: Next,
) -> std::result::Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("authorization header required".to_string()))?;

    let token = header.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::Unauthorized("authorization header with bearer strategy required".to_string())
    })?;

    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.auth.jwt_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| ApiError::Unauthorized(format!("error parsing token: {}", e)))?;

    request.extensions_mut().insert(AuthenticatedPrincipal { subject: data.claims.sub });
    Ok(next.run(request).await)
}

/// Mint an HS256 bearer token for the given subject. Used by client tooling
/// and tests.
pub fn issue_token(secret: &str, subject: &str, valid_for: std::time::Duration) -> Result<String> {
    let exp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|e| CachetteError::internal(format!("system clock before epoch: {}", e)))?
        .as_secs()
        + valid_for.as_secs();
    let claims = Claims { sub: subject.to_string(), exp };
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| CachetteError::internal(format!("failed to sign token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_issue_token_round_trip() {
        let token = issue_token(SECRET, "alice", Duration::from_secs(60)).unwrap();
        let data = jsonwebtoken::decode::<Claims>(
            &token,
            &DecodingKey::from_secret(SECRET.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        assert_eq!(data.claims.sub, "alice");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(SECRET, "alice", Duration::from_secs(60)).unwrap();
        let result = jsonwebtoken::decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"another_secret_entirely_32_chars"),
            &Validation::new(Algorithm::HS256),
        );
        assert!(result.is_err());
    }
}
