//! Bearer-token authentication: HS256 claims and the Axum extractor.
//!
//! Login and registration live in the identity service; this gateway only
//! validates the tokens it is handed. Tokens are HS256-signed JWTs whose
//! `sub` claim carries the user's id.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::config::JwtConfig;
use crate::error::BookingError;

/// JWT claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the user's id.
    pub sub: Uuid,
    /// The user's role name (`"CUSTOMER"`, `"STAFF"`, `"ADMIN"`).
    pub role: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
}

/// Generates an HS256 access token for the given user.
///
/// Sign-in lives with the identity provider, not this gateway; this
/// exists for minting tokens in local development and tests.
///
/// # Errors
///
/// Returns an error if token encoding fails.
pub fn generate_access_token(
    user_id: Uuid,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        exp: now + config.access_token_expiry_mins * 60,
        iat: now,
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validates and decodes an access token, returning the embedded [`Claims`].
///
/// Validates the signature and expiration automatically.
///
/// # Errors
///
/// Returns an error if the token is malformed, expired, or signed with a
/// different secret.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    Ok(token_data.claims)
}

/// Authenticated user extracted from a `Bearer` token in the
/// `Authorization` header.
///
/// Use as an extractor parameter in any handler that requires a session;
/// rejection maps to a 401 via [`BookingError::Unauthorized`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The caller's user id (from `claims.sub`).
    pub user_id: Uuid,
    /// The caller's role name.
    pub role: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = BookingError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                BookingError::Unauthorized("missing Authorization header".to_string())
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            BookingError::Unauthorized("expected Authorization: Bearer <token>".to_string())
        })?;

        let claims = validate_token(token, &state.config.jwt)
            .map_err(|_| BookingError::Unauthorized("invalid or expired token".to_string()))?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        }
    }

    #[test]
    fn generate_and_validate_roundtrip() {
        let config = test_config();
        let user_id = Uuid::new_v4();

        let token = generate_access_token(user_id, "CUSTOMER", &config);
        let Ok(token) = token else {
            unreachable!("token generation should succeed");
        };

        let claims = validate_token(&token, &config);
        let Ok(claims) = claims else {
            unreachable!("token validation should succeed");
        };
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, "CUSTOMER");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_fails() {
        let config = test_config();

        // Expired well beyond the default 60-second leeway.
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            role: "CUSTOMER".to_string(),
            exp: now - 300,
            iat: now - 600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        );
        let Ok(token) = token else {
            unreachable!("encoding should succeed");
        };

        assert!(validate_token(&token, &config).is_err());
    }

    #[test]
    fn different_secret_fails() {
        let config_a = test_config();
        let config_b = JwtConfig {
            secret: "a-completely-different-secret-value".to_string(),
            access_token_expiry_mins: 15,
        };

        let token = generate_access_token(Uuid::new_v4(), "STAFF", &config_a);
        let Ok(token) = token else {
            unreachable!("token generation should succeed");
        };

        assert!(validate_token(&token, &config_b).is_err());
    }
}
