//! Session tokens and password hashing.
//!
//! Tokens are signed JWTs carrying the user id and role. Handlers that need
//! a caller identity take the [`AuthUser`] extractor, which rejects with 401
//! when the token is missing and 403 when it is invalid or expired.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::Json,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use model::entities::user::{self, UserRole};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::schemas::{AppState, ErrorResponse};

/// Session lifetime in seconds.
const TOKEN_TTL_SECS: i64 = 60 * 60 * 24;

/// JWT session claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: i32,
    /// Role at login time
    pub role: UserRole,
    /// Issued at
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
}

/// Creates a session token for a user.
pub fn create_token(
    user: &user::Model,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user.id,
        role: user.role,
        iat: now,
        exp: now + TOKEN_TTL_SECS,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verifies a session token and returns its claims.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Hashes a password with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verifies a password against a stored hash. The hash carries its own
/// parameters, so verification works across parameter changes.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("stored password hash failed to parse: {}", e);
            false
        }
    }
}

/// The authenticated caller, extracted from the Authorization header.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: i32,
    pub role: UserRole,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let Some(token) = token else {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Access token required".to_string(),
                    code: "TOKEN_REQUIRED".to_string(),
                    success: false,
                }),
            ));
        };

        match verify_token(token, &state.jwt_secret) {
            Ok(claims) => {
                debug!(user_id = claims.sub, "token verified");
                Ok(AuthUser {
                    id: claims.sub,
                    role: claims.role,
                })
            }
            Err(e) => {
                warn!("token verification failed: {}", e);
                Err((
                    StatusCode::FORBIDDEN,
                    Json(ErrorResponse {
                        error: "Invalid or expired token".to_string(),
                        code: "TOKEN_INVALID".to_string(),
                        success: false,
                    }),
                ))
            }
        }
    }
}
