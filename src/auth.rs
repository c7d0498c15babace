use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    error::ApiError,
    models::{Role, User},
    repository::UserRepositoryState,
};

/// Session token lifetime: 24 hours, no grace period on expiry.
pub const TOKEN_TTL_SECS: u64 = 24 * 60 * 60;

/// Name of the HTTP-only session cookie set by the login flow.
pub const AUTH_COOKIE: &str = "auth-token";

/// Claims
///
/// Signed payload of a session token. The server keeps no session store:
/// the identity and role needed to authorize a request travel inside the
/// token and are trusted only after signature and expiry checks.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user's UUID.
    pub sub: Uuid,
    /// Username at issuance time, echoed back in responses.
    pub username: String,
    /// Role at issuance time. Mutation routes require `Role::Admin`.
    pub role: Role,
    /// Issued At (iat): seconds since the Unix epoch.
    pub iat: usize,
    /// Expiration (exp): seconds since the Unix epoch. Strictly enforced.
    pub exp: usize,
}

/// AuthUser
///
/// The resolved identity of an authenticated request: the output of token
/// verification, and the input to every role check.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// create_token
///
/// Issues a signed, time-boxed session credential for `user`, valid for
/// [`TOKEN_TTL_SECS`]. HS256 over the server-held secret; without that
/// secret the token cannot be forged.
pub fn create_token(user: &AuthUser, secret: &str) -> Result<String, ApiError> {
    let now = unix_now();
    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        role: user.role,
        iat: now as usize,
        exp: (now + TOKEN_TTL_SECS) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!("token signing failed: {e}");
        ApiError::Persistence("token signing failed".to_string())
    })
}

/// verify_token
///
/// Verifies signature and expiry and returns the embedded identity. Every
/// failure mode (malformed token, bad signature, expired) collapses to
/// `None` so callers cannot distinguish them and neither can an attacker.
pub fn verify_token(token: &str, secret: &str) -> Option<AuthUser> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .ok()?;

    Some(AuthUser {
        id: data.claims.sub,
        username: data.claims.username,
        role: data.claims.role,
    })
}

/// token_from_headers
///
/// Extracts a bearer credential from the Authorization header. Returns
/// `None` when the header is absent or not in `Bearer <token>` form.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// token_from_cookie
///
/// Fallback extraction path: the `auth-token` cookie set by the login
/// flow. Checked only after the Authorization header.
pub fn token_from_cookie(headers: &HeaderMap) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        for pair in raw.split(';') {
            if let Some(token) = pair.trim().strip_prefix("auth-token=") {
                if !token.is_empty() {
                    return Some(token.to_string());
                }
            }
        }
    }
    None
}

/// authorize_admin
///
/// The full API auth gate as one explicit step: extract a token (header
/// first, cookie second), verify it, and require the ADMIN role. Used by
/// call sites that must order the gate after another check; the create
/// flow rate-limits before authenticating.
pub fn authorize_admin(headers: &HeaderMap, config: &AppConfig) -> Result<AuthUser, ApiError> {
    let token = match token_from_headers(headers) {
        Some(t) => t.to_string(),
        None => token_from_cookie(headers).ok_or(ApiError::Authentication)?,
    };

    let user = verify_token(&token, &config.jwt_secret).ok_or(ApiError::Authentication)?;

    if user.role != Role::Admin {
        return Err(ApiError::Authorization);
    }

    Ok(user)
}

/// AuthUser Extractor Implementation
///
/// Makes `AuthUser` usable as a handler argument on any route that needs an
/// authenticated caller. Token acquisition tries the Authorization header
/// first and falls back to the session cookie; verification is stateless,
/// so no repository call happens here. Rejects with 401 on any failure.
/// Role enforcement stays in the handlers, which answer 403 distinctly.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        let token = match token_from_headers(&parts.headers) {
            Some(t) => t.to_string(),
            None => token_from_cookie(&parts.headers).ok_or(ApiError::Authentication)?,
        };

        verify_token(&token, &config.jwt_secret).ok_or(ApiError::Authentication)
    }
}

// --- Credential verification ---

/// hash_password
///
/// Argon2id hash with a fresh random salt. Used by provisioning tooling
/// and test fixtures; the request path only ever verifies.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Persistence(format!("password hashing failed: {e}")))
}

/// verify_password
///
/// Constant-time Argon2id comparison. An unparsable stored hash verifies
/// as false rather than erroring, which keeps the login response uniform.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// authenticate
///
/// Looks up the user by trimmed username and checks the supplied password
/// against the stored Argon2id hash. Unknown user and wrong password both
/// yield `None`; the login handler maps either to the same 401.
pub async fn authenticate(
    users: &UserRepositoryState,
    username: &str,
    password: &str,
) -> Result<Option<AuthUser>, ApiError> {
    let Some(user) = users.find_by_username(username.trim()).await? else {
        return Ok(None);
    };

    if !verify_password(password, &user.password_hash) {
        return Ok(None);
    }

    Ok(Some(auth_user_from(&user)))
}

fn auth_user_from(user: &User) -> AuthUser {
    AuthUser {
        id: user.id,
        username: user.username.clone(),
        role: user.role,
    }
}
