//! Password sign-in and cookie session tokens.
//!
//! When a password is configured, `POST /api/signin` exchanges it for a
//! signed token and the task endpoints require that token in the `token`
//! cookie. The token embeds a hash of the password it was issued for, so
//! changing the password invalidates every outstanding session.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    middleware::Next,
    response::Response,
    Json,
};
use axum_extra::extract::CookieJar;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::AuthConfig;
use crate::error::{ApiError, ApiResult};
use crate::gateway::json_body;
use crate::AppState;

/// Cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

/// Session token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Hex SHA-256 of the password the token was issued for.
    pub password_hash: String,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

/// Sign-in request body.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub password: String,
}

/// Sign-in response body.
#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub token: String,
}

/// Resolved authentication settings.
#[derive(Clone)]
pub struct AuthSettings {
    password: Option<String>,
    secret: Arc<[u8]>,
    token_ttl_hours: u64,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("enabled", &self.is_enabled())
            .field("token_ttl_hours", &self.token_ttl_hours)
            .finish_non_exhaustive()
    }
}

impl AuthSettings {
    /// Build settings from configuration.
    ///
    /// Returns the settings and whether the signing secret was generated
    /// because none was configured.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> (Self, bool) {
        let (secret, generated): (Arc<[u8]>, bool) = match config.jwt_secret.as_deref() {
            Some(secret) if !secret.is_empty() => (Arc::from(secret.as_bytes()), false),
            _ => {
                let bytes: [u8; 32] = rand::rng().random();
                (Arc::from(bytes.as_slice()), true)
            }
        };
        let settings = Self {
            password: config.password().map(str::to_string),
            secret,
            token_ttl_hours: config.token_ttl_hours,
        };
        (settings, generated)
    }

    /// Whether task endpoints require a session token.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.password.is_some()
    }

    /// Exchange a password for a session token.
    pub fn sign_in(&self, password: &str) -> ApiResult<String> {
        let expected = self
            .password
            .as_deref()
            .ok_or_else(|| ApiError::Unauthorized("sign-in is not enabled".to_string()))?;
        if password_hash(password) != password_hash(expected) {
            return Err(ApiError::Unauthorized("wrong password".to_string()));
        }
        self.issue_token(expected)
    }

    fn issue_token(&self, password: &str) -> ApiResult<String> {
        let ttl_secs = i64::try_from(self.token_ttl_hours.saturating_mul(3600)).unwrap_or(i64::MAX);
        let claims = Claims {
            password_hash: password_hash(password),
            exp: chrono::Utc::now().timestamp().saturating_add(ttl_secs),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to sign session token");
            ApiError::Internal("failed to issue token".to_string())
        })
    }

    /// Check a session token against the current password.
    pub fn verify(&self, token: &str) -> ApiResult<Claims> {
        let Some(password) = self.password.as_deref() else {
            return Err(ApiError::Unauthorized("sign-in is not enabled".to_string()));
        };
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &Validation::default(),
        )
        .map_err(|e| ApiError::Unauthorized(format!("invalid token: {e}")))?
        .claims;

        if claims.password_hash != password_hash(password) {
            return Err(ApiError::Unauthorized("token was issued for another password".to_string()));
        }
        Ok(claims)
    }
}

/// Hex-encoded SHA-256 of a password.
#[must_use]
pub fn password_hash(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// `POST /api/signin`
pub async fn sign_in(
    State(state): State<AppState>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> ApiResult<Json<SignInResponse>> {
    let request = json_body(payload)?;
    match state.auth.sign_in(&request.password) {
        Ok(token) => {
            tracing::info!("Sign-in succeeded");
            Ok(Json(SignInResponse { token }))
        }
        Err(err) => {
            tracing::warn!(error = %err, "Sign-in rejected");
            Err(err)
        }
    }
}

/// Require a valid session cookie when sign-in is enabled.
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.auth.is_enabled() {
        return Ok(next.run(req).await);
    }

    let token = jar
        .get(TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("authentication required".to_string()))?;

    if let Err(err) = state.auth.verify(&token) {
        tracing::debug!(path = %req.uri().path(), error = %err, "Rejected session token");
        return Err(err);
    }

    Ok(next.run(req).await)
}
