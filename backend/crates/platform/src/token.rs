//! Bearer token codec
//!
//! HS256-signed JWTs binding a user id to an expiry. Access and refresh
//! tokens share the format and differ only in TTL; a refresh token is also
//! stored on its session row, so every token carries a random `jti` to keep
//! two tokens minted in the same second distinct.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const BEARER_SCHEME: &str = "Bearer";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: String,
    /// Issued-at (Unix seconds).
    pub iat: i64,
    /// Expiry (Unix seconds).
    pub exp: i64,
    /// Random token id.
    pub jti: String,
}

impl Claims {
    pub fn user_id(&self) -> &str {
        &self.sub
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    /// Signature was valid but `exp` has passed.
    #[error("token has expired")]
    Expired,

    /// Malformed, tampered, or signed with an unexpected algorithm.
    #[error("invalid token")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl TokenError {
    pub fn is_expired(&self) -> bool {
        matches!(self, TokenError::Expired)
    }
}

/// Sign a token for `user_id` valid for `ttl` from now.
///
/// Returns the encoded token and its expiry instant.
pub fn generate(
    secret: &str,
    user_id: &str,
    ttl: Duration,
) -> Result<(String, DateTime<Utc>), TokenError> {
    generate_at(secret, user_id, ttl, Utc::now())
}

fn generate_at(
    secret: &str,
    user_id: &str,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<(String, DateTime<Utc>), TokenError> {
    let expires = now + ttl;
    let claims = Claims {
        sub: user_id.to_owned(),
        iat: now.timestamp(),
        exp: expires.timestamp(),
        jti: hex::encode(rand::random::<[u8; 16]>()),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(TokenError::Signing)?;

    // Truncate to the second actually encoded in `exp`.
    let expires = claims.expires_at().unwrap_or(expires);
    Ok((token, expires))
}

/// Verify signature, algorithm and expiry. Accepts a `Bearer ` prefix.
pub fn verify(secret: &str, token: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    decode::<Claims>(
        strip_bearer(token),
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid(e),
    })
}

/// `"Bearer abc"` and `"abc"` both yield `"abc"`.
pub fn strip_bearer(value: &str) -> &str {
    let value = value.trim();
    match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => rest.trim_start(),
        None if value.eq_ignore_ascii_case(BEARER_SCHEME) => "",
        _ => value,
    }
}
