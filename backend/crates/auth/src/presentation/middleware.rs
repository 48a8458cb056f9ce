//! Auth Middleware
//!
//! Verifies the bearer access token once per request and hands the caller
//! to handlers as an [`AuthUser`] request extension.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use kernel::id::UserId;
use platform::client::extract_bearer_token;
use platform::token;

use crate::application::auth_user::AuthUser;
use crate::application::config::AuthConfig;
use crate::error::AuthError;

/// Middleware state: the access token verification key.
#[derive(Clone)]
pub struct AccessTokenVerifier {
    jwt_secret: Arc<str>,
}

impl AccessTokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            jwt_secret: Arc::from(config.jwt_secret.as_str()),
        }
    }

    /// Resolve the caller from an `Authorization` header value.
    pub fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        let claims = token::verify(&self.jwt_secret, token).map_err(|e| {
            if e.is_expired() {
                AuthError::TokenExpired
            } else {
                AuthError::InvalidAccessToken
            }
        })?;

        let user_id =
            UserId::parse(claims.user_id()).map_err(|_| AuthError::InvalidAccessToken)?;
        Ok(AuthUser::new(user_id))
    }
}

/// Middleware that requires a valid access token
///
/// Mount with `axum::middleware::from_fn_with_state(verifier, require_auth)`.
pub async fn require_auth(
    State(verifier): State<AccessTokenVerifier>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let token = extract_bearer_token(req.headers()).ok_or(AuthError::MissingAccessToken)?;
    let caller = verifier.verify(token)?;

    tracing::trace!(user_id = %caller.user_id, "Access token accepted");
    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}
