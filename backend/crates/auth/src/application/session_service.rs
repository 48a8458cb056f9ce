//! Session Service
//!
//! Orchestrates the session lifecycle: creation at login, cache-aside reads,
//! access-token renewal from a refresh token, and bulk deactivation.
//!
//! The relational store is authoritative. `sess:<user id>` in the cache is a
//! shadow with its own, shorter TTL, so a cache hit is still checked against
//! the session's own expiry before it is trusted.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use platform::cache::{Cache, CacheStore};
use platform::client::describe_user_agent;
use platform::token;

use crate::application::auth_user::{AuthUser, require};
use crate::application::cache_key;
use crate::application::config::AuthConfig;
use crate::domain::entity::{Session, SessionSummary};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::error::{AuthError, AuthResult};

/// A freshly minted access token
#[derive(Debug, Clone)]
pub struct RenewedAccessToken {
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
}

pub struct SessionService<S, U, C> {
    session_repo: Arc<S>,
    user_repo: Arc<U>,
    cache: Cache<C>,
    config: Arc<AuthConfig>,
}

impl<S, U, C> Clone for SessionService<S, U, C> {
    fn clone(&self) -> Self {
        Self {
            session_repo: Arc::clone(&self.session_repo),
            user_repo: Arc::clone(&self.user_repo),
            cache: self.cache.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S, U, C> SessionService<S, U, C>
where
    S: SessionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    pub fn new(
        session_repo: Arc<S>,
        user_repo: Arc<U>,
        cache: Cache<C>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            session_repo,
            user_repo,
            cache,
            config,
        }
    }

    /// Persist a new active session for `user_id` and shadow it in the cache.
    ///
    /// `user_agent` is the raw header; it is stored as a short description.
    pub async fn create_session(
        &self,
        user_id: &UserId,
        ip: &str,
        user_agent: &str,
        refresh_token: &str,
    ) -> AuthResult<SessionSummary> {
        let user = self
            .user_repo
            .get_by_id(user_id)
            .await
            .map_err(AuthError::storage("failed to retrieve user"))?
            .ok_or(AuthError::UserNotFound)?;

        let agent = describe_user_agent(user_agent);
        let session = Session::new(user.id, ip, agent, refresh_token)?;

        self.session_repo
            .insert(&session)
            .await
            .map_err(AuthError::storage("failed to create session"))?;

        let summary = SessionSummary::from(&session);
        self.shadow(&summary).await;

        tracing::info!(
            user_id = %session.user_id,
            session_id = %session.id,
            agent = %session.agent,
            "Session created"
        );

        Ok(summary)
    }

    /// Active session of a user, cache first.
    pub async fn get_session_by_user_id(&self, user_id: &UserId) -> AuthResult<SessionSummary> {
        let key = cache_key::session(user_id);

        match self.cache.get_struct::<SessionSummary>(&key).await {
            Ok(cached) if cached.is_expired_at(Utc::now()) => {
                tracing::debug!(user_id = %user_id, "Cached session past its expiry");
                return Err(AuthError::SessionExpired);
            }
            Ok(cached) if cached.active => return Ok(cached),
            Ok(_) => tracing::debug!(user_id = %user_id, "Cached session is inactive"),
            Err(e) if e.is_miss() => tracing::debug!(key = %key, "Session cache miss"),
            Err(e) => tracing::warn!(error = %e, key = %key, "Session cache read failed"),
        }

        let session = self
            .session_repo
            .get_active_by_user_id(user_id)
            .await
            .map_err(AuthError::storage("failed to retrieve session"))?
            .ok_or(AuthError::SessionNotFound)?;

        if session.is_expired() {
            return Err(AuthError::SessionExpired);
        }

        let summary = SessionSummary::from(&session);
        self.shadow(&summary).await;
        Ok(summary)
    }

    /// Every session of the caller, newest first.
    pub async fn get_all_sessions(
        &self,
        caller: Option<&AuthUser>,
    ) -> AuthResult<Vec<SessionSummary>> {
        let caller = require(caller)?;

        let sessions = self
            .session_repo
            .get_all_by_user_id(&caller.user_id)
            .await
            .map_err(AuthError::storage("failed to retrieve sessions"))?;

        Ok(sessions.iter().map(SessionSummary::from).collect())
    }

    /// Mint a new access token. The refresh token and session are not rotated.
    pub async fn renew_access_token(&self, refresh_token: &str) -> AuthResult<RenewedAccessToken> {
        let refresh_token = token::strip_bearer(refresh_token);

        let claims = token::verify(&self.config.jwt_secret, refresh_token).map_err(|e| {
            tracing::debug!(error = %e, "Refresh token rejected");
            AuthError::InvalidRefreshToken
        })?;

        let session = self
            .session_repo
            .get_by_refresh_token(refresh_token)
            .await
            .map_err(AuthError::storage("failed to retrieve session"))?
            .ok_or(AuthError::InvalidRefreshToken)?;

        // Second clock: the session row's own expiry.
        if session.is_expired() {
            return Err(AuthError::SessionExpired);
        }

        if session.user_id.as_str() != claims.user_id() {
            tracing::warn!(
                session_id = %session.id,
                session_user = %session.user_id,
                token_user = %claims.user_id(),
                "Refresh token presented against another user's session"
            );
            return Err(AuthError::UserMismatch);
        }

        if !session.active {
            return Err(AuthError::InvalidRefreshToken);
        }

        let (access_token, access_token_expires_at) = token::generate(
            &self.config.jwt_secret,
            session.user_id.as_str(),
            self.config.access_token_ttl,
        )
        .map_err(|e| AuthError::Internal(e.to_string()))?;

        tracing::info!(user_id = %session.user_id, session_id = %session.id, "Access token renewed");

        Ok(RenewedAccessToken {
            access_token,
            access_token_expires_at,
        })
    }

    /// Deactivate every session of a user and drop the cached shadow.
    pub async fn deactivate_all(&self, user_id: &UserId) -> AuthResult<u64> {
        let touched = self
            .session_repo
            .deactivate_all(user_id)
            .await
            .map_err(AuthError::storage("failed to deactivate sessions"))?;

        self.forget(user_id).await;

        tracing::debug!(user_id = %user_id, sessions = touched, "Sessions deactivated");
        Ok(touched)
    }

    // ========================================================================
    // Cache helpers (best effort, never fail the caller)
    // ========================================================================

    async fn shadow(&self, summary: &SessionSummary) {
        let key = cache_key::session(&summary.user_id);
        if let Err(e) = self
            .cache
            .set_struct(&key, summary, self.config.session_cache_ttl)
            .await
        {
            tracing::warn!(error = %e, key = %key, "Failed to cache session");
        }
    }

    pub(crate) async fn forget(&self, user_id: &UserId) {
        let key = cache_key::session(user_id);
        if let Err(e) = self.cache.delete(std::slice::from_ref(&key)).await {
            tracing::warn!(error = %e, key = %key, "Failed to invalidate cached session");
        }
    }

    pub(crate) fn cache(&self) -> &Cache<C> {
        &self.cache
    }
}
