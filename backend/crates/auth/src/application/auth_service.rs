//! Auth Service
//!
//! Registration, login, logout, activation and the signed-in profile.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::{SessionId, UserId};
use platform::cache::{Cache, CacheStore};
use platform::password::{ClearTextPassword, HashedPassword, PasswordHashing};
use platform::token;
use tokio::sync::OnceCell;

use crate::application::auth_user::{AuthUser, require};
use crate::application::cache_key;
use crate::application::config::AuthConfig;
use crate::application::session_service::SessionService;
use crate::domain::entity::{User, UserSummary};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{Email, UserName};
use crate::error::{AuthError, AuthResult};

/// Verified in place of a real hash when the e-mail matches no account.
const DUMMY_PASSWORD: &str = "no-account-placeholder-password";

/// Registration input
pub struct RegisterInput {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub avatar_url: Option<String>,
}

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Where a login came from
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub ip: String,
    /// Raw `User-Agent` header
    pub user_agent: String,
}

/// Login output
#[derive(Debug, Clone)]
pub struct LoginOutput {
    pub session_id: SessionId,
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_token_expires_at: DateTime<Utc>,
}

pub struct AuthService<S, U, C> {
    sessions: SessionService<S, U, C>,
    session_repo: Arc<S>,
    user_repo: Arc<U>,
    cache: Cache<C>,
    hashing: PasswordHashing,
    dummy_hash: Arc<OnceCell<HashedPassword>>,
    config: Arc<AuthConfig>,
}

impl<S, U, C> Clone for AuthService<S, U, C> {
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
            session_repo: Arc::clone(&self.session_repo),
            user_repo: Arc::clone(&self.user_repo),
            cache: self.cache.clone(),
            hashing: self.hashing.clone(),
            dummy_hash: Arc::clone(&self.dummy_hash),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S, U, C> AuthService<S, U, C>
where
    S: SessionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    pub fn new(
        sessions: SessionService<S, U, C>,
        session_repo: Arc<S>,
        user_repo: Arc<U>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            cache: sessions.cache().clone(),
            sessions,
            session_repo,
            user_repo,
            hashing: config.password_hashing(),
            dummy_hash: Arc::new(OnceCell::new()),
            config,
        }
    }

    pub fn sessions(&self) -> &SessionService<S, U, C> {
        &self.sessions
    }

    // ========================================================================
    // Register
    // ========================================================================

    /// Create a disabled user. Returns the new user's id.
    pub async fn register(&self, input: RegisterInput) -> AuthResult<UserId> {
        let email = Email::new(&input.email)?;
        let username = UserName::new(&input.username)?;
        let password = ClearTextPassword::new(input.password)
            .map_err(|e| AuthError::InvalidEntity(e.to_string()))?;

        if self
            .user_repo
            .get_by_email(email.as_str())
            .await
            .map_err(AuthError::storage("failed to check e-mail"))?
            .is_some()
        {
            return Err(AuthError::EmailTaken);
        }
        if self
            .user_repo
            .get_by_username(username.as_str())
            .await
            .map_err(AuthError::storage("failed to check username"))?
            .is_some()
        {
            return Err(AuthError::UsernameTaken);
        }

        let hashed = self.hash(password).await?;
        let user = User::new(input.name, username, email, hashed, input.avatar_url)?;

        self.user_repo
            .insert(&user)
            .await
            .map_err(AuthError::storage("failed to create user"))?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user.id)
    }

    // ========================================================================
    // Login
    // ========================================================================

    /// Verify credentials and open the user's only active session.
    pub async fn login(&self, input: LoginInput, client: ClientInfo) -> AuthResult<LoginOutput> {
        let Ok(email) = Email::new(&input.email) else {
            tracing::debug!("Login with malformed e-mail");
            self.verify_dummy(input.password).await?;
            return Err(AuthError::InvalidCredentials);
        };

        let Some(user) = self
            .user_repo
            .get_by_email(email.as_str())
            .await
            .map_err(AuthError::storage("failed to retrieve user"))?
        else {
            tracing::info!("Login for unknown e-mail");
            self.verify_dummy(input.password).await?;
            return Err(AuthError::InvalidCredentials);
        };

        let password = ClearTextPassword::for_verification(input.password);
        if !self.verify(password, user.password.clone()).await? {
            tracing::info!(user_id = %user.id, "Login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }
        if user.locked {
            return Err(AuthError::AccountLocked);
        }
        if !user.enabled {
            return Err(AuthError::AccountDisabled);
        }

        // Must land before the new row to keep a single active session.
        self.sessions.deactivate_all(&user.id).await?;

        let (access_token, access_token_expires_at) = token::generate(
            &self.config.jwt_secret,
            user.id.as_str(),
            self.config.access_token_ttl,
        )
        .map_err(|e| AuthError::Internal(e.to_string()))?;
        let (refresh_token, refresh_token_expires_at) = token::generate(
            &self.config.jwt_secret,
            user.id.as_str(),
            self.config.refresh_token_ttl,
        )
        .map_err(|e| AuthError::Internal(e.to_string()))?;

        let session = self
            .sessions
            .create_session(&user.id, &client.ip, &client.user_agent, &refresh_token)
            .await?;

        tracing::info!(user_id = %user.id, session_id = %session.id, "User logged in");

        Ok(LoginOutput {
            session_id: session.id,
            access_token,
            access_token_expires_at,
            refresh_token,
            refresh_token_expires_at,
        })
    }

    // ========================================================================
    // Logout
    // ========================================================================

    /// Deactivate the caller's active session.
    pub async fn logout(&self, caller: Option<&AuthUser>) -> AuthResult<()> {
        let caller = require(caller)?;

        let mut session = self
            .session_repo
            .get_active_by_user_id(&caller.user_id)
            .await
            .map_err(AuthError::storage("failed to retrieve session"))?
            .ok_or(AuthError::ActiveSessionNotFound)?;

        session.deactivate();
        self.session_repo
            .update(&session)
            .await
            .map_err(AuthError::storage("failed to update session"))?;

        self.sessions.forget(&caller.user_id).await;

        // Survives client disconnects; a read racing the logout may have
        // put the shadow back.
        let cache = self.cache.clone();
        let key = cache_key::session(&caller.user_id);
        tokio::spawn(async move {
            match cache.has(&key).await {
                Ok(true) => {
                    if let Err(e) = cache.delete(std::slice::from_ref(&key)).await {
                        tracing::warn!(error = %e, key = %key, "Deferred session cache cleanup failed");
                    }
                }
                Ok(false) => {}
                Err(e) => tracing::warn!(error = %e, key = %key, "Deferred session cache check failed"),
            }
        });

        tracing::info!(user_id = %caller.user_id, session_id = %session.id, "User logged out");
        Ok(())
    }

    // ========================================================================
    // Activate
    // ========================================================================

    /// Enable a registered user. A second activation is an expired link.
    pub async fn activate(&self, user_id: &UserId) -> AuthResult<()> {
        let mut user = self
            .user_repo
            .get_by_id(user_id)
            .await
            .map_err(AuthError::storage("failed to retrieve user"))?
            .ok_or(AuthError::UserNotFound)?;

        if user.is_activated() {
            return Err(AuthError::ActivationExpired);
        }

        user.activate();
        self.user_repo
            .update(&user)
            .await
            .map_err(AuthError::storage("failed to activate user"))?;

        let key = cache_key::user(user_id);
        if let Err(e) = self.cache.delete(std::slice::from_ref(&key)).await {
            tracing::warn!(error = %e, key = %key, "Failed to invalidate cached user");
        }

        tracing::info!(user_id = %user.id, "User activated");
        Ok(())
    }

    // ========================================================================
    // Signed user
    // ========================================================================

    /// Profile of the caller, cache first.
    pub async fn get_signed_user(&self, caller: Option<&AuthUser>) -> AuthResult<UserSummary> {
        let caller = require(caller)?;
        let key = cache_key::user(&caller.user_id);

        match self.cache.get_struct::<UserSummary>(&key).await {
            Ok(cached) => return Ok(cached),
            Err(e) if e.is_miss() => tracing::debug!(key = %key, "User cache miss"),
            Err(e) => tracing::warn!(error = %e, key = %key, "User cache read failed"),
        }

        let user = self
            .user_repo
            .get_by_id(&caller.user_id)
            .await
            .map_err(AuthError::storage("failed to retrieve user"))?
            .ok_or(AuthError::UserNotFound)?;

        let summary = UserSummary::from(&user);
        if let Err(e) = self
            .cache
            .set_struct(&key, &summary, self.config.user_cache_ttl)
            .await
        {
            tracing::warn!(error = %e, key = %key, "Failed to cache user");
        }
        Ok(summary)
    }

    // ========================================================================
    // Hashing off the async executor
    // ========================================================================

    async fn hash(&self, password: ClearTextPassword) -> AuthResult<HashedPassword> {
        let hashing = self.hashing.clone();
        tokio::task::spawn_blocking(move || hashing.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))?
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// One verification against a fixed hash, so an unknown account costs
    /// the same as a wrong password.
    async fn verify_dummy(&self, password: String) -> AuthResult<()> {
        let hashed = self
            .dummy_hash
            .get_or_try_init(|| {
                self.hash(ClearTextPassword::for_verification(DUMMY_PASSWORD.to_string()))
            })
            .await?
            .clone();
        self.verify(ClearTextPassword::for_verification(password), hashed)
            .await?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn has_dummy_hash(&self) -> bool {
        self.dummy_hash.initialized()
    }

    async fn verify(&self, password: ClearTextPassword, hashed: HashedPassword) -> AuthResult<bool> {
        let hashing = self.hashing.clone();
        tokio::task::spawn_blocking(move || hashing.matches(&password, &hashed))
            .await
            .map_err(|e| AuthError::Internal(format!("verification task failed: {e}")))
    }
}
