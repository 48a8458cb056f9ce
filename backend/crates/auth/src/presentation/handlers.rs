//! HTTP Handlers

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use kernel::id::UserId;
use platform::cache::CacheStore;
use platform::client::{extract_client_ip, extract_user_agent};

use crate::application::{AuthService, AuthUser, ClientInfo, LoginInput, RegisterInput};
use crate::domain::entity::{SessionSummary, UserSummary};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    LoginRequest, LoginResponse, MessageResponse, RegisterRequest, RegisterResponse,
    RenewAccessTokenRequest, RenewAccessTokenResponse,
};

const UNKNOWN_IP: &str = "unknown";

/// Shared state for auth handlers
pub struct AuthAppState<S, U, C> {
    pub service: AuthService<S, U, C>,
}

impl<S, U, C> Clone for AuthAppState<S, U, C> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

type Caller = Option<Extension<AuthUser>>;

fn caller(ext: &Caller) -> Option<&AuthUser> {
    ext.as_ref().map(|Extension(user)| user)
}

// ============================================================================
// Auth
// ============================================================================

/// POST /auth/register
pub async fn register<S, U, C>(
    State(state): State<AuthAppState<S, U, C>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    S: SessionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    let user_id = state
        .service
        .register(RegisterInput {
            name: req.name,
            username: req.username,
            email: req.email,
            password: req.password,
            avatar_url: req.avatar_url,
        })
        .await?;

    Ok((StatusCode::ACCEPTED, Json(RegisterResponse { user_id })))
}

/// POST /auth/login
pub async fn login<S, U, C>(
    State(state): State<AuthAppState<S, U, C>>,
    headers: HeaderMap,
    connect_info: Option<Extension<ConnectInfo<SocketAddr>>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Json<LoginResponse>>
where
    S: SessionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    let direct_ip = connect_info.map(|Extension(ConnectInfo(addr))| addr.ip());
    let client = ClientInfo {
        ip: extract_client_ip(&headers, direct_ip)
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| UNKNOWN_IP.to_string()),
        user_agent: extract_user_agent(&headers).unwrap_or_default().to_string(),
    };

    let output = state
        .service
        .login(
            LoginInput {
                email: req.email,
                password: req.password,
            },
            client,
        )
        .await?;

    Ok(Json(LoginResponse {
        session_id: output.session_id,
        access_token: output.access_token,
        access_token_expires: output.access_token_expires_at,
        refresh_token: output.refresh_token,
        refresh_token_expires: output.refresh_token_expires_at,
    }))
}

/// GET /auth/me
pub async fn me<S, U, C>(
    State(state): State<AuthAppState<S, U, C>>,
    ext: Caller,
) -> AuthResult<Json<UserSummary>>
where
    S: SessionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    Ok(Json(state.service.get_signed_user(caller(&ext)).await?))
}

/// PATCH /auth/logout
pub async fn logout<S, U, C>(
    State(state): State<AuthAppState<S, U, C>>,
    ext: Caller,
) -> AuthResult<StatusCode>
where
    S: SessionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    state.service.logout(caller(&ext)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /auth/activate/{user_id}
pub async fn activate<S, U, C>(
    State(state): State<AuthAppState<S, U, C>>,
    Path(user_id): Path<String>,
) -> AuthResult<Json<MessageResponse>>
where
    S: SessionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    // A well-formed id of nobody and a malformed one look the same to the client.
    let user_id = UserId::parse(&user_id).map_err(|_| AuthError::UserNotFound)?;
    state.service.activate(&user_id).await?;

    Ok(Json(MessageResponse {
        message: "account activated",
    }))
}

// ============================================================================
// Sessions
// ============================================================================

/// GET /sessions
pub async fn list_sessions<S, U, C>(
    State(state): State<AuthAppState<S, U, C>>,
    ext: Caller,
) -> AuthResult<Json<Vec<SessionSummary>>>
where
    S: SessionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    let sessions = state.service.sessions().get_all_sessions(caller(&ext)).await?;
    Ok(Json(sessions))
}

/// GET /sessions/me
pub async fn current_session<S, U, C>(
    State(state): State<AuthAppState<S, U, C>>,
    ext: Caller,
) -> AuthResult<Json<SessionSummary>>
where
    S: SessionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    let caller = caller(&ext).ok_or(AuthError::Unauthenticated)?;
    let session = state
        .service
        .sessions()
        .get_session_by_user_id(&caller.user_id)
        .await?;
    Ok(Json(session))
}

/// POST /sessions/refresh
pub async fn renew_access_token<S, U, C>(
    State(state): State<AuthAppState<S, U, C>>,
    Json(req): Json<RenewAccessTokenRequest>,
) -> AuthResult<Json<RenewAccessTokenResponse>>
where
    S: SessionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    if req.refresh_token.trim().is_empty() {
        return Err(AuthError::Validation("refresh token is required".into()));
    }

    let renewed = state
        .service
        .sessions()
        .renew_access_token(&req.refresh_token)
        .await?;

    Ok(Json(RenewAccessTokenResponse {
        access_token: renewed.access_token,
        access_token_expires: renewed.access_token_expires_at,
    }))
}
