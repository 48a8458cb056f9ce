//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use platform::cache::CacheStore;

use crate::application::AuthService;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AccessTokenVerifier, require_auth};

/// Routes under `/auth`
pub fn auth_router<S, U, C>(service: AuthService<S, U, C>, verifier: AccessTokenVerifier) -> Router
where
    S: SessionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    let state = AuthAppState { service };

    let protected = Router::new()
        .route("/me", get(handlers::me::<S, U, C>))
        .route("/logout", patch(handlers::logout::<S, U, C>))
        .route_layer(middleware::from_fn_with_state(verifier, require_auth));

    Router::new()
        .route("/register", post(handlers::register::<S, U, C>))
        .route("/login", post(handlers::login::<S, U, C>))
        .route("/activate/{user_id}", get(handlers::activate::<S, U, C>))
        .merge(protected)
        .with_state(state)
}

/// Routes under `/sessions`
pub fn session_router<S, U, C>(
    service: AuthService<S, U, C>,
    verifier: AccessTokenVerifier,
) -> Router
where
    S: SessionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    let state = AuthAppState { service };

    let protected = Router::new()
        .route("/", get(handlers::list_sessions::<S, U, C>))
        .route("/me", get(handlers::current_session::<S, U, C>))
        .route_layer(middleware::from_fn_with_state(verifier, require_auth));

    Router::new()
        .route("/refresh", post(handlers::renew_access_token::<S, U, C>))
        .merge(protected)
        .with_state(state)
}
