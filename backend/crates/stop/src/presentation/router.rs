//! Stop Router

use auth::{AccessTokenVerifier, require_auth};
use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::application::StopService;
use crate::domain::repository::StopRepository;
use crate::presentation::handlers::{self, StopAppState};

/// Routes under `/stops`. Reads are public, writes need a bearer token.
pub fn stop_router<R>(service: StopService<R>, verifier: AccessTokenVerifier) -> Router
where
    R: StopRepository + Send + Sync + 'static,
{
    let state = StopAppState { service };
    let auth = middleware::from_fn_with_state(verifier, require_auth);

    Router::new()
        .route(
            "/",
            post(handlers::create::<R>)
                .route_layer(auth.clone())
                .get(handlers::list::<R>),
        )
        .route(
            "/{id}",
            get(handlers::get_by_id::<R>).merge(
                put(handlers::update::<R>)
                    .delete(handlers::inactivate::<R>)
                    .route_layer(auth),
            ),
        )
        .route("/slug/{slug}", get(handlers::get_by_slug::<R>))
        .with_state(state)
}
