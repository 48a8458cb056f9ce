//! HTTP Handlers

use auth::AuthUser;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use kernel::id::StopId;

use crate::application::{CreateStopInput, StopService};
use crate::domain::repository::StopRepository;
use crate::error::{StopError, StopResult};
use crate::presentation::dto::{CreateStopRequest, StopResponse, UpdateStopRequest};

pub struct StopAppState<R> {
    pub service: StopService<R>,
}

impl<R> Clone for StopAppState<R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

/// Unknown and malformed ids are both "not found".
fn parse_id(raw: &str) -> StopResult<StopId> {
    StopId::parse(raw).map_err(|_| StopError::NotFound)
}

/// GET /stops
pub async fn list<R>(State(state): State<StopAppState<R>>) -> StopResult<Json<Vec<StopResponse>>>
where
    R: StopRepository + Send + Sync + 'static,
{
    let stops = state.service.list_stops().await?;
    Ok(Json(stops.iter().map(StopResponse::from).collect()))
}

/// POST /stops
pub async fn create<R>(
    State(state): State<StopAppState<R>>,
    Extension(caller): Extension<AuthUser>,
    Json(req): Json<CreateStopRequest>,
) -> StopResult<impl IntoResponse>
where
    R: StopRepository + Send + Sync + 'static,
{
    let stop = state
        .service
        .create_stop(CreateStopInput {
            name: req.name,
            latitude: req.latitude,
            longitude: req.longitude,
            security_rating: req.security_rating,
        })
        .await?;

    tracing::debug!(user_id = %caller.user_id, stop_id = %stop.id, "Stop created by user");
    Ok((StatusCode::CREATED, Json(StopResponse::from(&stop))))
}

/// GET /stops/{id}
pub async fn get_by_id<R>(
    State(state): State<StopAppState<R>>,
    Path(id): Path<String>,
) -> StopResult<Json<StopResponse>>
where
    R: StopRepository + Send + Sync + 'static,
{
    let stop = state.service.get_stop_by_id(&parse_id(&id)?).await?;
    Ok(Json(StopResponse::from(&stop)))
}

/// GET /stops/slug/{slug}
pub async fn get_by_slug<R>(
    State(state): State<StopAppState<R>>,
    Path(slug): Path<String>,
) -> StopResult<Json<StopResponse>>
where
    R: StopRepository + Send + Sync + 'static,
{
    let stop = state.service.get_stop_by_slug(&slug).await?;
    Ok(Json(StopResponse::from(&stop)))
}

/// PUT /stops/{id}
pub async fn update<R>(
    State(state): State<StopAppState<R>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStopRequest>,
) -> StopResult<Json<StopResponse>>
where
    R: StopRepository + Send + Sync + 'static,
{
    let stop = state
        .service
        .update_stop(&parse_id(&id)?, req.into())
        .await?;
    Ok(Json(StopResponse::from(&stop)))
}

/// DELETE /stops/{id}
pub async fn inactivate<R>(
    State(state): State<StopAppState<R>>,
    Path(id): Path<String>,
) -> StopResult<StatusCode>
where
    R: StopRepository + Send + Sync + 'static,
{
    state.service.inactivate_stop(&parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
