use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::{Query, QueryRejection};
use eventhub_event::{
    CreateEventInput, EventDetail, EventDocument, EventFilter, EventSummary, LikeToggle,
    ListParams, ParticipationToggle,
};
use futures::TryStreamExt;
use serde_json::{Value, json};
use ulid::Ulid;

use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    routes::ApiJson,
    server::AppState,
};

fn event_id(raw: &str) -> AppResult<Ulid> {
    Ulid::from_str(raw).map_err(|_| eventhub_shared::Error::NotFound("event".to_owned()).into())
}

#[tracing::instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(input): ApiJson<CreateEventInput>,
) -> AppResult<(StatusCode, Json<EventDocument>)> {
    let event = state.event_command.create(user.id()?, input).await?;

    Ok((StatusCode::CREATED, Json(event)))
}

#[tracing::instrument(skip_all)]
pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> AppResult<Json<Vec<EventSummary>>> {
    let Query(params) =
        params.map_err(|rejection| AppError::BadRequest(rejection.to_string()))?;
    let filter = EventFilter::try_from(params)?;

    let events = state
        .event_query
        .list(filter)
        .await?
        .try_collect::<Vec<_>>()
        .await?;

    Ok(Json(events))
}

#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn detail(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<EventDetail>> {
    let event = state.event_query.find(event_id(&id)?, user.id()?).await?;

    Ok(Json(event))
}

#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn like(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<LikeToggle>> {
    let toggled = state
        .event_command
        .toggle_like(event_id(&id)?, user.id()?)
        .await?;

    Ok(Json(toggled))
}

#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn participate(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<ParticipationToggle>> {
    let toggled = state
        .event_command
        .toggle_participation(event_id(&id)?, user.id()?)
        .await?;

    Ok(Json(toggled))
}

#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    state
        .event_command
        .delete(event_id(&id)?, user.id()?)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Event deleted successfully",
    })))
}
