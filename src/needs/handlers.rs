use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{extractors::AuthUser, present},
    error::{AppError, AppResult},
    state::AppState,
};

use super::dto::{
    CreateNeedRequest, HelperResponse, HelpersResponse, NeedResponse, NeedsQuery, NeedsResponse,
    ShareQuery, ShareResponse, UpdateStatusRequest, VolunteerRequest,
};
use super::services::{self, parse_need_id};
use super::share::{share_message, share_url};

pub fn needs_routes() -> Router<AppState> {
    Router::new()
        .route("/needs", get(list_needs).post(create_need))
        .route("/needs/:id", get(get_need))
        .route("/needs/:id/status", patch(update_status))
        .route("/needs/:id/share", get(share_need))
        .route("/needs/:id/helpers", get(list_helpers).post(volunteer))
}

#[instrument(skip(state))]
pub async fn list_needs(
    State(state): State<AppState>,
    Query(q): Query<NeedsQuery>,
) -> AppResult<Json<NeedsResponse>> {
    let neighborhood = present(q.neighborhood)
        .ok_or_else(|| AppError::validation("Neighborhood parameter is required"))?;
    let needs = services::list_needs(state.store.as_ref(), &neighborhood).await?;
    Ok(Json(NeedsResponse { needs }))
}

#[instrument(skip(state, user, payload), fields(user_id = user.id))]
pub async fn create_need(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<CreateNeedRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<NeedResponse>)> {
    let Json(payload) = payload?;
    let draft = payload.into_draft()?;
    let need = services::create_need(state.store.as_ref(), &user, draft).await?;
    Ok((StatusCode::CREATED, Json(NeedResponse { need })))
}

#[instrument(skip(state))]
pub async fn get_need(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<NeedResponse>> {
    let id = parse_need_id(&id)?;
    let need = services::get_need(state.store.as_ref(), id).await?;
    Ok(Json(NeedResponse { need }))
}

#[instrument(skip(state, user, payload), fields(user_id = user.id))]
pub async fn update_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> AppResult<Json<NeedResponse>> {
    let id = parse_need_id(&id)?;
    let Json(payload) = payload?;
    let status = payload
        .status
        .ok_or_else(|| AppError::validation("Missing required fields"))?;
    let need = services::update_status(state.store.as_ref(), &user, id, status).await?;
    Ok(Json(NeedResponse { need }))
}

#[instrument(skip(state))]
pub async fn share_need(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<ShareQuery>,
) -> AppResult<Json<ShareResponse>> {
    let id = parse_need_id(&id)?;
    let need = services::get_need(state.store.as_ref(), id).await?;
    let message = share_message(&need);
    let url = share_url(&message, q.phone.as_deref());
    Ok(Json(ShareResponse { message, url }))
}

#[instrument(skip(state))]
pub async fn list_helpers(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<HelpersResponse>> {
    let id = parse_need_id(&id)?;
    let helpers = services::helpers(state.store.as_ref(), id).await?;
    Ok(Json(HelpersResponse { helpers }))
}

/// The body is optional; `{"message": "..."}` attaches a note for the author.
#[instrument(skip(state, user, payload), fields(user_id = user.id))]
pub async fn volunteer(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    payload: Option<Json<VolunteerRequest>>,
) -> AppResult<(StatusCode, Json<HelperResponse>)> {
    let id = parse_need_id(&id)?;
    let message = payload.and_then(|Json(body)| present(body.message));
    let helper = services::volunteer(state.store.as_ref(), &user, id, message).await?;
    Ok((StatusCode::CREATED, Json(HelperResponse { helper })))
}
