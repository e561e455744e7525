use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_cookies::Cookies;
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, MessageResponse, RegisterRequest, UserResponse},
        extractors::MaybeUser,
        services::{login_user, register_user},
        session::{end_session, start_session},
    },
    error::AppResult,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

#[instrument(skip(state, cookies, payload))]
pub async fn register(
    State(state): State<AppState>,
    cookies: Cookies,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let Json(payload) = payload?;
    let registration = payload.into_registration()?;
    let user = register_user(state.store.as_ref(), &state.config, registration).await?;
    start_session(&state, &cookies, user.id).await?;
    Ok((StatusCode::CREATED, Json(UserResponse { user: Some(user) })))
}

#[instrument(skip(state, cookies, payload))]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<UserResponse>> {
    let Json(payload) = payload?;
    let (email, password) = payload.credentials()?;
    let user = login_user(state.store.as_ref(), &email, &password).await?;
    start_session(&state, &cookies, user.id).await?;
    Ok(Json(UserResponse { user: Some(user) }))
}

#[instrument(skip(state, cookies))]
pub async fn logout(
    State(state): State<AppState>,
    cookies: Cookies,
) -> AppResult<Json<MessageResponse>> {
    end_session(&state, &cookies).await?;
    Ok(Json(MessageResponse {
        message: "Logged out successfully",
    }))
}

#[instrument(skip(user))]
pub async fn get_me(MaybeUser(user): MaybeUser) -> Json<UserResponse> {
    Json(UserResponse { user })
}
