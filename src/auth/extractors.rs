use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tower_cookies::Cookies;

use super::{repo_types::User, session::current_user};
use crate::{error::AppError, state::AppState};

/// Resolves the session cookie; `None` for anonymous callers.
pub struct MaybeUser(pub Option<User>);

/// Like `MaybeUser`, but rejects anonymous callers with 401.
pub struct AuthUser(pub User);

async fn cookies(parts: &mut Parts, state: &AppState) -> Result<Cookies, AppError> {
    Cookies::from_request_parts(parts, state)
        .await
        .map_err(|(_, msg)| AppError::Infrastructure(anyhow::anyhow!(msg)))
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookies = cookies(parts, state).await?;
        Ok(MaybeUser(current_user(state, &cookies).await?))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;
        user.map(AuthUser).ok_or_else(AppError::not_authenticated)
    }
}
