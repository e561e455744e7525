use time::OffsetDateTime;
use tracing::{info, warn};

use crate::{
    auth::repo_types::{Role, User},
    db::{Store, NEED_NOT_FOUND},
    error::{AppError, AppResult},
    needs::repo_types::{Helper, Need, NeedStatus, NewNeed},
};

#[derive(Debug, Clone)]
pub struct NeedDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub expires_at: Option<OffsetDateTime>,
}

pub fn parse_need_id(raw: &str) -> AppResult<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::validation("Invalid need ID"))
}

/// Posts a need in the author's own neighborhood.
pub async fn create_need(store: &dyn Store, author: &User, draft: NeedDraft) -> AppResult<Need> {
    let need = store
        .create_need(NewNeed {
            user_id: author.id,
            title: draft.title,
            description: draft.description,
            category: draft.category,
            neighborhood: author.neighborhood.clone(),
            expires_at: draft.expires_at,
        })
        .await?;
    info!(
        need_id = need.id,
        user_id = author.id,
        neighborhood = %need.neighborhood,
        "need created"
    );
    Ok(need)
}

pub async fn list_needs(store: &dyn Store, neighborhood: &str) -> AppResult<Vec<Need>> {
    store.needs_by_neighborhood(neighborhood).await
}

pub async fn get_need(store: &dyn Store, id: i64) -> AppResult<Need> {
    store
        .find_need(id)
        .await?
        .ok_or_else(|| AppError::not_found(NEED_NOT_FOUND))
}

/// Only the author of a need or an admin may change its status.
pub async fn update_status(
    store: &dyn Store,
    actor: &User,
    id: i64,
    status: NeedStatus,
) -> AppResult<Need> {
    let need = get_need(store, id).await?;
    if need.user_id != actor.id && actor.role != Role::Admin {
        warn!(need_id = id, user_id = actor.id, "status change refused");
        return Err(AppError::Forbidden(
            "Only the author or an admin can change this need".into(),
        ));
    }
    let updated = store
        .update_need_status(id, status)
        .await?
        .ok_or_else(|| AppError::not_found(NEED_NOT_FOUND))?;
    info!(need_id = id, status = status.as_str(), "need status updated");
    Ok(updated)
}

pub async fn volunteer(
    store: &dyn Store,
    helper: &User,
    need_id: i64,
    message: Option<String>,
) -> AppResult<Helper> {
    let assignment = store.assign_helper(need_id, helper.id, message).await?;
    info!(need_id, user_id = helper.id, "helper assigned");
    Ok(assignment)
}

pub async fn helpers(store: &dyn Store, need_id: i64) -> AppResult<Vec<Helper>> {
    store.helpers_for_need(need_id).await
}
