//! Persistence layer: one `Store` interface over users, needs, helper
//! assignments and sessions.

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    auth::repo_types::{NewUser, Session, User},
    error::AppResult,
    needs::repo_types::{Helper, Need, NeedStatus, NewNeed},
};

#[cfg(test)]
pub mod memory;
mod postgres;

pub use postgres::PgStore;

pub const DUPLICATE_EMAIL: &str = "User with this email already exists";
pub const DUPLICATE_HELPER: &str = "You are already helping with this need";
pub const NEED_NOT_FOUND: &str = "Need not found";

/// Storage contract used by the auth and needs services.
///
/// Writes return the full resulting record. Uniqueness violations come back
/// as `AppError::Conflict`, everything the caller cannot act on as
/// `AppError::Infrastructure`.
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_user(&self, new: NewUser) -> AppResult<User>;
    async fn find_user_by_id(&self, id: i64) -> AppResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn password_hash(&self, user_id: i64) -> AppResult<Option<String>>;

    async fn create_need(&self, new: NewNeed) -> AppResult<Need>;
    /// Open and in-progress needs of a neighborhood, newest first.
    async fn needs_by_neighborhood(&self, neighborhood: &str) -> AppResult<Vec<Need>>;
    async fn find_need(&self, id: i64) -> AppResult<Option<Need>>;
    async fn update_need_status(&self, id: i64, status: NeedStatus) -> AppResult<Option<Need>>;

    /// Fails with `Conflict` when the user already helps with the need and
    /// with `NotFound` when the need does not exist.
    async fn assign_helper(
        &self,
        need_id: i64,
        user_id: i64,
        message: Option<String>,
    ) -> AppResult<Helper>;
    async fn helpers_for_need(&self, need_id: i64) -> AppResult<Vec<Helper>>;

    async fn create_session(
        &self,
        token: &str,
        user_id: i64,
        expires_at: OffsetDateTime,
    ) -> AppResult<Session>;
    /// Only returns sessions whose expiry is after `now`.
    async fn find_active_session(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> AppResult<Option<Session>>;
    /// No-op when the session does not exist.
    async fn delete_session(&self, token: &str) -> AppResult<()>;
}
