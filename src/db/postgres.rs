use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use time::OffsetDateTime;
use tracing::{debug, info};

use super::{Store, DUPLICATE_EMAIL, DUPLICATE_HELPER, NEED_NOT_FOUND};
use crate::{
    auth::repo_types::{NewUser, Session, User, UserRow},
    config::AppConfig,
    error::{AppError, AppResult},
    needs::repo_types::{Helper, HelperRow, Need, NeedRow, NeedStatus, NewNeed},
};

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    /// Applies `migrations/`. Every statement is idempotent, so this runs on
    /// each startup before the listener is bound.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        info!("database schema up to date");
        Ok(())
    }
}

/// Postgres' default name for `helpers.need_id REFERENCES needs(id)`.
const HELPERS_NEED_FK: &str = "helpers_need_id_fkey";

/// Unique violations and a missing referenced need are caller errors. Any
/// other foreign-key failure stays an infrastructure error.
fn write_error(e: sqlx::Error, conflict: &str, what: &'static str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::Conflict(conflict.into());
        }
        if db_err.is_foreign_key_violation() && is_missing_need(db_err.constraint()) {
            return AppError::not_found(NEED_NOT_FOUND);
        }
    }
    AppError::Infrastructure(anyhow::Error::new(e).context(what))
}

fn is_missing_need(constraint: Option<&str>) -> bool {
    constraint == Some(HELPERS_NEED_FK)
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, new: NewUser) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, password_hash, full_name, neighborhood, phone, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, email, full_name, neighborhood, phone, avatar_url, bio, role,
                      created_at, updated_at
            "#,
        )
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.full_name)
        .bind(&new.neighborhood)
        .bind(&new.phone)
        .bind(new.role.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(|e| write_error(e, DUPLICATE_EMAIL, "insert user"))?;
        debug!(user_id = row.id, "user row inserted");
        Ok(row.try_into()?)
    }

    async fn find_user_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, full_name, neighborhood, phone, avatar_url, bio, role,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(row.map(User::try_from).transpose()?)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, full_name, neighborhood, phone, avatar_url, bio, role,
                   created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(row.map(User::try_from).transpose()?)
    }

    async fn password_hash(&self, user_id: i64) -> AppResult<Option<String>> {
        let hash = sqlx::query_scalar::<_, String>(
            r#"SELECT password_hash FROM users WHERE id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("fetch password hash")?;
        Ok(hash)
    }

    async fn create_need(&self, new: NewNeed) -> AppResult<Need> {
        let row = sqlx::query_as::<_, NeedRow>(
            r#"
            INSERT INTO needs (user_id, title, description, category, neighborhood, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, title, description, category, status, neighborhood,
                      created_at, updated_at, expires_at
            "#,
        )
        .bind(new.user_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.category)
        .bind(&new.neighborhood)
        .bind(new.expires_at)
        .fetch_one(&self.db)
        .await
        .context("insert need")?;
        Ok(row.try_into()?)
    }

    async fn needs_by_neighborhood(&self, neighborhood: &str) -> AppResult<Vec<Need>> {
        let rows = sqlx::query_as::<_, NeedRow>(
            r#"
            SELECT id, user_id, title, description, category, status, neighborhood,
                   created_at, updated_at, expires_at
            FROM needs
            WHERE neighborhood = $1 AND status <> 'completed'
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(neighborhood)
        .fetch_all(&self.db)
        .await
        .context("list needs by neighborhood")?;
        Ok(rows
            .into_iter()
            .map(Need::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?)
    }

    async fn find_need(&self, id: i64) -> AppResult<Option<Need>> {
        let row = sqlx::query_as::<_, NeedRow>(
            r#"
            SELECT id, user_id, title, description, category, status, neighborhood,
                   created_at, updated_at, expires_at
            FROM needs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find need")?;
        Ok(row.map(Need::try_from).transpose()?)
    }

    async fn update_need_status(&self, id: i64, status: NeedStatus) -> AppResult<Option<Need>> {
        let row = sqlx::query_as::<_, NeedRow>(
            r#"
            UPDATE needs
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, user_id, title, description, category, status, neighborhood,
                      created_at, updated_at, expires_at
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.db)
        .await
        .context("update need status")?;
        Ok(row.map(Need::try_from).transpose()?)
    }

    async fn assign_helper(
        &self,
        need_id: i64,
        user_id: i64,
        message: Option<String>,
    ) -> AppResult<Helper> {
        let row = sqlx::query_as::<_, HelperRow>(
            r#"
            INSERT INTO helpers (need_id, user_id, message)
            VALUES ($1, $2, $3)
            RETURNING id, need_id, user_id, status, message, created_at
            "#,
        )
        .bind(need_id)
        .bind(user_id)
        .bind(message)
        .fetch_one(&self.db)
        .await
        .map_err(|e| write_error(e, DUPLICATE_HELPER, "insert helper"))?;
        Ok(row.try_into()?)
    }

    async fn helpers_for_need(&self, need_id: i64) -> AppResult<Vec<Helper>> {
        let rows = sqlx::query_as::<_, HelperRow>(
            r#"
            SELECT id, need_id, user_id, status, message, created_at
            FROM helpers
            WHERE need_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(need_id)
        .fetch_all(&self.db)
        .await
        .context("list helpers for need")?;
        Ok(rows
            .into_iter()
            .map(Helper::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?)
    }

    async fn create_session(
        &self,
        token: &str,
        user_id: i64,
        expires_at: OffsetDateTime,
    ) -> AppResult<Session> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (id, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, expires_at, created_at
            "#,
        )
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(&self.db)
        .await
        .context("insert session")?;
        Ok(session)
    }

    async fn find_active_session(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> AppResult<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, expires_at, created_at
            FROM sessions
            WHERE id = $1 AND expires_at > $2
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.db)
        .await
        .context("find active session")?;
        Ok(session)
    }

    async fn delete_session(&self, token: &str) -> AppResult<()> {
        sqlx::query(r#"DELETE FROM sessions WHERE id = $1"#)
            .bind(token)
            .execute(&self.db)
            .await
            .context("delete session")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_need_reference_means_need_not_found() {
        assert!(is_missing_need(Some("helpers_need_id_fkey")));
        assert!(!is_missing_need(Some("helpers_user_id_fkey")));
        assert!(!is_missing_need(None));
    }

    #[test]
    fn other_driver_errors_are_infrastructure() {
        let err = write_error(sqlx::Error::RowNotFound, DUPLICATE_HELPER, "insert helper");
        assert!(matches!(err, AppError::Infrastructure(_)));
    }
}
