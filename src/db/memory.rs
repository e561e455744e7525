use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use super::{Store, DUPLICATE_EMAIL, DUPLICATE_HELPER, NEED_NOT_FOUND};
use crate::{
    auth::repo_types::{NewUser, Session, User},
    error::{AppError, AppResult},
    needs::repo_types::{Helper, HelperStatus, Need, NeedStatus, NewNeed},
};

#[derive(Default)]
struct Tables {
    users: Vec<(User, String)>,
    needs: Vec<Need>,
    helpers: Vec<Helper>,
    sessions: Vec<Session>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-process `Store` with the same uniqueness and expiry rules as the
/// Postgres schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn session_count(&self) -> usize {
        self.tables.lock().await.sessions.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, new: NewUser) -> AppResult<User> {
        let mut t = self.tables.lock().await;
        if t.users.iter().any(|(u, _)| u.email == new.email) {
            return Err(AppError::Conflict(DUPLICATE_EMAIL.into()));
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: t.next_id(),
            email: new.email,
            full_name: new.full_name,
            neighborhood: new.neighborhood,
            phone: new.phone,
            avatar_url: None,
            bio: None,
            role: new.role,
            created_at: now,
            updated_at: now,
        };
        t.users.push((user.clone(), new.password_hash));
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let t = self.tables.lock().await;
        Ok(t.users.iter().find(|(u, _)| u.id == id).map(|(u, _)| u.clone()))
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let t = self.tables.lock().await;
        Ok(t
            .users
            .iter()
            .find(|(u, _)| u.email == email)
            .map(|(u, _)| u.clone()))
    }

    async fn password_hash(&self, user_id: i64) -> AppResult<Option<String>> {
        let t = self.tables.lock().await;
        Ok(t
            .users
            .iter()
            .find(|(u, _)| u.id == user_id)
            .map(|(_, h)| h.clone()))
    }

    async fn create_need(&self, new: NewNeed) -> AppResult<Need> {
        let mut t = self.tables.lock().await;
        let now = OffsetDateTime::now_utc();
        let need = Need {
            id: t.next_id(),
            user_id: new.user_id,
            title: new.title,
            description: new.description,
            category: new.category,
            status: NeedStatus::Open,
            neighborhood: new.neighborhood,
            created_at: now,
            updated_at: now,
            expires_at: new.expires_at,
        };
        t.needs.push(need.clone());
        Ok(need)
    }

    async fn needs_by_neighborhood(&self, neighborhood: &str) -> AppResult<Vec<Need>> {
        let t = self.tables.lock().await;
        let mut needs: Vec<Need> = t
            .needs
            .iter()
            .filter(|n| n.neighborhood == neighborhood && n.status != NeedStatus::Completed)
            .cloned()
            .collect();
        needs.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(needs)
    }

    async fn find_need(&self, id: i64) -> AppResult<Option<Need>> {
        let t = self.tables.lock().await;
        Ok(t.needs.iter().find(|n| n.id == id).cloned())
    }

    async fn update_need_status(&self, id: i64, status: NeedStatus) -> AppResult<Option<Need>> {
        let mut t = self.tables.lock().await;
        Ok(t.needs.iter_mut().find(|n| n.id == id).map(|n| {
            n.status = status;
            n.updated_at = OffsetDateTime::now_utc();
            n.clone()
        }))
    }

    async fn assign_helper(
        &self,
        need_id: i64,
        user_id: i64,
        message: Option<String>,
    ) -> AppResult<Helper> {
        let mut t = self.tables.lock().await;
        if !t.needs.iter().any(|n| n.id == need_id) {
            return Err(AppError::not_found(NEED_NOT_FOUND));
        }
        if t
            .helpers
            .iter()
            .any(|h| h.need_id == need_id && h.user_id == user_id)
        {
            return Err(AppError::Conflict(DUPLICATE_HELPER.into()));
        }
        let helper = Helper {
            id: t.next_id(),
            need_id,
            user_id,
            status: HelperStatus::Assigned,
            message,
            created_at: OffsetDateTime::now_utc(),
        };
        t.helpers.push(helper.clone());
        Ok(helper)
    }

    async fn helpers_for_need(&self, need_id: i64) -> AppResult<Vec<Helper>> {
        let t = self.tables.lock().await;
        let mut helpers: Vec<Helper> = t
            .helpers
            .iter()
            .filter(|h| h.need_id == need_id)
            .cloned()
            .collect();
        helpers.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(helpers)
    }

    async fn create_session(
        &self,
        token: &str,
        user_id: i64,
        expires_at: OffsetDateTime,
    ) -> AppResult<Session> {
        let mut t = self.tables.lock().await;
        if t.sessions.iter().any(|s| s.id == token) {
            return Err(AppError::Infrastructure(anyhow::anyhow!(
                "duplicate session id"
            )));
        }
        let session = Session {
            id: token.to_string(),
            user_id,
            expires_at,
            created_at: OffsetDateTime::now_utc(),
        };
        t.sessions.push(session.clone());
        Ok(session)
    }

    async fn find_active_session(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> AppResult<Option<Session>> {
        let t = self.tables.lock().await;
        Ok(t
            .sessions
            .iter()
            .find(|s| s.id == token && now < s.expires_at)
            .cloned())
    }

    async fn delete_session(&self, token: &str) -> AppResult<()> {
        let mut t = self.tables.lock().await;
        t.sessions.retain(|s| s.id != token);
        Ok(())
    }
}
