//! Server-side sessions and the cookie that carries them.
//!
//! A session is `active` while `now < expires_at` and `absent` otherwise.
//! Expiry is never acted on eagerly: the lookup filters expired rows and
//! the stale record is deleted the next time its token is presented.

use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use time::{Duration, OffsetDateTime};
use tower_cookies::{cookie::SameSite, Cookie, Cookies};
use tracing::{debug, info};

use crate::{
    auth::repo_types::{Session, User},
    config::SessionConfig,
    db::Store,
    error::AppResult,
    state::AppState,
};

pub const SESSION_COOKIE_NAME: &str = "dir_khir_session";

const TOKEN_LEN: usize = 48;

/// 48 alphanumeric characters from the OS CSPRNG (~285 bits).
pub fn generate_token() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

pub fn session_ttl(cfg: &SessionConfig) -> Duration {
    Duration::days(cfg.ttl_days)
}

pub async fn issue_session(
    store: &dyn Store,
    cfg: &SessionConfig,
    user_id: i64,
    now: OffsetDateTime,
) -> AppResult<Session> {
    let token = generate_token();
    let session = store
        .create_session(&token, user_id, now + session_ttl(cfg))
        .await?;
    debug!(user_id, expires_at = %session.expires_at, "session issued");
    Ok(session)
}

/// Resolves a token to its user. Missing, expired or orphaned sessions
/// resolve to `None` and their record is removed.
pub async fn resolve_session(
    store: &dyn Store,
    token: &str,
    now: OffsetDateTime,
) -> AppResult<Option<User>> {
    let Some(session) = store.find_active_session(token, now).await? else {
        store.delete_session(token).await?;
        debug!("session missing or expired");
        return Ok(None);
    };

    match store.find_user_by_id(session.user_id).await? {
        Some(user) => Ok(Some(user)),
        None => {
            store.delete_session(token).await?;
            debug!(user_id = session.user_id, "session owner no longer exists");
            Ok(None)
        }
    }
}

pub fn session_cookie(token: String, cfg: &SessionConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cfg.secure_cookie)
        .path("/")
        .max_age(session_ttl(cfg))
        .build()
}

fn clear_cookie(cookies: &Cookies) {
    cookies.remove(Cookie::build((SESSION_COOKIE_NAME, "")).path("/").build());
}

/// Issues a session for `user_id` and attaches its cookie to the response.
pub async fn start_session(state: &AppState, cookies: &Cookies, user_id: i64) -> AppResult<()> {
    let cfg = &state.config.session;
    let session = issue_session(
        state.store.as_ref(),
        cfg,
        user_id,
        OffsetDateTime::now_utc(),
    )
    .await?;
    cookies.add(session_cookie(session.id, cfg));
    Ok(())
}

/// The signed-in user, or `None` for anonymous callers. A stale cookie is
/// cleared as a side effect.
pub async fn current_user(state: &AppState, cookies: &Cookies) -> AppResult<Option<User>> {
    let Some(cookie) = cookies.get(SESSION_COOKIE_NAME) else {
        return Ok(None);
    };

    let user = resolve_session(
        state.store.as_ref(),
        cookie.value(),
        OffsetDateTime::now_utc(),
    )
    .await?;
    if user.is_none() {
        clear_cookie(cookies);
    }
    Ok(user)
}

/// Deletes the caller's session if any and always clears the cookie.
pub async fn end_session(state: &AppState, cookies: &Cookies) -> AppResult<()> {
    if let Some(cookie) = cookies.get(SESSION_COOKIE_NAME) {
        state.store.delete_session(cookie.value()).await?;
        info!("session revoked");
    }
    clear_cookie(cookies);
    Ok(())
}
