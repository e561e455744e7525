use serde::Deserialize;

const DEFAULT_SESSION_TTL_DAYS: i64 = 30;
/// Keeps `now + ttl` and the cookie `Max-Age` well inside `time`'s range.
const MAX_SESSION_TTL_DAYS: i64 = 365;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub ttl_days: i64,
    pub secure_cookie: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub session: SessionConfig,
    /// Server-side code required to self-register with the `admin` role.
    /// Admin registration is refused when unset.
    pub admin_invite_code: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let session = SessionConfig {
            ttl_days: session_ttl_days(std::env::var("SESSION_TTL_DAYS").ok().as_deref()),
            secure_cookie: is_production(std::env::var("APP_ENV").ok().as_deref()),
        };
        let admin_invite_code = std::env::var("ADMIN_INVITE_CODE")
            .ok()
            .filter(|v| !v.trim().is_empty());
        Ok(Self {
            database_url,
            max_connections,
            session,
            admin_invite_code,
        })
    }
}

/// Unparseable or out-of-range values fall back to the default.
fn session_ttl_days(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|d| (1..=MAX_SESSION_TTL_DAYS).contains(d))
        .unwrap_or(DEFAULT_SESSION_TTL_DAYS)
}

fn is_production(app_env: Option<&str>) -> bool {
    matches!(app_env.map(str::trim), Some(env) if env.eq_ignore_ascii_case("production"))
}
