use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => anyhow::bail!("unknown role {other:?}"),
        }
    }
}

/// User as exposed to handlers and clients. The password hash is only
/// reachable through `Store::password_hash`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub neighborhood: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Row of the `users` table without the password hash column.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub neighborhood: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub role: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            email: r.email,
            full_name: r.full_name,
            neighborhood: r.neighborhood,
            phone: r.phone,
            avatar_url: r.avatar_url,
            bio: r.bio,
            role: r.role.parse()?,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// Insert payload for a new account; `password_hash` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub neighborhood: String,
    pub phone: Option<String>,
    pub role: Role,
}

/// Server-side session record. `id` is the opaque cookie token.
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct Session {
    pub id: String,
    pub user_id: i64,
    pub expires_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_known_values_only() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn user_json_has_no_password_hash() {
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: 1,
            email: "test@example.com".into(),
            full_name: "Test".into(),
            neighborhood: "Medina".into(),
            phone: None,
            avatar_url: None,
            bio: None,
            role: Role::User,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], "user");
        assert!(json.get("password_hash").is_none());
    }
}
