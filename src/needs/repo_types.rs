use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NeedStatus {
    #[default]
    Open,
    InProgress,
    Completed,
}

impl NeedStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            NeedStatus::Open => "open",
            NeedStatus::InProgress => "in_progress",
            NeedStatus::Completed => "completed",
        }
    }
}

impl FromStr for NeedStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(NeedStatus::Open),
            "in_progress" => Ok(NeedStatus::InProgress),
            "completed" => Ok(NeedStatus::Completed),
            other => anyhow::bail!("unknown need status {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HelperStatus {
    #[default]
    Assigned,
    Completed,
}

impl FromStr for HelperStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assigned" => Ok(HelperStatus::Assigned),
            "completed" => Ok(HelperStatus::Completed),
            other => anyhow::bail!("unknown helper status {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Need {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: NeedStatus,
    pub neighborhood: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
}

#[derive(Debug, FromRow)]
pub struct NeedRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: String,
    pub neighborhood: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub expires_at: Option<OffsetDateTime>,
}

impl TryFrom<NeedRow> for Need {
    type Error = anyhow::Error;

    fn try_from(r: NeedRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            title: r.title,
            description: r.description,
            category: r.category,
            status: r.status.parse()?,
            neighborhood: r.neighborhood,
            created_at: r.created_at,
            updated_at: r.updated_at,
            expires_at: r.expires_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewNeed {
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub neighborhood: String,
    pub expires_at: Option<OffsetDateTime>,
}

/// A user volunteering for a need.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Helper {
    pub id: i64,
    pub need_id: i64,
    pub user_id: i64,
    pub status: HelperStatus,
    pub message: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
pub struct HelperRow {
    pub id: i64,
    pub need_id: i64,
    pub user_id: i64,
    pub status: String,
    pub message: Option<String>,
    pub created_at: OffsetDateTime,
}

impl TryFrom<HelperRow> for Helper {
    type Error = anyhow::Error;

    fn try_from(r: HelperRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            need_id: r.need_id,
            user_id: r.user_id,
            status: r.status.parse()?,
            message: r.message,
            created_at: r.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn need_status_uses_snake_case_on_the_wire() {
        assert_eq!(
            serde_json::to_string(&NeedStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        let parsed: NeedStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, NeedStatus::Completed);
        assert_eq!("in_progress".parse::<NeedStatus>().unwrap().as_str(), "in_progress");
        assert!("closed".parse::<NeedStatus>().is_err());
    }

    #[test]
    fn helper_row_converts() {
        let row = HelperRow {
            id: 3,
            need_id: 7,
            user_id: 9,
            status: "assigned".into(),
            message: Some("on my way".into()),
            created_at: OffsetDateTime::now_utc(),
        };
        let helper = Helper::try_from(row).unwrap();
        assert_eq!(helper.status, HelperStatus::Assigned);
        assert_eq!(helper.message.as_deref(), Some("on my way"));
    }
}
