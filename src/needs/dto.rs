use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::{
    auth::present,
    error::{AppError, AppResult},
    needs::{
        repo_types::{Helper, Need, NeedStatus},
        services::NeedDraft,
    },
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNeedRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub expires_at: Option<String>,
}

impl CreateNeedRequest {
    pub fn into_draft(self) -> AppResult<NeedDraft> {
        let (Some(title), Some(description), Some(category)) = (
            present(self.title),
            present(self.description),
            present(self.category),
        ) else {
            return Err(AppError::validation("Missing required fields"));
        };
        let expires_at = present(self.expires_at)
            .map(|raw| {
                OffsetDateTime::parse(&raw, &Rfc3339)
                    .map_err(|_| AppError::validation("Invalid expiresAt"))
            })
            .transpose()?;
        Ok(NeedDraft {
            title,
            description,
            category,
            expires_at,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct NeedsQuery {
    pub neighborhood: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VolunteerRequest {
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<NeedStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ShareQuery {
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NeedsResponse {
    pub needs: Vec<Need>,
}

#[derive(Debug, Serialize)]
pub struct NeedResponse {
    pub need: Need,
}

#[derive(Debug, Serialize)]
pub struct HelpersResponse {
    pub helpers: Vec<Helper>,
}

#[derive(Debug, Serialize)]
pub struct HelperResponse {
    pub helper: Helper,
}

#[derive(Debug, Serialize)]
pub struct ShareResponse {
    pub message: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_requires_title_description_category() {
        let req: CreateNeedRequest =
            serde_json::from_str(r#"{"title":"Need groceries","category":"food"}"#).unwrap();
        let err = req.into_draft().unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields");
    }

    #[test]
    fn expires_at_is_rfc3339() {
        let req: CreateNeedRequest = serde_json::from_str(
            r#"{"title":"t","description":"d","category":"food","expiresAt":"2030-01-02T03:04:05Z"}"#,
        )
        .unwrap();
        let draft = req.into_draft().unwrap();
        assert_eq!(draft.expires_at.unwrap().year(), 2030);

        let bad = CreateNeedRequest {
            title: Some("t".into()),
            description: Some("d".into()),
            category: Some("food".into()),
            expires_at: Some("tomorrow".into()),
        };
        assert!(matches!(bad.into_draft(), Err(AppError::Validation(_))));
    }
}
