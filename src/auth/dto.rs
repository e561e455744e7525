use serde::{Deserialize, Serialize};

use crate::{
    auth::{
        repo_types::{Role, User},
        services::Registration,
    },
    error::{AppError, AppResult},
};

/// Request body for user registration.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub neighborhood: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub admin_code: Option<String>,
}

impl RegisterRequest {
    pub fn into_registration(self) -> AppResult<Registration> {
        let (Some(email), Some(password), Some(full_name), Some(neighborhood)) = (
            present(self.email),
            self.password.filter(|p| !p.is_empty()),
            present(self.full_name),
            present(self.neighborhood),
        ) else {
            return Err(AppError::validation("Missing required fields"));
        };
        Ok(Registration {
            email,
            password,
            full_name,
            neighborhood,
            phone: present(self.phone),
            role: self.role.unwrap_or_default(),
            admin_code: self.admin_code,
        })
    }
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn credentials(self) -> AppResult<(String, String)> {
        match (present(self.email), self.password.filter(|p| !p.is_empty())) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => Err(AppError::validation("Email and password are required")),
        }
    }
}

/// `{"user": ...}`; `user` is `null` for anonymous callers of `/auth/me`.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: Option<User>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Trimmed value, `None` when absent or blank.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_reads_camel_case() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"email":"a@b.co","password":"password123","fullName":" Alice ","neighborhood":"Medina","role":"admin","adminCode":"x"}"#,
        )
        .unwrap();
        let reg = req.into_registration().unwrap();
        assert_eq!(reg.full_name, "Alice");
        assert_eq!(reg.role, Role::Admin);
        assert_eq!(reg.admin_code.as_deref(), Some("x"));
    }

    #[test]
    fn missing_or_blank_fields_are_rejected() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"email":"a@b.co","password":"password123","fullName":"  "}"#)
                .unwrap();
        let err = req.into_registration().unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields");

        let err = LoginRequest {
            email: Some("a@b.co".into()),
            password: None,
        }
        .credentials()
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn role_defaults_to_user() {
        let req = RegisterRequest {
            email: Some("a@b.co".into()),
            password: Some("password123".into()),
            full_name: Some("A".into()),
            neighborhood: Some("Medina".into()),
            ..Default::default()
        };
        assert_eq!(req.into_registration().unwrap().role, Role::User);
    }
}
