use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        password::{hash_password, is_long_enough, verify_password, MIN_PASSWORD_LEN},
        repo_types::{NewUser, Role, User},
    },
    config::AppConfig,
    db::{Store, DUPLICATE_EMAIL},
    error::{AppError, AppResult},
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validated registration input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub neighborhood: String,
    pub phone: Option<String>,
    pub role: Role,
    pub admin_code: Option<String>,
}

/// Creates an account. Input is rejected before touching storage when the
/// password is too short or an admin role is requested without the
/// server-side invite code.
pub async fn register_user(
    store: &dyn Store,
    config: &AppConfig,
    reg: Registration,
) -> AppResult<User> {
    let email = normalize_email(&reg.email);
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::validation("Invalid email"));
    }

    if !is_long_enough(&reg.password) {
        warn!("password too short");
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }

    if reg.role == Role::Admin {
        let allowed = matches!(
            (&config.admin_invite_code, &reg.admin_code),
            (Some(expected), Some(given)) if expected == given
        );
        if !allowed {
            warn!(email = %email, "admin registration refused");
            return Err(AppError::Forbidden(
                "Admin registration requires a valid invite code".into(),
            ));
        }
    }

    if store.find_user_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict(DUPLICATE_EMAIL.into()));
    }

    let password_hash = hash_password(&reg.password)?;
    let user = store
        .create_user(NewUser {
            email,
            password_hash,
            full_name: reg.full_name,
            neighborhood: reg.neighborhood,
            phone: reg.phone,
            role: reg.role,
        })
        .await?;

    info!(user_id = user.id, email = %user.email, role = user.role.as_str(), "user registered");
    Ok(user)
}

/// Every credential failure yields the same `Authentication` error.
pub async fn login_user(store: &dyn Store, email: &str, password: &str) -> AppResult<User> {
    let email = normalize_email(email);

    let Some(user) = store.find_user_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::invalid_credentials());
    };

    let Some(hash) = store.password_hash(user.id).await? else {
        warn!(user_id = user.id, "login user without password hash");
        return Err(AppError::invalid_credentials());
    };

    if !verify_password(password, &hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::invalid_credentials());
    }

    info!(user_id = user.id, "user logged in");
    Ok(user)
}
