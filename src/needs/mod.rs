mod dto;
pub mod handlers;
pub mod repo_types;
pub mod services;
pub mod share;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::needs_routes()
}
