use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod notify;
pub mod repo_types;

pub fn router() -> Router<AppState> {
    handlers::reminder_routes()
}
