//! Bank statement import.

use crate::state::AppState;
use axum::Router;

pub mod categorize;
pub mod dto;
pub mod handlers;
pub mod parser;
pub mod repo_types;
pub mod services;

/// Largest accepted upload (CSV statements and profile pictures).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    handlers::csv_settings_routes()
}
