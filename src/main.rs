mod app;
mod auth;
mod budgets;
mod calendar;
mod categories;
mod config;
mod dashboard;
mod error;
mod extract;
mod goals;
mod import;
mod money;
mod objects;
mod reminders;
mod state;
mod store;
mod transactions;
mod users;

use crate::{
    app::{build_app, serve},
    reminders::notify::run_reminder_loop,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "budgetwise=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = AppState::init().await?;
    tokio::spawn(run_reminder_loop(state.clone()));

    let config = state.config.clone();
    serve(build_app(state), &config).await
}
