use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

use super::services::{balance, category_spending, months_for_range, spending_trends, Balance};
use crate::{
    auth::AuthUser,
    calendar::today,
    error::ApiError,
    extract::ValidQuery,
    state::AppState,
    transactions::repo_types::{Transaction, TransactionFilter},
};

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/balance", get(get_balance))
        .route("/dashboard/spending-trends", get(get_spending_trends))
        .route("/dashboard/category-spending", get(get_category_spending))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendsQuery {
    pub time_range: Option<String>,
}

async fn all_transactions(state: &AppState, auth: &AuthUser) -> Result<Vec<Transaction>, ApiError> {
    let rows = state
        .store
        .list_transactions(auth.user_id, &TransactionFilter::default())
        .await?;
    Ok(rows.into_iter().map(|r| r.transaction).collect())
}

#[instrument(skip(state))]
pub async fn get_balance(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Balance>, ApiError> {
    let txs = all_transactions(&state, &auth).await?;
    Ok(Json(balance(&txs, today())))
}

#[instrument(skip(state))]
pub async fn get_spending_trends(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidQuery(q): ValidQuery<TrendsQuery>,
) -> Result<Json<Value>, ApiError> {
    let months = months_for_range(q.time_range.as_deref());
    let txs = all_transactions(&state, &auth).await?;
    Ok(Json(json!({ "trends": spending_trends(&txs, today(), months) })))
}

#[instrument(skip(state))]
pub async fn get_category_spending(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let txs = all_transactions(&state, &auth).await?;
    let categories = state.store.list_categories(auth.user_id).await?;
    Ok(Json(json!({ "categories": category_spending(&txs, &categories, today()) })))
}
