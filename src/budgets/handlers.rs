use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{CreateBudget, PatchBudget},
    repo_types::Budget,
    services::{summarize, BudgetOverview, BudgetSummary},
};
use crate::{
    auth::AuthUser,
    calendar::{month_end, month_start, today},
    categories::services::check_visible,
    error::ApiError,
    extract::{ValidJson, ValidPath},
    state::AppState,
    transactions::repo_types::TransactionFilter,
};

pub fn budget_routes() -> Router<AppState> {
    Router::new()
        .route("/budgets", get(list_budgets).post(create_budget))
        .route("/budgets/overview", get(budget_overview))
        .route(
            "/budgets/:id",
            get(get_budget).patch(update_budget).delete(delete_budget),
        )
}

async fn summaries(state: &AppState, auth: &AuthUser) -> Result<Vec<BudgetSummary>, ApiError> {
    let now = today();
    let budgets = state.store.list_budgets(auth.user_id).await?;
    let categories = state.store.list_categories(auth.user_id).await?;
    let txs: Vec<_> = state
        .store
        .list_transactions(
            auth.user_id,
            &TransactionFilter::between(month_start(now), month_end(now)),
        )
        .await?
        .into_iter()
        .map(|r| r.transaction)
        .collect();
    Ok(summarize(budgets, &categories, &txs, now))
}

#[instrument(skip(state))]
pub async fn list_budgets(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let budgets = summaries(&state, &auth).await?;
    Ok(Json(json!({ "budgets": budgets })))
}

#[instrument(skip(state))]
pub async fn budget_overview(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let budgets: Vec<BudgetOverview> = summaries(&state, &auth)
        .await?
        .into_iter()
        .map(BudgetOverview::from)
        .collect();
    Ok(Json(json!({ "budgets": budgets })))
}

#[instrument(skip(state, payload))]
pub async fn create_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(payload): ValidJson<CreateBudget>,
) -> Result<(StatusCode, Json<Budget>), ApiError> {
    let new = payload.validate()?;
    check_visible(state.store.as_ref(), auth.user_id, new.category_id).await?;
    let budget = state.store.create_budget(auth.user_id, new).await?;
    info!(user_id = %auth.user_id, budget_id = %budget.id, "budget created");
    Ok((StatusCode::CREATED, Json(budget)))
}

#[instrument(skip(state))]
pub async fn get_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<Json<Budget>, ApiError> {
    let budget = state
        .store
        .get_budget(auth.user_id, id)
        .await?
        .ok_or(ApiError::NotFound("Budget"))?;
    Ok(Json(budget))
}

#[instrument(skip(state, payload))]
pub async fn update_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(payload): ValidJson<PatchBudget>,
) -> Result<Json<Budget>, ApiError> {
    let mut budget = state
        .store
        .get_budget(auth.user_id, id)
        .await?
        .ok_or(ApiError::NotFound("Budget"))?;
    payload.apply(&mut budget)?;
    check_visible(state.store.as_ref(), auth.user_id, budget.category_id).await?;
    let saved = state
        .store
        .save_budget(&budget)
        .await?
        .ok_or(ApiError::NotFound("Budget"))?;
    Ok(Json(saved))
}

#[instrument(skip(state))]
pub async fn delete_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.store.delete_budget(auth.user_id, id).await? {
        return Err(ApiError::NotFound("Budget"));
    }
    info!(user_id = %auth.user_id, budget_id = %id, "budget deleted");
    Ok(StatusCode::NO_CONTENT)
}
